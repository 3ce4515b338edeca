//! Front-matter parsing and writing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> std::result::Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

fn default_published() -> bool {
    true
}

/// Front-matter block of a post or page
///
/// Serialization order is the on-disk field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(
        deserialize_with = "string_or_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    /// Posts are published unless they say otherwise
    #[serde(default = "default_published")]
    pub published: bool,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            date: None,
            tags: Vec::new(),
            description: None,
            cover: None,
            published: true,
        }
    }
}

impl FrontMatter {
    /// Split a document into front-matter and body
    ///
    /// A document without a leading `---` block has default front-matter and is all body.
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.trim_start_matches('\u{feff}');
        let Some(rest) = content.strip_prefix("---") else {
            return Ok((FrontMatter::default(), content));
        };
        // The opening fence must be alone on its line
        let Some(rest) = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
        else {
            return Ok((FrontMatter::default(), content));
        };

        let (yaml, body) = if let Some(body) = rest.strip_prefix("---") {
            ("", body)
        } else if let Some(end) = rest.find("\n---") {
            (&rest[..end], &rest[end + 4..])
        } else {
            // No closing fence, treat as no front-matter
            return Ok((FrontMatter::default(), content));
        };

        // Drop the remainder of the closing fence line
        let body = match body.find('\n') {
            Some(pos) if body[..pos].trim().is_empty() => &body[pos + 1..],
            None if body.trim().is_empty() => "",
            _ => body,
        };

        if yaml.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        let fm: FrontMatter = serde_yaml::from_str(yaml)?;
        Ok((fm, body))
    }

    /// Render front-matter and body back into a markdown document
    ///
    /// The body is written verbatim so `parse` gives it back unchanged.
    pub fn to_document(&self, body: &str) -> Result<String> {
        let yaml = serde_yaml::to_string(self)?;

        let mut doc = String::with_capacity(yaml.len() + body.len() + 8);
        doc.push_str("---\n");
        doc.push_str(&yaml);
        doc.push_str("---\n");
        doc.push_str(body);
        Ok(doc)
    }
}

/// Parse a date string in the formats front-matter commonly uses
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
tags:
  - rust
  - blog
description: First post
cover: /api/images/cover.png
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.tags, vec!["rust", "blog"]);
        assert_eq!(fm.description.as_deref(), Some("First post"));
        assert_eq!(fm.cover.as_deref(), Some("/api/images/cover.png"));
        assert!(fm.published);
        assert_eq!(body, "\nThis is the content.\n");
    }

    #[test]
    fn test_parse_single_string_tag() {
        let content = "---\ntitle: One\ntags: Notes\npublished: false\n---\nBody\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
        assert!(!fm.published);
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, body) = FrontMatter::parse("# Just markdown\n").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "# Just markdown\n");
    }

    #[test]
    fn test_horizontal_rule_is_not_frontmatter() {
        let content = "---- not a fence\ntext\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert_eq!(body, content);
    }

    #[test]
    fn test_unclosed_fence_is_body() {
        let content = "---\ntitle: dangling\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert_eq!(body, content);
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let content = "---\ntitle: [unterminated\n---\nbody\n";
        assert!(FrontMatter::parse(content).is_err());
    }

    #[test]
    fn test_document_reparses() {
        let fm = FrontMatter {
            title: Some("Colons: everywhere".to_string()),
            date: Some("2024-03-01".to_string()),
            tags: vec!["Rust".to_string(), "web dev".to_string()],
            description: None,
            cover: None,
            published: false,
        };
        let doc = fm.to_document("## Heading\n\nText").unwrap();
        assert!(doc.starts_with("---\n"));
        assert!(!doc.contains("description"));

        let (parsed, body) = FrontMatter::parse(&doc).unwrap();
        assert_eq!(parsed, fm);
        assert_eq!(body, "## Heading\n\nText");
    }

    #[test]
    fn test_document_keeps_body_exactly() {
        let fm = FrontMatter {
            title: Some("T".to_string()),
            ..Default::default()
        };
        for body in ["Hello", "Hello\n", "\nLeading blank line", "trailing\n\n", ""] {
            let doc = fm.to_document(body).unwrap();
            let (_, parsed) = FrontMatter::parse(&doc).unwrap();
            assert_eq!(parsed, body);
        }
    }

    #[test]
    fn test_parse_date_formats() {
        let d = parse_date_string("2024-01-15").unwrap();
        assert_eq!(d.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 00:00");

        let d = parse_date_string("2024/01/15 10:30:00").unwrap();
        assert_eq!(d.format("%H:%M").to_string(), "10:30");

        let d = parse_date_string("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(d.format("%H:%M").to_string(), "08:30");

        assert!(parse_date_string("yesterday").is_none());
    }
}
