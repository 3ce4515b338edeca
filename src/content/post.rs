//! Post model and the inputs used to create or replace one

use chrono::{DateTime, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::frontmatter::parse_date_string;

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$").unwrap();
}

/// Whether `slug` is usable as a post identifier and file stem
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

/// A blog post as stored in `posts/<slug>.md`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// File stem, unique and immutable
    pub slug: String,
    pub title: String,
    /// Date string exactly as written in front-matter
    pub date: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub published: bool,
    /// Raw markdown body, omitted from listings that do not ask for it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub excerpt: String,
    pub reading_time: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Timestamp used for ordering; `None` when the date does not parse
    pub fn sort_key(&self) -> Option<NaiveDateTime> {
        parse_date_string(&self.date)
    }

    /// Case-insensitive tag match
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }
}

/// Fields accepted when creating a post
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPost {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
    pub published: Option<bool>,
}

/// Full replacement of a post's fields, optionally moving it to a new slug
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostUpdate {
    pub title: String,
    pub content: String,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
    pub published: Option<bool>,
    pub new_slug: Option<String>,
}

/// Number of posts carrying a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Aggregate tags over `posts`, merging spellings that differ only in case
///
/// The first spelling seen is the one reported. Sorted by count, then name.
pub fn tag_counts<'a, I>(posts: I) -> Vec<TagCount>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut counts: Vec<TagCount> = Vec::new();

    for post in posts {
        let mut seen: Vec<String> = Vec::new();
        for tag in &post.tags {
            let key = tag.to_lowercase();
            if key.trim().is_empty() || seen.contains(&key) {
                continue;
            }
            match counts.iter_mut().find(|c| c.tag.to_lowercase() == key) {
                Some(entry) => entry.count += 1,
                None => counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                }),
            }
            seen.push(key);
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    counts
}
