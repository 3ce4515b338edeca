//! RSS 2.0 output

use ::rss::{CategoryBuilder, ChannelBuilder, EnclosureBuilder, GuidBuilder, ItemBuilder};
use std::collections::BTreeMap;

use super::FeedDocument;
use crate::content::content_type_for;

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

pub(super) fn write(doc: &FeedDocument) -> String {
    let author = format!("{} ({})", doc.author_email, doc.author_name);

    let items: Vec<_> = doc
        .entries
        .iter()
        .map(|entry| {
            let categories = entry
                .categories
                .iter()
                .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
                .collect::<Vec<_>>();
            let enclosure = entry.image.as_ref().map(|url| {
                EnclosureBuilder::default()
                    .url(url.clone())
                    .mime_type(content_type_for(std::path::Path::new(url)).to_string())
                    .length("0".to_string())
                    .build()
            });

            ItemBuilder::default()
                .title(Some(entry.title.clone()))
                .link(Some(entry.link.clone()))
                .guid(Some(
                    GuidBuilder::default()
                        .value(entry.link.clone())
                        .permalink(true)
                        .build(),
                ))
                .description(Some(entry.summary.clone()))
                .content(Some(entry.content.clone()))
                .author(Some(author.clone()))
                .pub_date(Some(entry.date.to_rfc2822()))
                .categories(categories)
                .enclosure(enclosure)
                .build()
        })
        .collect();

    let mut namespaces = BTreeMap::new();
    namespaces.insert("content".to_string(), CONTENT_NAMESPACE.to_string());

    ChannelBuilder::default()
        .namespaces(namespaces)
        .title(doc.title.clone())
        .link(doc.link.clone())
        .description(doc.description.clone())
        .language(Some(doc.language.clone()))
        .copyright(Some(doc.copyright.clone()))
        .generator(Some(doc.generator.clone()))
        .managing_editor(Some(author))
        .last_build_date(Some(doc.updated.to_rfc2822()))
        .docs(Some("https://validator.w3.org/feed/docs/rss2.html".to_string()))
        .items(items)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedEntry;
    use chrono::{TimeZone, Utc};

    fn doc() -> FeedDocument {
        let updated = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        FeedDocument {
            title: "Blog & Co".to_string(),
            description: "Notes".to_string(),
            link: "https://example.com".to_string(),
            self_link: "https://example.com/api/rss?format=rss".to_string(),
            language: "zh-CN".to_string(),
            copyright: "All rights reserved 2024, Lynn".to_string(),
            generator: "Tiny Blog Feed Generator".to_string(),
            author_name: "Lynn".to_string(),
            author_email: "lynn@example.com".to_string(),
            author_link: "https://example.com".to_string(),
            updated,
            entries: vec![FeedEntry {
                title: "First <post>".to_string(),
                link: "https://example.com/posts/first".to_string(),
                summary: "Summary".to_string(),
                content: "<p>Body</p>".to_string(),
                date: updated,
                categories: vec!["rust".to_string(), "web".to_string()],
                image: Some("https://example.com/api/images/cover.png".to_string()),
            }],
        }
    }

    #[test]
    fn test_rss_channel_and_item() {
        let xml = write(&doc());
        assert!(xml.contains(r#"<rss version="2.0""#));
        assert!(xml.contains(CONTENT_NAMESPACE));
        assert!(xml.contains("<title>Blog &amp; Co</title>"));
        assert!(xml.contains("<language>zh-CN</language>"));
        assert!(xml.contains("<title>First &lt;post&gt;</title>"));
        assert!(xml.contains("<link>https://example.com/posts/first</link>"));
        assert!(xml.contains("<category>rust</category>"));
        assert!(xml.contains("<content:encoded>"));
        assert!(xml.contains("image/png"));
        assert_eq!(xml.matches("<item>").count(), 1);
    }

    #[test]
    fn test_rss_empty_channel_is_valid() {
        let mut doc = doc();
        doc.entries.clear();
        let xml = write(&doc);
        assert!(xml.contains("<channel>"));
        assert!(!xml.contains("<item>"));
    }
}
