//! JSON Feed 1.1 output

use serde::Serialize;

use super::FeedDocument;
use crate::error::Result;

const VERSION: &str = "https://jsonfeed.org/version/1.1";

#[derive(Serialize)]
struct JsonFeed<'a> {
    version: &'static str,
    title: &'a str,
    home_page_url: &'a str,
    feed_url: &'a str,
    description: &'a str,
    language: &'a str,
    authors: Vec<Author<'a>>,
    items: Vec<Item<'a>>,
}

#[derive(Serialize)]
struct Author<'a> {
    name: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
struct Item<'a> {
    id: &'a str,
    url: &'a str,
    title: &'a str,
    summary: &'a str,
    content_html: &'a str,
    date_published: String,
    #[serde(skip_serializing_if = "no_tags")]
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

fn no_tags(tags: &&[String]) -> bool {
    tags.is_empty()
}

pub(super) fn write(doc: &FeedDocument) -> Result<String> {
    let feed = JsonFeed {
        version: VERSION,
        title: &doc.title,
        home_page_url: &doc.link,
        feed_url: &doc.self_link,
        description: &doc.description,
        language: &doc.language,
        authors: vec![Author {
            name: &doc.author_name,
            url: &doc.author_link,
        }],
        items: doc
            .entries
            .iter()
            .map(|entry| Item {
                id: &entry.link,
                url: &entry.link,
                title: &entry.title,
                summary: &entry.summary,
                content_html: &entry.content,
                date_published: entry.date.to_rfc3339(),
                tags: &entry.categories,
                image: entry.image.as_deref(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&feed)?)
}
