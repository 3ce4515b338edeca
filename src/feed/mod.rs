//! Syndication feeds (RSS 2.0, Atom 1.0, JSON Feed 1.1) built from published posts

mod atom;
mod cache;
mod json;
mod rss;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use cache::{CachePolicy, CachedFeed, FeedCache, DEFAULT_TTL_SECS};

use crate::clock::Clock;
use crate::config::{ConfigStore, SiteConfig};
use crate::content::{MarkdownRenderer, Post, PostRepository};
use crate::error::Result;

/// Default number of items per feed
pub const DEFAULT_LIMIT: usize = 20;

/// Largest number of items a feed may carry
pub const MAX_LIMIT: usize = 50;

const LANGUAGE: &str = "zh-CN";
const GENERATOR: &str = "Tiny Blog Feed Generator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeedFormat {
    #[default]
    Rss,
    Atom,
    Json,
}

impl FeedFormat {
    /// Parse a `format` query value; anything unrecognised is RSS
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "atom" => FeedFormat::Atom,
            "json" => FeedFormat::Json,
            _ => FeedFormat::Rss,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            FeedFormat::Rss => "application/rss+xml; charset=utf-8",
            FeedFormat::Atom => "application/atom+xml; charset=utf-8",
            FeedFormat::Json => "application/feed+json; charset=utf-8",
        }
    }

    fn query_value(self) -> &'static str {
        match self {
            FeedFormat::Rss => "rss",
            FeedFormat::Atom => "atom",
            FeedFormat::Json => "json",
        }
    }
}

/// Everything that changes the rendered document; also the cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedOptions {
    pub format: FeedFormat,
    /// Always within `1..=MAX_LIMIT`
    pub limit: usize,
    pub full_content: bool,
}

impl FeedOptions {
    pub fn new(format: FeedFormat, limit: usize, full_content: bool) -> Self {
        Self {
            format,
            limit: limit.clamp(1, MAX_LIMIT),
            full_content,
        }
    }

    /// Build from raw query values, applying defaults and clamping `limit`
    ///
    /// `limit` is read from its leading digits (`10abc` is 10); a value with no
    /// leading number falls back to [`DEFAULT_LIMIT`].
    pub fn from_query(format: Option<&str>, limit: Option<&str>, full_content: Option<&str>) -> Self {
        let format = format.map(FeedFormat::parse).unwrap_or_default();
        let limit = match limit.and_then(leading_int) {
            Some(n) => n.clamp(1, MAX_LIMIT as i64) as usize,
            None => DEFAULT_LIMIT,
        };
        Self::new(format, limit, full_content == Some("true"))
    }
}

/// Optional sign followed by at least one digit, ignoring whatever comes after
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // More digits than fit in an i64
    let n = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -n } else { n })
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self::new(FeedFormat::Rss, DEFAULT_LIMIT, false)
    }
}

/// Feed-level metadata plus entries, independent of output format
#[derive(Debug, Clone)]
pub struct FeedDocument {
    pub title: String,
    pub description: String,
    /// Site root without trailing slash
    pub link: String,
    /// URL of this feed in this format
    pub self_link: String,
    pub language: String,
    pub copyright: String,
    pub generator: String,
    pub author_name: String,
    pub author_email: String,
    pub author_link: String,
    pub updated: DateTime<Utc>,
    pub entries: Vec<FeedEntry>,
}

#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub title: String,
    /// Permalink, doubles as the entry id
    pub link: String,
    /// Post excerpt
    pub summary: String,
    /// Rendered HTML in full-content feeds, otherwise the excerpt
    pub content: String,
    pub date: DateTime<Utc>,
    pub categories: Vec<String>,
    pub image: Option<String>,
}

impl FeedDocument {
    fn new(config: &SiteConfig, format: FeedFormat, updated: DateTime<Utc>) -> Self {
        let link = config.base_url().to_string();
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            self_link: format!("{}/api/rss?format={}", link, format.query_value()),
            language: LANGUAGE.to_string(),
            copyright: format!(
                "All rights reserved {}, {}",
                updated.year(),
                config.author.name
            ),
            generator: GENERATOR.to_string(),
            author_name: config.author.name.clone(),
            author_email: config.author.email.clone(),
            author_link: config
                .social
                .github
                .clone()
                .filter(|g| !g.trim().is_empty())
                .unwrap_or_else(|| link.clone()),
            updated,
            entries: Vec::new(),
            link,
        }
    }

    /// Serialize in the requested format
    pub fn render(&self, format: FeedFormat) -> Result<String> {
        match format {
            FeedFormat::Rss => Ok(rss::write(self)),
            FeedFormat::Atom => Ok(atom::write(self)),
            FeedFormat::Json => json::write(self),
        }
    }
}

/// Builds feeds from the post directory, caching each rendered document
pub struct FeedBuilder {
    posts_dir: PathBuf,
    config: ConfigStore,
    renderer: Arc<MarkdownRenderer>,
    cache: Arc<FeedCache>,
    clock: Arc<dyn Clock>,
}

impl FeedBuilder {
    pub fn new<P: AsRef<Path>>(
        posts_dir: P,
        config: ConfigStore,
        renderer: Arc<MarkdownRenderer>,
        cache: Arc<FeedCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts_dir: posts_dir.as_ref().to_path_buf(),
            config,
            renderer,
            cache,
            clock,
        }
    }

    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }

    /// Serialized feed for `options`
    ///
    /// Serves a fresh cached copy when there is one, otherwise regenerates. If
    /// regeneration fails the last cached copy is served regardless of age, and
    /// failing that an empty but valid document.
    pub fn build(&self, options: FeedOptions) -> String {
        if let Some(content) = self.cache.get_fresh(&options) {
            tracing::debug!("Feed cache hit for {:?}", options);
            return content;
        }

        match self.generate(options) {
            Ok(content) => {
                self.cache.put(options, content.clone());
                content
            }
            Err(e) => {
                tracing::error!("Failed to generate feed: {}", e);
                if let Some(stale) = self.cache.get_stale(&options) {
                    return stale;
                }
                self.empty(options.format)
            }
        }
    }

    /// Render a feed without consulting the cache
    pub fn generate(&self, options: FeedOptions) -> Result<String> {
        let config = self.config.load();
        let repo = PostRepository::new(&self.posts_dir)
            .with_excerpt_length(config.excerpt_length as usize);

        let posts: Vec<Post> = repo
            .list_all(options.full_content)?
            .into_iter()
            .filter(|p| p.published)
            .take(options.limit)
            .collect();

        let mut doc = FeedDocument::new(&config, options.format, self.clock.now());
        doc.entries = posts
            .iter()
            .map(|post| self.entry(&doc.link, post, options.full_content))
            .collect();

        tracing::debug!(
            "Generated {:?} feed with {} entries",
            options.format,
            doc.entries.len()
        );
        doc.render(options.format)
    }

    /// A feed with channel metadata and no entries
    pub fn empty(&self, format: FeedFormat) -> String {
        let config = self.config.load();
        let doc = FeedDocument::new(&config, format, self.clock.now());
        doc.render(format).unwrap_or_else(|e| {
            tracing::error!("Failed to render empty feed: {}", e);
            String::new()
        })
    }

    fn entry(&self, base_url: &str, post: &Post, full_content: bool) -> FeedEntry {
        let content = match post.content.as_deref() {
            Some(body) if full_content => match self.renderer.render(body) {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!("Failed to render {} for feed: {}", post.slug, e);
                    post.excerpt.clone()
                }
            },
            _ => post.excerpt.clone(),
        };

        FeedEntry {
            title: post.title.clone(),
            link: format!("{}/posts/{}", base_url, post.slug),
            summary: post.excerpt.clone(),
            content,
            date: post
                .sort_key()
                .map(|d| Utc.from_utc_datetime(&d))
                .unwrap_or(post.updated_at),
            categories: post.tags.clone(),
            image: post.cover.as_ref().map(|cover| {
                if cover.starts_with("http://") || cover.starts_with("https://") {
                    cover.clone()
                } else {
                    format!("{}{}", base_url, cover)
                }
            }),
        }
    }
}
