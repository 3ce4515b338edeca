//! Site configuration (site.config.json)

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref URL_RE: Regex = Regex::new(r"^https?://.+").unwrap();
}

/// Main site configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    pub introduction: String,
    pub author: AuthorConfig,
    pub url: String,
    pub social: SocialConfig,
    pub theme: ThemeConfig,
    pub nav: Vec<NavItem>,
    pub posts_per_page: u32,
    pub excerpt_length: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_entrance: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Lynn's Blog".to_string(),
            description: "😜Yes, I broke it. No, I didn't mean to. Yes, I learned something."
                .to_string(),
            introduction: "\"Do not go gentle into that good night. Old age should burn and rave at close of day. Rage, rage against the dying of the light.\"".to_string(),
            author: AuthorConfig::default(),
            url: "https://your-blog.com".to_string(),
            social: SocialConfig::default(),
            theme: ThemeConfig::default(),
            nav: vec![
                NavItem::new("Home", "/"),
                NavItem::new("Posts", "/posts"),
                NavItem::new("Tags", "/tags"),
                NavItem::new("About", "/about"),
            ],
            posts_per_page: 6,
            excerpt_length: 200,
            secure_entrance: None,
        }
    }
}

impl SiteConfig {
    /// Check every field, returning all problems at once
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Site title is required"));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "Site description is required"));
        }
        if self.author.name.trim().is_empty() {
            errors.push(FieldError::new("author.name", "Author name is required"));
        }

        let email = self.author.email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("author.email", "Author email is required"));
        } else {
            let address = email.strip_prefix("mailto:").unwrap_or(email);
            if !EMAIL_RE.is_match(address) {
                errors.push(FieldError::new("author.email", "Author email is malformed"));
            }
        }

        if self.url.trim().is_empty() {
            errors.push(FieldError::new("url", "Site URL is required"));
        } else if !URL_RE.is_match(&self.url) {
            errors.push(FieldError::new(
                "url",
                "Site URL must start with http:// or https://",
            ));
        }

        if !(1..=50).contains(&self.posts_per_page) {
            errors.push(FieldError::new(
                "postsPerPage",
                "Posts per page must be between 1 and 50",
            ));
        }
        if !(50..=500).contains(&self.excerpt_length) {
            errors.push(FieldError::new(
                "excerptLength",
                "Excerpt length must be between 50 and 500",
            ));
        }

        for (i, item) in self.nav.iter().enumerate() {
            if item.name.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("nav[{}].name", i),
                    "Navigation name is required",
                ));
            }
            if item.href.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("nav[{}].href", i),
                    "Navigation link is required",
                ));
            }
        }

        errors
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Author block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            name: "Lynn".to_string(),
            email: "blog@example.com".to_string(),
            github: Some("github-username".to_string()),
        }
    }
}

/// Social links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            github: Some("https://github.com/FT-Fetters".to_string()),
            twitter: Some("https://twitter.com/username".to_string()),
            email: Some("mailto:ftfetters@gmail.com".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    pub primary_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary_color: "#3b82f6".to_string(),
        }
    }
}

/// Navigation entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavItem {
    pub name: String,
    pub href: String,
}

impl NavItem {
    pub fn new(name: &str, href: &str) -> Self {
        Self {
            name: name.to_string(),
            href: href.to_string(),
        }
    }
}
