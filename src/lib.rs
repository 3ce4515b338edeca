//! tiny-blog: a markdown-file blog with a password-protected admin API
//!
//! Posts and pages are markdown files with YAML front-matter, site settings
//! live in a single JSON file, and the admin area is guarded by a signed
//! cookie or bearer token. There is no database.

pub mod auth;
pub mod clock;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod feed;
pub mod server;

use std::path::PathBuf;

pub use error::{BlogError, Result};

/// The main blog application: resolved directories plus process settings
#[derive(Debug, Clone)]
pub struct Blog {
    pub settings: config::Settings,
    /// Posts, one `<slug>.md` per post
    pub posts_dir: PathBuf,
    /// Standalone pages such as `about.md`
    pub pages_dir: PathBuf,
    /// Uploaded media
    pub images_dir: PathBuf,
}

impl Blog {
    pub fn new(settings: config::Settings) -> Self {
        let content_dir = settings.content_dir.clone();
        Self {
            posts_dir: content_dir.join("posts"),
            pages_dir: content_dir.join("pages"),
            images_dir: content_dir.join("images"),
            settings,
        }
    }

    /// Site config storage, honouring the mounted override file
    pub fn config_store(&self) -> config::ConfigStore {
        let store = config::ConfigStore::new(&self.settings.config_path);
        match &self.settings.config_override {
            Some(path) => store.with_override(path),
            None => store,
        }
    }

    /// Post repository using the configured excerpt length
    pub fn posts(&self) -> content::PostRepository {
        let excerpt_length = self.config_store().load().excerpt_length as usize;
        content::PostRepository::new(&self.posts_dir).with_excerpt_length(excerpt_length)
    }

    pub fn pages(&self) -> content::PageStore {
        content::PageStore::new(&self.pages_dir)
    }

    pub fn media(&self) -> content::MediaStore {
        content::MediaStore::new(&self.images_dir)
    }

    /// Create the content directories and a default config file if missing
    pub fn init(&self) -> anyhow::Result<()> {
        commands::init::run(self)
    }

    /// Create a new post from a title
    pub fn new_post(&self, title: &str, slug: Option<&str>) -> anyhow::Result<content::Post> {
        commands::new::run(self, title, slug)
    }
}
