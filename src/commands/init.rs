//! Initialize a blog content tree

use anyhow::Result;
use std::fs;

use crate::config::SiteConfig;
use crate::Blog;

/// Create the content directories and write a default config if none exists
pub fn run(blog: &Blog) -> Result<()> {
    for dir in [&blog.posts_dir, &blog.pages_dir, &blog.images_dir] {
        fs::create_dir_all(dir)?;
    }

    let store = blog.config_store();
    if store.path().exists() {
        tracing::info!("Keeping existing config at {:?}", store.path());
    } else {
        store.save(&SiteConfig::default())?;
    }

    let about = blog.pages_dir.join("about.md");
    if !about.exists() {
        fs::write(&about, "---\ntitle: About\n---\n\nWrite something about yourself.\n")?;
    }

    println!("Initialized blog in {:?}", blog.settings.content_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use tempfile::TempDir;

    fn blog(dir: &TempDir) -> Blog {
        Blog::new(Settings {
            content_dir: dir.path().join("content"),
            config_path: dir.path().join("config/site.config.json"),
            config_override: None,
            ..Default::default()
        })
    }

    #[test]
    fn test_init_creates_layout() {
        let dir = TempDir::new().unwrap();
        let blog = blog(&dir);
        run(&blog).unwrap();

        assert!(blog.posts_dir.is_dir());
        assert!(blog.images_dir.is_dir());
        assert!(blog.pages_dir.join("about.md").is_file());
        assert_eq!(blog.config_store().load(), SiteConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let blog = blog(&dir);
        let mut config = SiteConfig::default();
        config.title = "Kept".to_string();
        blog.config_store().save(&config).unwrap();

        run(&blog).unwrap();
        assert_eq!(blog.config_store().load().title, "Kept");
    }
}
