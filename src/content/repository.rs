//! Filesystem-backed post storage: one `<slug>.md` file per post

use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::markdown::{excerpt, reading_time};
use super::post::{is_valid_slug, tag_counts, NewPost, Post, PostUpdate, TagCount};
use super::FrontMatter;
use crate::error::{BlogError, Result};

/// Excerpt length used when the site config does not say otherwise
pub const DEFAULT_EXCERPT_LENGTH: usize = 200;

/// Reads and writes posts under a single directory
///
/// Nothing is cached; every call goes to disk.
#[derive(Debug, Clone)]
pub struct PostRepository {
    dir: PathBuf,
    excerpt_length: usize,
}

impl PostRepository {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
        }
    }

    pub fn with_excerpt_length(mut self, excerpt_length: usize) -> Self {
        self.excerpt_length = excerpt_length;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
            tracing::info!("Created posts directory {:?}", self.dir);
        }
        Ok(())
    }

    fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}.md", slug))
    }

    /// All posts, newest first
    ///
    /// Files that fail to parse, or whose name is not a valid slug, are skipped
    /// with a warning.
    pub fn list_all(&self, include_content: bool) -> Result<Vec<Post>> {
        self.ensure_dir()?;

        let mut posts = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown_file(path) {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_slug(slug) {
                tracing::warn!("Skipping {:?}: file name is not a valid slug", path);
                continue;
            }

            match self.load(slug, path, include_content) {
                Ok(post) => posts.push(post),
                Err(e) => tracing::warn!("Failed to load post {:?}: {}", path, e),
            }
        }

        sort_by_date(&mut posts);
        Ok(posts)
    }

    /// Posts carrying `tag`, compared case-insensitively
    pub fn filter_by_tag(&self, tag: &str, include_content: bool) -> Result<Vec<Post>> {
        Ok(filter_by_tag(self.list_all(include_content)?, tag))
    }

    /// Look up a post; an unknown or malformed slug is `None`
    pub fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        if !is_valid_slug(slug) {
            return Ok(None);
        }
        self.ensure_dir()?;

        let path = self.path_for(slug);
        if !path.is_file() {
            return Ok(None);
        }
        self.load(slug, &path, true).map(Some)
    }

    /// Write a new post file; fails with `Conflict` if the slug is taken
    pub fn create(&self, new: NewPost) -> Result<Post> {
        let slug = new.slug.trim().to_string();
        validate_slug(&slug)?;
        let fm = front_matter(
            &new.title,
            &new.content,
            new.date,
            new.tags,
            new.description,
            new.cover,
            new.published,
        )?;
        self.ensure_dir()?;

        let path = self.path_for(&slug);
        if path.exists() {
            return Err(conflict(&slug));
        }

        let document = fm.to_document(&new.content)?;
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(conflict(&slug)),
            Err(e) => return Err(e.into()),
        };
        file.write_all(document.as_bytes())?;

        tracing::info!("Created post {}", slug);
        self.load(&slug, &path, true)
    }

    /// Replace a post's front-matter and body, moving it when `new_slug` differs
    pub fn update(&self, slug: &str, update: PostUpdate) -> Result<Post> {
        if !is_valid_slug(slug) {
            return Err(not_found(slug));
        }
        self.ensure_dir()?;

        let old_path = self.path_for(slug);
        if !old_path.is_file() {
            return Err(not_found(slug));
        }

        let target = match update.new_slug.as_deref().map(str::trim) {
            Some(new_slug) if !new_slug.is_empty() && new_slug != slug => {
                validate_slug(new_slug)?;
                if self.path_for(new_slug).exists() {
                    return Err(conflict(new_slug));
                }
                new_slug.to_string()
            }
            _ => slug.to_string(),
        };

        let fm = front_matter(
            &update.title,
            &update.content,
            update.date,
            update.tags,
            update.description,
            update.cover,
            update.published,
        )?;
        let document = fm.to_document(&update.content)?;

        let new_path = self.path_for(&target);
        fs::write(&new_path, document)?;
        // A crash here leaves both files; the next update or delete resolves it
        if target != slug {
            fs::remove_file(&old_path)?;
            tracing::info!("Renamed post {} -> {}", slug, target);
        } else {
            tracing::info!("Updated post {}", slug);
        }

        self.load(&target, &new_path, true)
    }

    /// Remove a post file
    pub fn delete(&self, slug: &str) -> Result<()> {
        if !is_valid_slug(slug) {
            return Err(not_found(slug));
        }
        self.ensure_dir()?;

        match fs::remove_file(self.path_for(slug)) {
            Ok(()) => {
                tracing::info!("Deleted post {}", slug);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(slug)),
            Err(e) => Err(e.into()),
        }
    }

    /// Tag counts over every post, drafts included
    pub fn list_tags(&self) -> Result<Vec<TagCount>> {
        Ok(tag_counts(&self.list_all(false)?))
    }

    fn load(&self, slug: &str, path: &Path, include_content: bool) -> Result<Post> {
        let raw = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&raw)?;

        let metadata = fs::metadata(path)?;
        let updated_at: DateTime<Utc> = metadata.modified()?.into();
        let created_at: DateTime<Utc> = metadata
            .created()
            .map(DateTime::from)
            .unwrap_or(updated_at);

        let description = fm.description.filter(|d| !d.trim().is_empty());
        let excerpt = match &description {
            Some(d) => d.clone(),
            None => excerpt(body, self.excerpt_length),
        };

        Ok(Post {
            slug: slug.to_string(),
            title: fm.title.unwrap_or_else(|| slug.to_string()),
            date: fm
                .date
                .unwrap_or_else(|| created_at.format("%Y-%m-%d").to_string()),
            tags: fm.tags,
            description,
            cover: fm.cover.filter(|c| !c.trim().is_empty()),
            published: fm.published,
            reading_time: reading_time(body),
            excerpt,
            content: include_content.then(|| body.to_string()),
            created_at,
            updated_at,
        })
    }
}

/// Keep posts tagged `tag`, ignoring case
pub fn filter_by_tag(posts: Vec<Post>, tag: &str) -> Vec<Post> {
    posts.into_iter().filter(|p| p.has_tag(tag)).collect()
}

/// Newest first; undated posts go last and ties keep their current order
pub fn sort_by_date(posts: &mut [Post]) {
    posts.sort_by(|a, b| match (a.sort_key(), b.sort_key()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(BlogError::validation("Missing required field: slug"));
    }
    if !is_valid_slug(slug) {
        return Err(BlogError::validation(
            "Slug may only contain lowercase letters, digits and '-', and cannot start or end with '-'",
        ));
    }
    Ok(())
}

fn front_matter(
    title: &str,
    content: &str,
    date: Option<String>,
    tags: Vec<String>,
    description: Option<String>,
    cover: Option<String>,
    published: Option<bool>,
) -> Result<FrontMatter> {
    if title.trim().is_empty() {
        return Err(BlogError::validation("Missing required field: title"));
    }
    if content.trim().is_empty() {
        return Err(BlogError::validation("Missing required field: content"));
    }

    let date = match date.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()) {
        Some(d) if super::frontmatter::parse_date_string(&d).is_none() => {
            return Err(BlogError::validation(format!("Invalid date: {}", d)));
        }
        Some(d) => d,
        None => Utc::now().date_naive().format("%Y-%m-%d").to_string(),
    };

    let tags = tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    Ok(FrontMatter {
        title: Some(title.to_string()),
        date: Some(date),
        tags,
        description: description.filter(|d| !d.trim().is_empty()),
        cover: cover.filter(|c| !c.trim().is_empty()),
        published: published.unwrap_or(true),
    })
}

fn not_found(slug: &str) -> BlogError {
    BlogError::not_found(format!("Post not found: {}", slug))
}

fn conflict(slug: &str) -> BlogError {
    BlogError::conflict(format!("A post with slug '{}' already exists", slug))
}
