//! Uploaded images under `images/`

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{BlogError, Result};

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted for upload
pub const ALLOWED_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9.-]").unwrap();
}

/// An image on disk, as listed to the admin
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub name: String,
    /// Public URL path
    pub path: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedFile {
    pub name: String,
    pub path: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Image files, newest first
    pub fn list(&self) -> Result<Vec<MediaFile>> {
        self.ensure_dir()?;

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !is_image(&name) {
                continue;
            }
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let updated_at: DateTime<Utc> = metadata.modified()?.into();
            let created_at: DateTime<Utc> = metadata
                .created()
                .map(DateTime::from)
                .unwrap_or(updated_at);

            files.push(MediaFile {
                path: public_path(&name),
                name,
                size: metadata.len(),
                created_at,
                updated_at,
            });
        }

        files.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(files)
    }

    /// Store an upload as `<unix-millis>-<sanitized name>`
    pub fn save(
        &self,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> Result<UploadedFile> {
        if !ALLOWED_TYPES.contains(&content_type) {
            return Err(BlogError::validation(format!(
                "Unsupported file type: {}",
                content_type
            )));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(BlogError::validation("File size cannot exceed 5MB"));
        }
        self.ensure_dir()?;

        let name = format!(
            "{}-{}",
            now.timestamp_millis(),
            sanitize_file_name(original_name)
        );
        fs::write(self.dir.join(&name), bytes)?;
        tracing::info!("Uploaded {} ({} bytes)", name, bytes.len());

        Ok(UploadedFile {
            path: public_path(&name),
            name,
            size: bytes.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    /// Remove an image by file name
    pub fn delete(&self, filename: &str) -> Result<()> {
        let path = self.resolve(filename)?;
        if !path.is_file() {
            return Err(BlogError::not_found(format!("File not found: {}", filename)));
        }
        fs::remove_file(&path)?;
        tracing::info!("Deleted media {}", filename);
        Ok(())
    }

    /// Bytes and content type of an image below the media directory
    pub fn read(&self, relative: &str) -> Result<(Vec<u8>, &'static str)> {
        let path = self.resolve(relative)?;
        if !path.is_file() {
            return Err(BlogError::not_found("Image not found"));
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, content_type_for(&path)))
    }

    /// Join `relative` onto the media directory, refusing anything that escapes it
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        if relative.is_empty() || relative.contains('\\') {
            return Err(BlogError::validation("Invalid file name"));
        }
        let rel = Path::new(relative);
        if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(BlogError::validation("Invalid file name"));
        }
        Ok(self.dir.join(rel))
    }
}

/// Strip every character outside `[a-zA-Z0-9.-]`
pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_CHARS.replace_all(name, "").to_string()
}

/// Content type for an image path, by extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn public_path(name: &str) -> String {
    format!("/api/images/{}", name)
}
