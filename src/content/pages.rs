//! Standalone pages such as `about`, stored as `pages/<name>.md`

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::post::is_valid_slug;
use super::{FrontMatter, MarkdownRenderer};
use crate::error::{BlogError, Result};

/// A rendered page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Markdown body without front-matter
    pub content: String,
    pub html_content: String,
}

#[derive(Debug, Clone)]
pub struct PageStore {
    dir: PathBuf,
}

impl PageStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Read and render a page; unknown names are `None`
    pub fn get(&self, name: &str, renderer: &MarkdownRenderer) -> Result<Option<Page>> {
        if !is_valid_slug(name) {
            return Ok(None);
        }

        let path = self.dir.join(format!("{}.md", name));
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (_, body) = FrontMatter::parse(&raw)?;
        let html_content = renderer
            .render(body)
            .map_err(|e| BlogError::Render(e.to_string()))?;

        Ok(Some(Page {
            content: body.to_string(),
            html_content,
        }))
    }
}
