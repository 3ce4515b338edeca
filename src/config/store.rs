//! JSON-file backed storage for the site configuration

use std::fs;
use std::path::{Path, PathBuf};

use super::SiteConfig;
use crate::error::{BlogError, Result};

/// Reads and writes `site.config.json`
///
/// The file is read on every `load`; nothing is cached in-process.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    override_path: Option<PathBuf>,
}

impl ConfigStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            override_path: None,
        }
    }

    /// Prefer `override_path` whenever that file exists (mounted config in containers)
    pub fn with_override<P: AsRef<Path>>(mut self, override_path: P) -> Self {
        self.override_path = Some(override_path.as_ref().to_path_buf());
        self
    }

    /// The file currently in effect
    pub fn path(&self) -> &Path {
        match &self.override_path {
            Some(p) if p.is_file() => p,
            _ => &self.path,
        }
    }

    /// Load the configuration, falling back to defaults when the file is absent or broken
    pub fn load(&self) -> SiteConfig {
        let path = self.path();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {:?}, using defaults", path);
                return SiteConfig::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read config {:?}: {}", path, e);
                return SiteConfig::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Config {:?} is not valid JSON, using defaults: {}", path, e);
                SiteConfig::default()
            }
        }
    }

    /// Replace the stored configuration wholesale
    pub fn save(&self, config: &SiteConfig) -> Result<()> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(BlogError::InvalidConfig(errors));
        }
        self.write(config)
    }

    /// Overwrite the stored configuration with the built-in defaults
    pub fn reset(&self) -> Result<SiteConfig> {
        let config = SiteConfig::default();
        self.write(&config)?;
        tracing::info!("Site config reset to defaults");
        Ok(config)
    }

    fn write(&self, config: &SiteConfig) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        tracing::info!("Saved site config to {:?}", path);
        Ok(())
    }
}
