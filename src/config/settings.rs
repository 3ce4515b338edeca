//! Process-level settings (paths and secrets), as opposed to the editable site config

use std::path::PathBuf;

/// Admin password used when `ADMIN_PASSWORD` is not set
pub const DEFAULT_ADMIN_PASSWORD: &str = "123456";

/// JWT secret used when `JWT_SECRET` is not set
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-this-in-production";

/// Settings the server is started with
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of `posts/`, `pages/` and `images/`
    pub content_dir: PathBuf,
    /// Site config file
    pub config_path: PathBuf,
    /// Mounted config file that takes precedence when it exists
    pub config_override: Option<PathBuf>,
    /// Plaintext admin password
    pub admin_password: String,
    /// HMAC secret for admin tokens
    pub jwt_secret: String,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            config_path: PathBuf::from("config/site.config.json"),
            config_override: Some(PathBuf::from("/app/config/site.config.json")),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            secure_cookies: false,
        }
    }
}

impl Settings {
    /// Log a warning for each secret still at its built-in value
    pub fn warn_insecure_defaults(&self) {
        if self.admin_password == DEFAULT_ADMIN_PASSWORD {
            tracing::warn!("ADMIN_PASSWORD is not set, using the default password");
        }
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("JWT_SECRET is not set, tokens are signed with a public default");
        }
    }
}
