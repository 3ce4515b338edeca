//! Configuration module

mod settings;
mod site;
mod store;

pub use settings::{Settings, DEFAULT_ADMIN_PASSWORD, DEFAULT_JWT_SECRET};
pub use site::{AuthorConfig, NavItem, SiteConfig, SocialConfig, ThemeConfig};
pub use store::ConfigStore;
