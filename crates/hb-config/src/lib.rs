//! hb-config
//!
//! Persistent user preferences and the category template loader.
//! Owns the Config data structure, template file parsing, and disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;
pub mod template;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
pub use template::{load_templates, parse_templates, TemplateFormat, TemplateSet};
