//! Category template files.
//!
//! ```yaml
//! users: [ana, ben]
//! categories:
//!   - key: rent
//!     name: Rent
//!     type: shared
//!     limit_total: 800000
//!     shares: { ana: "60%", ben: 40 }
//!   - key: gym
//!     name: Gym
//!     type: individual
//!     owner: ana
//!     limit_total: 30000
//! ```

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::Path,
};

use hb_domain::{CategoryKind, CategoryTemplate, ShareSpec};
use serde::Deserialize;

use crate::ConfigError;

/// Users and category templates read from a template file.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSet {
    pub users: Vec<String>,
    pub categories: Vec<CategoryTemplate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Yaml,
    Json,
}

impl TemplateFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TemplateFormat::Json,
            _ => TemplateFormat::Yaml,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    users: Vec<String>,
    #[serde(default)]
    categories: Vec<TemplateRecord>,
}

#[derive(Debug, Deserialize)]
struct TemplateRecord {
    key: String,
    name: String,
    #[serde(rename = "type")]
    kind: RecordKind,
    #[serde(default)]
    owner: Option<String>,
    limit_total: u64,
    #[serde(default)]
    shares: Option<BTreeMap<String, ShareSpec>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RecordKind {
    Shared,
    Individual,
}

pub fn load_templates(path: &Path) -> Result<TemplateSet, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_templates(&contents, TemplateFormat::from_path(path))
}

pub fn parse_templates(contents: &str, format: TemplateFormat) -> Result<TemplateSet, ConfigError> {
    let file: TemplateFile = match format {
        TemplateFormat::Yaml => {
            serde_yaml::from_str(contents).map_err(|err| ConfigError::Serde(err.to_string()))?
        }
        TemplateFormat::Json => {
            serde_json::from_str(contents).map_err(|err| ConfigError::Serde(err.to_string()))?
        }
    };

    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(file.categories.len());
    for record in file.categories {
        let key = record.key.trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::Template(format!(
                "category `{}` has an empty key",
                record.name
            )));
        }
        if !seen.insert(key.clone()) {
            return Err(ConfigError::Template(format!("duplicate category key `{key}`")));
        }
        let kind = match record.kind {
            RecordKind::Shared => CategoryKind::Shared {
                shares: record.shares.unwrap_or_default(),
            },
            RecordKind::Individual => {
                let owner = record
                    .owner
                    .map(|owner| owner.trim().to_string())
                    .filter(|owner| !owner.is_empty())
                    .ok_or_else(|| {
                        ConfigError::Template(format!("individual category `{key}` needs an owner"))
                    })?;
                CategoryKind::Individual { owner }
            }
        };
        categories.push(CategoryTemplate {
            key,
            name: record.name,
            kind,
            limit_total: record.limit_total,
        });
    }

    Ok(TemplateSet {
        users: file.users,
        categories,
    })
}
