use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stores user-configurable CLI preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_household_name")]
    pub household_name: String,
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "Config::default_grouping_separator")]
    pub grouping_separator: char,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default = "Config::default_history_limit")]
    pub history_limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Template file loaded on startup when the household has no categories yet.
    pub template_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            household_name: Self::default_household_name(),
            currency_symbol: Self::default_currency_symbol(),
            grouping_separator: Self::default_grouping_separator(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            history_limit: Self::default_history_limit(),
            last_user: None,
            template_path: None,
        }
    }
}

impl Config {
    pub fn default_household_name() -> String {
        "household".into()
    }

    pub fn default_currency_symbol() -> String {
        "$".into()
    }

    pub fn default_grouping_separator() -> char {
        '.'
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_history_limit() -> usize {
        20
    }

    /// Template path from the config, else `budgets.yaml` in the home directory.
    pub fn resolve_template_path(&self) -> PathBuf {
        if let Some(path) = &self.template_path {
            return path.clone();
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("budgets.yaml")
    }
}
