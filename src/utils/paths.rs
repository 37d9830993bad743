use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".household_budget";
const HOME_ENV: &str = "HOUSEHOLD_BUDGET_HOME";

/// Returns the application data directory: `$HOUSEHOLD_BUDGET_HOME`, else
/// `~/.household_budget`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
