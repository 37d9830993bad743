use std::result::Result as StdResult;

use hb_config::ConfigError;
use hb_core::{AllocationError, CoreError, MoneyError};
use thiserror::Error;

/// Unified error type for the core, config, and storage layers.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Household not found: {0}")]
    HouseholdNotFound(String),
    #[error("Unknown user: {0}")]
    UnknownUser(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Allocation rejected: {0}")]
    AllocationRejected(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, BudgetError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

impl From<MoneyError> for BudgetError {
    fn from(err: MoneyError) -> Self {
        BudgetError::InvalidAmount(err.to_string())
    }
}

impl From<AllocationError> for BudgetError {
    fn from(err: AllocationError) -> Self {
        BudgetError::AllocationRejected(err.to_string())
    }
}

impl From<CoreError> for BudgetError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::HouseholdNotFound(name) => BudgetError::HouseholdNotFound(name),
            CoreError::UnknownUser(user) => BudgetError::UnknownUser(user),
            CoreError::BudgetNotFound(id) => {
                BudgetError::InvalidInput(format!("budget {id} not found"))
            }
            CoreError::Validation(message) => BudgetError::InvalidInput(message),
            CoreError::Allocation(err) => BudgetError::from(err),
            CoreError::Money(err) => BudgetError::from(err),
            CoreError::Storage(message) | CoreError::Serde(message) => {
                BudgetError::StorageError(message)
            }
            CoreError::Io(err) => BudgetError::StorageError(err.to_string()),
        }
    }
}

impl From<ConfigError> for BudgetError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => BudgetError::StorageError(io.to_string()),
            ConfigError::Serde(message) | ConfigError::Template(message) => {
                BudgetError::ConfigError(message)
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(BudgetError::from(err))
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(BudgetError::from(err))
    }
}
