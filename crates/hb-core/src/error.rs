use std::io;

use thiserror::Error;
use uuid::Uuid;

use crate::{allocation::AllocationError, money::MoneyError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Household not found: {0}")]
    HouseholdNotFound(String),
    #[error("Unknown user: {0}")]
    UnknownUser(String),
    #[error("Budget not found: {0}")]
    BudgetNotFound(Uuid),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
