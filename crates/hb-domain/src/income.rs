//! Incomes and the contributions they were distributed into.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Amount a user put towards one monthly budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contribution {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub user: String,
    pub amount: u64,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_id: Option<Uuid>,
}

impl Contribution {
    pub fn new(
        budget_id: Uuid,
        user: impl Into<String>,
        amount: u64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            user: user.into(),
            amount,
            recorded_at,
            income_id: None,
        }
    }

    pub fn for_income(mut self, income_id: Uuid) -> Self {
        self.income_id = Some(income_id);
        self
    }
}

/// A recorded income event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Income {
    pub id: Uuid,
    pub user: String,
    pub amount: u64,
    #[serde(default)]
    pub kind: IncomeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl Income {
    pub fn new(
        user: impl Into<String>,
        amount: u64,
        kind: IncomeKind,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: user.into(),
            amount,
            kind,
            note: None,
            recorded_at,
        }
    }

    /// Attaches a note; blank notes are dropped.
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }
}

/// How an income was earned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IncomeKind {
    Salary,
    #[default]
    Biweekly,
    Other,
}

impl fmt::Display for IncomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IncomeKind::Salary => "Salary",
            IncomeKind::Biweekly => "Biweekly",
            IncomeKind::Other => "Other",
        };
        f.write_str(label)
    }
}

impl FromStr for IncomeKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "salary" => Ok(IncomeKind::Salary),
            "biweekly" => Ok(IncomeKind::Biweekly),
            "other" => Ok(IncomeKind::Other),
            other => Err(format!("unknown income kind `{other}`")),
        }
    }
}
