//! Month keys identify a budgeting period (`YYYY-MM`).

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar month used to group budgets and contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        if !(1..=12).contains(&month) {
            return Err(MonthKeyError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// Human readable label such as `October 2026`.
    pub fn display_name(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let date = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map_err(|_| MonthKeyError::Malformed(trimmed.to_string()))?;
        Ok(Self::from_date(date))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors that can occur when constructing [`MonthKey`] values.
pub enum MonthKeyError {
    InvalidMonth(u32),
    Malformed(String),
}

impl fmt::Display for MonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthKeyError::InvalidMonth(month) => write!(f, "month {month} is out of range"),
            MonthKeyError::Malformed(raw) => write!(f, "`{raw}` is not a YYYY-MM month"),
        }
    }
}

impl std::error::Error for MonthKeyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_month_keys() {
        let key: MonthKey = "2026-03".parse().expect("parse month");
        assert_eq!(key.year(), 2026);
        assert_eq!(key.month(), 3);
        assert_eq!(key.to_string(), "2026-03");
        assert_eq!(key.display_name(), "March 2026");
    }

    #[test]
    fn steps_across_year_boundaries() {
        let december = MonthKey::new(2025, 12).unwrap();
        assert_eq!(december.next(), MonthKey::new(2026, 1).unwrap());
        assert_eq!(december.next().previous(), december);
        assert_eq!(MonthKey::new(2026, 6).unwrap().previous().to_string(), "2026-05");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!("2026-13".parse::<MonthKey>().is_err());
        assert!("March".parse::<MonthKey>().is_err());
        assert_eq!(MonthKey::new(2026, 0), Err(MonthKeyError::InvalidMonth(0)));
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = MonthKey::new(2025, 11).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2025-11\"");
        let back: MonthKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
