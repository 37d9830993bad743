//! Split ratios of shared categories.

use hb_domain::ShareSpec;

/// Share used when a user has no entry or the configured value cannot be read.
pub const DEFAULT_SHARE: f64 = 0.5;

/// Fraction in `[0, 1]` of a shared category's limit attributed to one user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatio(f64);

impl SplitRatio {
    /// Normalises a configured number: values above 1 are percentages.
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        let fraction = if value <= 1.0 { value } else { value / 100.0 };
        Self(fraction.clamp(0.0, 1.0))
    }

    /// Parses `"50"`, `"50%"` or `"0.5"`. Unreadable input falls back to the default.
    pub fn parse(raw: &str) -> Self {
        let cleaned = raw.trim().replace('%', "");
        match cleaned.trim().parse::<f64>() {
            Ok(value) => Self::new(value),
            Err(_) => {
                tracing::debug!(raw, "unreadable split ratio, using default");
                Self::default()
            }
        }
    }

    /// Ratio for an optional template entry; a missing entry means an even split.
    pub fn from_spec(spec: Option<&ShareSpec>) -> Self {
        match spec {
            Some(ShareSpec::Number(value)) => Self::new(*value),
            Some(ShareSpec::Text(raw)) => Self::parse(raw),
            None => Self::default(),
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `round(limit_total * ratio)`, ties to even.
    pub fn personal_cap(self, limit_total: u64) -> u64 {
        (limit_total as f64 * self.0).round_ties_even() as u64
    }
}

impl Default for SplitRatio {
    fn default() -> Self {
        Self(DEFAULT_SHARE)
    }
}
