use chrono::{DateTime, NaiveDate, Utc};
use hb_domain::MonthKey;

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC date. Defaults to `now().date_naive()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Returns the budgeting month containing `today()`.
    fn current_month(&self) -> MonthKey {
        MonthKey::from_date(self.today())
    }
}
