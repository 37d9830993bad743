use chrono::{DateTime, Utc};
use hb_core::Clock;

/// Wall-clock time for the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
