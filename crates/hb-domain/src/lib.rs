//! hb-domain
//!
//! Pure domain models (Household, CategoryTemplate, MonthlyBudget, Contribution, Income).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod budget;
pub mod category;
pub mod household;
pub mod income;
pub mod month;

pub use budget::*;
pub use category::*;
pub use household::*;
pub use income::*;
pub use month::*;
