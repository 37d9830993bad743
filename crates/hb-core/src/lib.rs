//! hb-core
//!
//! Allocation algorithm and household services.
//! Depends on hb-domain. No CLI, no terminal I/O, no direct storage interactions.

pub mod allocation;
pub mod allocation_service;
pub mod error;
pub mod money;
pub mod plan_service;
pub mod split;
pub mod storage;
pub mod summary_service;
pub mod time;

pub use allocation::{
    allocate, rebalance, Allocation, AllocationError, AllocationRow, OvercommitPolicy,
    Rebalanced, MAX_REPAIR_PASSES,
};
pub use allocation_service::*;
pub use error::CoreError;
pub use money::{format_money, parse_money, MoneyError, MoneyFormat};
pub use plan_service::*;
pub use split::SplitRatio;
pub use summary_service::*;
pub use time::Clock;

#[cfg(test)]
mod tests;
