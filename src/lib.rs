#![doc(test(attr(deny(warnings))))]

//! Household Budget splits each income across a household's shared and personal
//! monthly categories, tracks who contributed what, and keeps the results on disk.

pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Household Budget tracing initialized.");
    });
}
