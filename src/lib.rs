#![doc(test(attr(deny(warnings))))]

//! Pocket Ledger keeps personal books in plain CSV files: a guided
//! transaction wizard, balance runs over pending entries and
//! income/expense breakdowns by category.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod report;
pub mod storage;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Pocket Ledger tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
