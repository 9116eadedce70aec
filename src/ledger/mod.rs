//! Ledger domain models: transactions, accounts, balances and history.

pub mod account;
pub mod balance;
pub mod history;
pub mod transaction;

pub use account::AccountDirectory;
pub use balance::{round_cents, BalanceEngine, BalanceEntry, Balances};
pub use history::{Column, History, SearchHit};
pub use transaction::{
    category_field, parse_entry_date, Transaction, STORED_DATE_FORMAT, TRANSFER_CATEGORY,
};
