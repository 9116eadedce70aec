pub mod books;

pub use books::{BalanceRun, Books, EditOutcome};
