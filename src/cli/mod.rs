//! Interactive and scripted shell over the ledger.

mod core;
pub mod help;
pub mod io;
pub mod output;
mod shell;

pub use self::core::{CliError, CliMode};
pub use shell::{run_cli, SCRIPT_ENV};
