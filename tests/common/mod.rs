#![allow(dead_code)]

use std::fs;

use assert_cmd::Command;
use tempfile::TempDir;

pub const SCRIPT_ENV: &str = "POCKET_LEDGER_SCRIPT";
pub const HOME_ENV: &str = "POCKET_LEDGER_HOME";

/// A ledger directory seeded with `Checking` and `Savings`.
pub fn seeded_home() -> TempDir {
    let home = TempDir::new().expect("create temp dir");
    let balances = home.path().join("balances");
    fs::create_dir_all(&balances).expect("create balances dir");
    fs::write(
        balances.join("initial_balances.csv"),
        "Account,Balance\nChecking,100\nSavings,50\n",
    )
    .expect("write seed balances");
    home
}

/// The binary in script mode, rooted at `home`.
pub fn ledger_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pocket_ledger").expect("binary builds");
    cmd.env(SCRIPT_ENV, "1").env(HOME_ENV, home.path());
    cmd
}
