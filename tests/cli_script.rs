mod common;

use std::fs;

use common::{ledger_cmd, seeded_home};
use predicates::str::contains;
use tempfile::TempDir;

const GROCERY_RUN: &str = "add\n\
01/15/2024\n\
Checking\n\
Market\n\
y\n\
weekly shop\n\
25.50\n\
Food\n\
y\n\
done\n\
y\n";

#[test]
fn init_creates_layout_and_seed() {
    let home = TempDir::new().unwrap();
    ledger_cmd(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialized ledger"));

    let seed = fs::read_to_string(home.path().join("balances/initial_balances.csv")).unwrap();
    assert!(seed.starts_with("Account,Balance"));
    assert!(home.path().join("transactions/unreconciled").is_dir());
    assert!(home.path().join("reports").is_dir());
}

#[test]
fn shell_refuses_to_start_without_seed() {
    let home = TempDir::new().unwrap();
    ledger_cmd(&home)
        .write_stdin("exit\n")
        .assert()
        .failure()
        .stdout(contains("pocket_ledger init"));
}

#[test]
fn added_transaction_waits_in_pending_area() {
    let home = seeded_home();
    ledger_cmd(&home)
        .write_stdin(format!("{GROCERY_RUN}pending\nexit\n"))
        .assert()
        .success()
        .stdout(contains("Saved pending transaction `20240115_Checking_Market_0`"))
        .stdout(contains("Amount: 25.50"));

    let pending = home
        .path()
        .join("transactions/unreconciled/20240115_Checking_Market_0.json");
    assert!(pending.exists());
}

#[test]
fn balance_run_moves_money_and_clears_pending() {
    let home = seeded_home();
    ledger_cmd(&home)
        .write_stdin(format!("{GROCERY_RUN}balance\nexit\n"))
        .assert()
        .success()
        .stdout(contains("74.50"))
        .stdout(contains("Net worth: 124.50"));

    let history = fs::read_to_string(home.path().join("transactions/transactions.csv")).unwrap();
    assert!(history.contains("Market"));
    let current = fs::read_to_string(home.path().join("balances/current_balances.csv")).unwrap();
    assert!(current.contains("Checking,74.5"));
    let leftover = fs::read_dir(home.path().join("transactions/unreconciled")).unwrap().count();
    assert_eq!(leftover, 0);
}

#[test]
fn report_prints_and_writes_breakdowns() {
    let home = seeded_home();
    ledger_cmd(&home)
        .write_stdin(format!("{GROCERY_RUN}balance\nreport\nexit\n"))
        .assert()
        .success()
        .stdout(contains("Expense | Food: $25.50"))
        .stdout(contains("Market $25.50"));

    let written: Vec<String> = fs::read_dir(home.path().join("reports"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(written.iter().any(|name| name.starts_with("Expense_")));
    assert!(written.iter().any(|name| name.starts_with("Income_")));
}

#[test]
fn cancelled_wizard_leaves_nothing_behind() {
    let home = seeded_home();
    ledger_cmd(&home)
        .write_stdin("add\n01/15/2024\ncancel\nexit\n")
        .assert()
        .success()
        .stdout(contains("Transaction discarded."));

    let leftover = fs::read_dir(home.path().join("transactions/unreconciled"))
        .map(|dir| dir.count())
        .unwrap_or(0);
    assert_eq!(leftover, 0);
}

#[test]
fn account_command_extends_both_balance_files() {
    let home = seeded_home();
    ledger_cmd(&home)
        .write_stdin("account \"Credit Card\" -250\nexit\n")
        .assert()
        .success()
        .stdout(contains("Added account `Credit Card`"));

    let seed = fs::read_to_string(home.path().join("balances/initial_balances.csv")).unwrap();
    assert!(seed.contains("Credit Card,-250"));
    let current = fs::read_to_string(home.path().join("balances/current_balances.csv")).unwrap();
    assert!(current.contains("Credit Card,-250"));
}

#[test]
fn unknown_command_gets_a_suggestion() {
    let home = seeded_home();
    ledger_cmd(&home)
        .write_stdin("balanse\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `balanse`"))
        .stdout(contains("Suggestion: `balance`?"));
}

#[test]
fn input_ending_mid_wizard_stops_the_shell() {
    let home = seeded_home();
    ledger_cmd(&home)
        .write_stdin("add\n01/15/2024\n")
        .assert()
        .success()
        .stdout(contains("no input left"));
}
