mod common;

use std::fs;

use chrono::NaiveDate;
use pocket_ledger::core::Books;
use pocket_ledger::errors::LedgerError;
use pocket_ledger::ledger::{BalanceEngine, Balances, Transaction};
use pocket_ledger::utils::PathResolver;
use pocket_ledger::wizard::{ScriptedPrompter, WizardResult};

use common::seeded_home;

fn add(books: &mut Books, answers: &[&str]) {
    let mut prompter = ScriptedPrompter::new(answers.iter().copied());
    let outcome = books.add_transaction(&mut prompter).unwrap();
    assert!(matches!(outcome, WizardResult::Completed(_)));
}

#[test]
fn incremental_and_full_recalculation_agree() {
    let home = seeded_home();
    let paths = PathResolver::new(home.path());
    let mut books = Books::open(paths.clone()).unwrap();

    add(
        &mut books,
        &["03/01/2024", "Employer", "y", "y", "Checking", "march pay", "1200", "Salary", "y", "done", "y"],
    );
    add(
        &mut books,
        &["03/02/2024", "Checking", "Savings", "stash", "300", "y"],
    );
    let pending = books.pending().unwrap();
    assert_eq!(pending.len(), 2);

    let run = books.calculate_balances().unwrap();
    assert_eq!(run.merged, 2);

    let seed = Balances::from_pairs([("Checking", 100.0), ("Savings", 50.0)]);
    let direct: Vec<Transaction> = pending.into_iter().map(|record| record.transaction).collect();
    let expected = BalanceEngine::apply_transactions(&seed, &direct);
    assert_eq!(run.balances.rounded(), expected.rounded());
    assert_eq!(run.balances.get("Checking"), Some(1000.0));
    assert_eq!(run.balances.get("Savings"), Some(350.0));

    let rebuilt = Books::open(paths).unwrap().recalculate().unwrap();
    assert_eq!(rebuilt.merged, 0);
    assert_eq!(rebuilt.balances.rounded(), run.balances.rounded());
    assert_eq!(rebuilt.net_worth(), 1350.0);
}

#[test]
fn transfers_are_categorised_automatically() {
    let home = seeded_home();
    let mut books = Books::open(PathResolver::new(home.path())).unwrap();
    add(
        &mut books,
        &["03/02/2024", "Savings", "Checking", "top up", "20", "y"],
    );
    books.calculate_balances().unwrap();

    let row = &books.history().rows()[0];
    assert_eq!(row.categories, vec!["Transfer".to_string()]);
    assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
}

#[test]
fn unreadable_history_row_blocks_opening_and_is_kept() {
    let home = seeded_home();
    let paths = PathResolver::new(home.path());
    fs::create_dir_all(paths.transactions_dir()).unwrap();
    let original = "Date,From,To,Memo,Amount,Category1\n\
                    2024-01-10,Checking,Cafe,latte,4,Food\n\
                    2024-13-40,Checking,Landlord,january rent,700,Housing\n";
    fs::write(paths.transactions_file(), original).unwrap();

    match Books::open(paths.clone()) {
        Err(LedgerError::InvalidRecord(message)) => assert!(message.contains("line 3")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("books opened over an unreadable history row"),
    }
    let after = fs::read_to_string(paths.transactions_file()).unwrap();
    assert_eq!(after, original);
    assert!(after.contains("january rent"));
}
