//! Interactive entry of a single transaction.
//!
//! The wizard is a [`StepEngine`] program of date, parties, memo, amount,
//! a growable category sub-flow, a review step and a final persist step.
//! Collected values live in a flat field map keyed like the stored record
//! (`Date`, `From`, ..., `Category1`..), which is exactly what ends up in the
//! pending store.

use std::collections::BTreeMap;
use std::io;

use tracing::info;

use super::engine::{Entry, NavigationState, StepEngine, StepFlow, ValidationError, WizardResult};
use super::keywords::{is_done, is_reserved, ControlWord, DONE};
use super::prompt::{ask_yes_no, Prompter, YesNo};
use super::resolver::AccountResolver;
use crate::errors::{LedgerError, Result};
use crate::ledger::transaction::{
    category_level, AMOUNT_FIELD, DATE_FIELD, FROM_FIELD, MEMO_FIELD, TO_FIELD,
};
use crate::ledger::{
    category_field, parse_entry_date, AccountDirectory, History, Transaction, STORED_DATE_FORMAT,
    TRANSFER_CATEGORY,
};
use crate::storage::{PendingRecord, PendingStore};

const REPEAT: &str = "repeat";
const BACK: &str = "back";
const CONFIRMED: &str = "confirm";
const SAVE: &str = "save";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Date,
    From,
    To,
    Memo,
    Amount,
    /// Category at the given depth, starting at 1.
    Category(usize),
    Confirm,
    Persist,
}

impl WizardStep {
    pub const PROGRAM: [WizardStep; 8] = [
        WizardStep::Date,
        WizardStep::From,
        WizardStep::To,
        WizardStep::Memo,
        WizardStep::Amount,
        WizardStep::Category(1),
        WizardStep::Confirm,
        WizardStep::Persist,
    ];

    /// Field written on commit; confirmation and persistence write nothing.
    pub fn field(&self) -> Option<String> {
        match self {
            WizardStep::Date => Some(DATE_FIELD.into()),
            WizardStep::From => Some(FROM_FIELD.into()),
            WizardStep::To => Some(TO_FIELD.into()),
            WizardStep::Memo => Some(MEMO_FIELD.into()),
            WizardStep::Amount => Some(AMOUNT_FIELD.into()),
            WizardStep::Category(level) => Some(category_field(*level)),
            WizardStep::Confirm | WizardStep::Persist => None,
        }
    }

    fn prompt(&self) -> String {
        match self {
            WizardStep::Date => "Date (MM/DD/YYYY): ".into(),
            WizardStep::From => "From: ".into(),
            WizardStep::To => "To: ".into(),
            WizardStep::Memo => "Memo: ".into(),
            WizardStep::Amount => "Amount: ".into(),
            WizardStep::Category(level) => format!("Category{level} (`{DONE}` to finish): "),
            WizardStep::Confirm | WizardStep::Persist => String::new(),
        }
    }
}

/// Collects one transaction and writes it to the pending store.
pub struct TransactionWizard<'a, P: ?Sized, S: ?Sized> {
    accounts: &'a AccountDirectory,
    account_resolver: AccountResolver,
    category_resolver: AccountResolver,
    historic_from: Vec<String>,
    historic_to: Vec<String>,
    historic_categories: Vec<String>,
    prompter: &'a mut P,
    store: &'a mut S,
    information: BTreeMap<String, String>,
    refund_confirmed: bool,
    persisted: Option<PendingRecord>,
}

impl<'a, P, S> TransactionWizard<'a, P, S>
where
    P: Prompter + ?Sized,
    S: PendingStore + ?Sized,
{
    /// Fails with `ReservedName` when a known account is a control word.
    pub fn new(
        accounts: &'a AccountDirectory,
        history: &History,
        prompter: &'a mut P,
        store: &'a mut S,
    ) -> Result<Self> {
        let account_resolver = AccountResolver::new(accounts.names().iter().cloned())?;
        let historic_categories: Vec<String> = history
            .category_names()
            .into_iter()
            .filter(|name| !is_reserved(name) && !is_done(name))
            .collect();
        let category_resolver = AccountResolver::new(historic_categories.clone())?;

        Ok(Self {
            accounts,
            account_resolver,
            category_resolver,
            historic_from: history.from_names(),
            historic_to: history.to_names(),
            historic_categories,
            prompter,
            store,
            information: BTreeMap::new(),
            refund_confirmed: false,
            persisted: None,
        })
    }

    pub fn run(mut self) -> Result<WizardResult<PendingRecord>> {
        StepEngine::new(WizardStep::PROGRAM).run(&mut self)
    }

    fn value(&self, field: &str) -> &str {
        self.information
            .get(field)
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn is_transfer(&self) -> bool {
        self.accounts.contains(self.value(FROM_FIELD)) && self.accounts.contains(self.value(TO_FIELD))
    }

    fn ask(&mut self, step: WizardStep) -> io::Result<String> {
        self.prompter.ask(&step.prompt())
    }

    fn collect_party(&mut self, step: WizardStep) -> Result<String> {
        let raw = self.ask(step)?;
        if ControlWord::parse(&raw).is_some() {
            return Ok(raw.trim().to_string());
        }
        let resolved = self.account_resolver.resolve(&raw, &mut *self.prompter)?;
        if resolved.is_empty()
            || ControlWord::parse(&resolved).is_some()
            || self.accounts.contains(&resolved)
        {
            return Ok(resolved);
        }

        if step == WizardStep::From {
            let question = format!("`{resolved}` is not one of your accounts. Is it a source of income?");
            match ask_yes_no(&mut *self.prompter, &question)? {
                YesNo::Yes => {}
                YesNo::No => return Ok(REPEAT.into()),
                YesNo::Control(word) => return Ok(word.as_str().into()),
            }
        }

        let historic = if step == WizardStep::From {
            &self.historic_from
        } else {
            &self.historic_to
        };
        Ok(infer_name(&mut *self.prompter, historic, &resolved)?)
    }

    fn collect_amount(&mut self) -> Result<String> {
        let raw = self.ask(WizardStep::Amount)?;
        self.refund_confirmed = false;
        let negative = raw
            .trim()
            .parse::<f64>()
            .is_ok_and(|value| value.is_finite() && value < 0.0);
        if negative {
            match ask_yes_no(&mut *self.prompter, "Negative amount. Is this a refund?")? {
                YesNo::Yes => self.refund_confirmed = true,
                YesNo::No => return Ok(REPEAT.into()),
                YesNo::Control(word) => return Ok(word.as_str().into()),
            }
        }
        Ok(raw)
    }

    fn collect_category(&mut self, level: usize, entry: Entry) -> Result<String> {
        if level == 1 && self.is_transfer() {
            // Re-entered by a retreat: keep walking back past the automatic step.
            return Ok(if entry == Entry::Retreat {
                BACK.into()
            } else {
                TRANSFER_CATEGORY.into()
            });
        }

        let raw = self.ask(WizardStep::Category(level))?;
        if is_done(&raw) || ControlWord::parse(&raw).is_some() {
            return Ok(raw.trim().to_ascii_lowercase());
        }
        let resolved = self.category_resolver.resolve(&raw, &mut *self.prompter)?;
        if resolved.is_empty() || ControlWord::parse(&resolved).is_some() {
            return Ok(resolved);
        }
        Ok(infer_name(
            &mut *self.prompter,
            &self.historic_categories,
            &resolved,
        )?)
    }

    fn collect_confirmation(&mut self) -> Result<String> {
        let transaction = Transaction::from_fields(&self.information)?;
        for line in summary(&transaction) {
            self.prompter.show(&line);
        }
        let answer = match ask_yes_no(&mut *self.prompter, "Save this transaction?")? {
            YesNo::Yes => CONFIRMED,
            YesNo::No => BACK,
            YesNo::Control(word) => word.as_str(),
        };
        Ok(answer.into())
    }
}

impl<P, S> StepFlow for TransactionWizard<'_, P, S>
where
    P: Prompter + ?Sized,
    S: PendingStore + ?Sized,
{
    type Step = WizardStep;
    type Output = PendingRecord;
    type Error = LedgerError;

    fn collect(&mut self, step: WizardStep, entry: Entry) -> Result<String> {
        match step {
            WizardStep::Date | WizardStep::Memo => Ok(self.ask(step)?),
            WizardStep::From | WizardStep::To => self.collect_party(step),
            WizardStep::Amount => self.collect_amount(),
            WizardStep::Category(level) => self.collect_category(level, entry),
            WizardStep::Confirm => self.collect_confirmation(),
            WizardStep::Persist => Ok(SAVE.into()),
        }
    }

    fn validate(&self, step: WizardStep, info: &str) -> std::result::Result<(), ValidationError> {
        let info = info.trim();
        match step {
            WizardStep::Date => parse_entry_date(info)
                .map(|_| ())
                .ok_or_else(|| ValidationError::new("Use MM/DD/YY or MM/DD/YYYY")),
            WizardStep::From | WizardStep::Memo | WizardStep::Category(_) => {
                if info.is_empty() {
                    Err(ValidationError::new("Value cannot be empty"))
                } else {
                    Ok(())
                }
            }
            WizardStep::To => {
                let from = self.value(FROM_FIELD);
                if info.is_empty() {
                    Err(ValidationError::new("Value cannot be empty"))
                } else if info == from {
                    Err(ValidationError::new("From and To must differ"))
                } else if !self.accounts.contains(from) && !self.accounts.contains(info) {
                    Err(ValidationError::new(
                        "Either From or To must be one of your accounts",
                    ))
                } else {
                    Ok(())
                }
            }
            WizardStep::Amount => match info.parse::<f64>() {
                Ok(value) if value.is_finite() && value > 0.0 => Ok(()),
                Ok(value) if value.is_finite() && value < 0.0 && self.refund_confirmed => Ok(()),
                Ok(_) => Err(ValidationError::new("Amount must be greater than zero")),
                Err(_) => Err(ValidationError::new("Enter a numeric amount")),
            },
            WizardStep::Confirm | WizardStep::Persist => Ok(()),
        }
    }

    fn rejected(&mut self, step: WizardStep, error: &ValidationError) {
        let label = step.field().unwrap_or_else(|| format!("{step:?}"));
        self.prompter.show(&format!("Invalid {label}: {error}"));
    }

    fn commit(
        &mut self,
        step: WizardStep,
        info: &str,
        navigation: &mut NavigationState<WizardStep>,
    ) -> Result<()> {
        let info = info.trim();
        match step {
            WizardStep::Date => {
                if let Some(date) = parse_entry_date(info) {
                    self.information.insert(
                        DATE_FIELD.into(),
                        date.format(STORED_DATE_FORMAT).to_string(),
                    );
                }
            }
            WizardStep::Amount => {
                if let Ok(value) = info.parse::<f64>() {
                    self.information
                        .insert(AMOUNT_FIELD.into(), value.to_string());
                }
            }
            WizardStep::Category(level) => {
                self.information
                    .retain(|key, _| category_level(key).map_or(true, |known| known < level));
                navigation.discard_next_while(|queued| matches!(queued, WizardStep::Category(_)));
                if is_done(info) {
                    return Ok(());
                }
                self.information.insert(category_field(level), info.into());
                let automatic = level == 1 && info == TRANSFER_CATEGORY && self.is_transfer();
                if !automatic {
                    navigation.schedule_next(WizardStep::Category(level + 1));
                }
            }
            WizardStep::Persist => {
                let transaction = Transaction::from_fields(&self.information)?;
                let name = self.store.save_pending(&transaction)?;
                info!(record = %name, amount = transaction.amount, "transaction recorded");
                self.persisted = Some(PendingRecord { name, transaction });
            }
            WizardStep::Confirm => {}
            other => {
                if let Some(field) = other.field() {
                    self.information.insert(field, info.into());
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<PendingRecord> {
        self.persisted
            .take()
            .ok_or_else(|| LedgerError::InvalidRecord("wizard finished without saving".into()))
    }
}

/// Offers the historic spelling of a differently-capitalised name, or asks
/// before introducing a name never seen in history.
fn infer_name<P: Prompter + ?Sized>(
    prompter: &mut P,
    historic: &[String],
    value: &str,
) -> io::Result<String> {
    if historic.iter().any(|known| known == value) {
        return Ok(value.to_string());
    }
    if let Some(known) = historic.iter().find(|known| known.eq_ignore_ascii_case(value)) {
        let question = format!("`{known}` was used before. Use that spelling instead?");
        return Ok(match ask_yes_no(prompter, &question)? {
            YesNo::Yes => known.clone(),
            YesNo::No => value.to_string(),
            YesNo::Control(word) => word.as_str().to_string(),
        });
    }
    let question = format!("`{value}` has never been used before. Really add it?");
    Ok(match ask_yes_no(prompter, &question)? {
        YesNo::Yes => value.to_string(),
        YesNo::No => REPEAT.to_string(),
        YesNo::Control(word) => word.as_str().to_string(),
    })
}

fn summary(transaction: &Transaction) -> Vec<String> {
    let mut lines = vec![
        format!("Date: {}", transaction.date.format(STORED_DATE_FORMAT)),
        format!("From: {}", transaction.from),
        format!("To: {}", transaction.to),
        format!("Memo: {}", transaction.memo),
        format!("Amount: {:.2}", transaction.amount),
    ];
    lines.extend(
        transaction
            .categories
            .iter()
            .enumerate()
            .map(|(index, category)| format!("{}: {category}", category_field(index + 1))),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPendingStore;
    use crate::wizard::prompt::ScriptedPrompter;
    use chrono::NaiveDate;

    fn accounts() -> AccountDirectory {
        AccountDirectory::new(["Checking", "Savings"])
    }

    fn history() -> History {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        History::new(vec![
            Transaction::new(date, "Checking", "Grocer", "shop", 20.0)
                .with_categories(["Food", "Groceries"]),
            Transaction::new(date, "Employer", "Checking", "pay", 900.0)
                .with_categories(["Salary"]),
        ])
    }

    fn run(answers: &[&str]) -> (Result<WizardResult<PendingRecord>>, ScriptedPrompter, MemoryPendingStore) {
        let accounts = accounts();
        let history = history();
        let mut prompter = ScriptedPrompter::new(answers.iter().copied());
        let mut store = MemoryPendingStore::new();
        let result = TransactionWizard::new(&accounts, &history, &mut prompter, &mut store)
            .and_then(TransactionWizard::run);
        (result, prompter, store)
    }

    fn completed(answers: &[&str]) -> (Transaction, ScriptedPrompter) {
        let (result, prompter, store) = run(answers);
        match result.unwrap() {
            WizardResult::Completed(record) => {
                assert_eq!(store.records().len(), 1);
                assert_eq!(store.records()[0], record);
                (record.transaction, prompter)
            }
            WizardResult::Cancelled => panic!("wizard was cancelled"),
        }
    }

    #[test]
    fn records_expense_with_category_path() {
        let (txn, prompter) = completed(&[
            "3/5/24",
            "Checking",
            "Grocer",
            "weekly shop",
            "42.50",
            "Food",
            "Groceries",
            "done",
            "y",
        ]);
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(txn.from, "Checking");
        assert_eq!(txn.to, "Grocer");
        assert_eq!(txn.amount, 42.5);
        assert_eq!(txn.categories, vec!["Food", "Groceries"]);
        assert_eq!(prompter.remaining(), 0);
        assert!(prompter.shown().contains(&"Amount: 42.50".to_string()));
    }

    #[test]
    fn done_at_first_level_leaves_no_categories() {
        let (txn, _) = completed(&["1/1/2024", "Checking", "Grocer", "m", "5", "DONE", "y"]);
        assert!(txn.categories.is_empty());
    }

    #[test]
    fn three_new_categories_then_done() {
        let (txn, prompter) = completed(&[
            "1/1/2024", "Checking", "Grocer", "trip", "300", "Travel", "y", "Flights", "y",
            "Domestic", "y", "done", "y",
        ]);
        assert_eq!(txn.categories, vec!["Travel", "Flights", "Domestic"]);
        let fields = txn.to_fields();
        assert!(fields.contains_key("Category3"));
        assert!(!fields.contains_key("Category4"));
        assert!(prompter
            .asked()
            .iter()
            .any(|prompt| prompt.starts_with("`Travel` has never been used before")));
    }

    #[test]
    fn transfer_skips_categorization() {
        let (txn, prompter) = completed(&["1/2/2024", "Checking", "Savings", "move", "100", "y"]);
        assert_eq!(txn.categories, vec![TRANSFER_CATEGORY]);
        assert!(!prompter
            .asked()
            .iter()
            .any(|prompt| prompt.starts_with("Category")));
    }

    #[test]
    fn income_source_is_confirmed_and_names_resolved() {
        let (txn, prompter) = completed(&[
            "2/1/24", "Employer", "y", "Chekcing", "y", "pay", "1000", "salary", "n", "y", "done",
            "y",
        ]);
        assert_eq!(txn.from, "Employer");
        assert_eq!(txn.to, "Checking");
        assert_eq!(txn.categories, vec!["Salary"]);
        let asked = prompter.asked();
        assert!(asked.contains(&"Did you mean: Checking? (y/n): ".to_string()));
        assert!(asked.contains(&"Did you mean: Salary? (y/n): ".to_string()));
        assert!(asked
            .iter()
            .any(|prompt| prompt.starts_with("`Salary` was used before")));
    }

    #[test]
    fn back_typed_at_a_resolver_question_returns_to_from() {
        let (txn, prompter) = completed(&[
            "1/3/2024", "Employer", "y", "Chekcing", "back", "Employer", "y", "Checking", "pay",
            "10", "Salary", "done", "y",
        ]);
        assert_eq!(txn.from, "Employer");
        assert_eq!(txn.to, "Checking");
        let count = |wanted: &str| {
            prompter
                .asked()
                .iter()
                .filter(|prompt| prompt.as_str() == wanted)
                .count()
        };
        assert_eq!(count("From: "), 2);
        assert_eq!(count("To: "), 2);
        assert_eq!(count("Did you mean: Checking? (y/n): "), 1);
    }

    #[test]
    fn historic_spelling_of_a_payer_is_offered() {
        let (txn, prompter) = completed(&[
            "1/3/2024", "employer", "y", "y", "Checking", "pay", "10", "Salary", "done", "y",
        ]);
        assert_eq!(txn.from, "Employer");
        assert!(prompter
            .asked()
            .contains(&"`Employer` was used before. Use that spelling instead? (y/n): ".to_string()));
    }

    #[test]
    fn historic_spelling_of_a_payee_is_offered() {
        let (txn, prompter) = completed(&[
            "1/3/2024", "Checking", "grocer", "y", "shop", "8", "done", "y",
        ]);
        assert_eq!(txn.to, "Grocer");
        assert!(!prompter
            .asked()
            .iter()
            .any(|prompt| prompt.contains("has never been used before")));
    }

    #[test]
    fn declined_income_asks_again() {
        let (txn, prompter) = completed(&[
            "2/1/24", "Gift", "n", "Checking", "Grocer", "m", "1", "done", "y",
        ]);
        assert_eq!(txn.from, "Checking");
        let from_prompts = prompter
            .asked()
            .iter()
            .filter(|prompt| prompt.as_str() == "From: ")
            .count();
        assert_eq!(from_prompts, 2);
    }

    #[test]
    fn invalid_input_is_reprompted() {
        let (txn, prompter) = completed(&[
            "2024/13/45",
            "1/3/2024",
            "Checking",
            "Checking",
            "Grocer",
            "",
            "lunch",
            "free",
            "0",
            "12",
            "done",
            "y",
        ]);
        assert_eq!(txn.memo, "lunch");
        assert_eq!(txn.amount, 12.0);
        let shown = prompter.shown();
        assert!(shown.contains(&"Invalid Date: Use MM/DD/YY or MM/DD/YYYY".to_string()));
        assert!(shown.contains(&"Invalid To: From and To must differ".to_string()));
        assert!(shown.contains(&"Invalid Memo: Value cannot be empty".to_string()));
        assert!(shown.contains(&"Invalid Amount: Enter a numeric amount".to_string()));
        assert!(shown.contains(&"Invalid Amount: Amount must be greater than zero".to_string()));
    }

    #[test]
    fn negative_amount_requires_refund_confirmation() {
        let (txn, _) = completed(&[
            "1/3/2024", "Checking", "Grocer", "return", "-20", "n", "-20", "y", "done", "y",
        ]);
        assert_eq!(txn.amount, -20.0);
    }

    #[test]
    fn back_walks_category_levels_and_confirm_no_reenters_deepest() {
        let (txn, prompter) = completed(&[
            "1/3/2024",
            "Checking",
            "Grocer",
            "m",
            "10",
            "Food",
            "Groceries",
            "back",
            "done",
            "n",
            "Groceries",
            "done",
            "y",
        ]);
        assert_eq!(txn.categories, vec!["Food", "Groceries"]);
        let category_prompts: Vec<&String> = prompter
            .asked()
            .iter()
            .filter(|prompt| prompt.starts_with("Category"))
            .collect();
        assert_eq!(
            category_prompts
                .iter()
                .map(|prompt| &prompt[..9])
                .collect::<Vec<_>>(),
            [
                "Category1",
                "Category2",
                "Category3",
                "Category2",
                "Category2",
                "Category3"
            ]
        );
    }

    #[test]
    fn back_from_confirm_on_transfer_returns_to_amount() {
        let (txn, _) = completed(&[
            "1/2/2024", "Checking", "Savings", "move", "100", "n", "150", "y",
        ]);
        assert_eq!(txn.amount, 150.0);
        assert_eq!(txn.categories, vec![TRANSFER_CATEGORY]);
    }

    #[test]
    fn cancel_discards_everything() {
        let (result, _, store) = run(&["1/2/2024", "Checking", "cancel"]);
        assert_eq!(result.unwrap(), WizardResult::Cancelled);
        assert!(store.records().is_empty());
    }

    #[test]
    fn control_word_answers_a_confirmation() {
        let (result, _, store) = run(&["1/2/2024", "Gift", "quit"]);
        assert_eq!(result.unwrap(), WizardResult::Cancelled);
        assert!(store.records().is_empty());
    }

    #[test]
    fn exhausted_input_is_an_error() {
        let (result, _, _) = run(&["1/2/2024"]);
        assert!(matches!(result, Err(LedgerError::Io(_))));
    }

    #[test]
    fn reserved_account_name_is_rejected() {
        let accounts = AccountDirectory::new(["Checking", "Quit"]);
        let history = History::default();
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let mut store = MemoryPendingStore::new();
        assert!(matches!(
            TransactionWizard::new(&accounts, &history, &mut prompter, &mut store),
            Err(LedgerError::ReservedName(_))
        ));
    }
}
