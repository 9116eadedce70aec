use chrono::NaiveDate;
use tracing::info;

use crate::errors::Result;
use crate::ledger::{AccountDirectory, BalanceEngine, Balances, Column, History, Transaction};
use crate::report::{ReportEngine, ReportKind, ReportTable};
use crate::storage::csv_backend::{ensure_seed, CsvStore};
use crate::storage::json_backend::JsonPendingStore;
use crate::storage::{BalanceStore, HistoryStore, PendingRecord, PendingStore, ReportSink};
use crate::utils::PathResolver;
use crate::wizard::{ask_yes_no, Prompter, TransactionWizard, WizardResult, YesNo};

/// Outcome of a balance run.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceRun {
    /// Pending records folded into history by this run.
    pub merged: usize,
    pub balances: Balances,
}

impl BalanceRun {
    pub fn net_worth(&self) -> f64 {
        self.balances.net_worth()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    NoMatch,
    /// Every candidate was declined.
    Declined,
    Cancelled,
    Replaced {
        removed: Transaction,
        record: PendingRecord,
    },
}

/// Session facade over the on-disk books: seed and current balances, the
/// transaction history and the pending area.
pub struct Books {
    store: CsvStore,
    pending: JsonPendingStore,
    accounts: AccountDirectory,
    history: History,
}

impl Books {
    /// Creates the data layout and an empty balance seed. Returns `true` when
    /// the seed was written by this call.
    pub fn bootstrap(paths: &PathResolver) -> Result<bool> {
        paths.ensure_layout()?;
        let created = ensure_seed(paths)?;
        if created {
            info!(root = %paths.root().display(), "initialized ledger directory");
        }
        Ok(created)
    }

    /// Loads accounts and history. Fails with `MissingStore` when the seed
    /// balances are absent.
    pub fn open(paths: PathResolver) -> Result<Self> {
        let pending = JsonPendingStore::new(&paths);
        let store = CsvStore::new(paths);
        let initial = store.load_initial()?;
        let accounts = AccountDirectory::new(initial.accounts());
        let history = store.load_history()?;
        info!(
            accounts = accounts.len(),
            transactions = history.len(),
            "opened books"
        );
        Ok(Self {
            store,
            pending,
            accounts,
            history,
        })
    }

    pub fn accounts(&self) -> &AccountDirectory {
        &self.accounts
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn pending(&self) -> Result<Vec<PendingRecord>> {
        self.pending.load_pending()
    }

    /// Current balances restricted to, and complete over, the known accounts.
    pub fn balances(&self) -> Result<Balances> {
        let initial = self.store.load_initial()?;
        let current = self.store.load_current()?;
        Ok(reconcile(&initial, &current))
    }

    /// Runs the transaction wizard; a completed run leaves one pending record.
    pub fn add_transaction<P: Prompter + ?Sized>(
        &mut self,
        prompter: &mut P,
    ) -> Result<WizardResult<PendingRecord>> {
        TransactionWizard::new(&self.accounts, &self.history, prompter, &mut self.pending)?.run()
    }

    /// Folds pending records into history and into the current balances,
    /// then clears the pending area.
    pub fn calculate_balances(&mut self) -> Result<BalanceRun> {
        let current = self.balances()?;
        let merged = self.merge_pending()?;
        let balances = BalanceEngine::apply_transactions(&current, &merged);
        self.store.save_current(&balances)?;
        self.pending.clear_pending()?;
        info!(merged = merged.len(), "applied pending transactions");
        Ok(BalanceRun {
            merged: merged.len(),
            balances,
        })
    }

    /// Merges any pending records, then replays the whole history from the
    /// seed balances.
    pub fn recalculate(&mut self) -> Result<BalanceRun> {
        let merged = self.merge_pending()?;
        let initial = self.store.load_initial()?;
        let balances = BalanceEngine::recompute(&initial, self.history.rows());
        self.store.save_current(&balances)?;
        self.pending.clear_pending()?;
        info!(
            merged = merged.len(),
            transactions = self.history.len(),
            "recomputed balances from history"
        );
        Ok(BalanceRun {
            merged: merged.len(),
            balances,
        })
    }

    fn merge_pending(&mut self) -> Result<Vec<Transaction>> {
        let merged: Vec<Transaction> = self
            .pending
            .load_pending()?
            .into_iter()
            .map(|record| record.transaction)
            .collect();
        if !merged.is_empty() {
            self.history.merge(merged.iter().cloned());
            self.store.save_history(&self.history)?;
        }
        Ok(merged)
    }

    /// Income then expense breakdowns of the history.
    pub fn reports(&self, date: NaiveDate) -> Vec<ReportTable> {
        let engine = ReportEngine::new(&self.accounts);
        ReportKind::ALL
            .iter()
            .map(|kind| ReportTable::from_report(&engine.run(self.history.rows(), *kind), date))
            .collect()
    }

    pub fn write_report(&self, table: &ReportTable) -> Result<String> {
        self.store.write_report(table)
    }

    /// Adds an account to both the seed and the current balances.
    pub fn add_account(&mut self, name: &str, initial_balance: f64) -> Result<()> {
        let mut accounts = self.accounts.clone();
        accounts.add(name)?;
        let name = name.trim();

        let mut current = self.balances()?;
        let mut initial = self.store.load_initial()?;
        initial.insert(name, initial_balance);
        current.insert(name, initial_balance);
        self.store.save_initial(&initial)?;
        self.store.save_current(&current)?;

        self.accounts = accounts;
        info!(account = name, initial_balance, "added account");
        Ok(())
    }

    /// Offers each row matching `key` in `column`; the first accepted row is
    /// replaced by a fresh wizard run and balances are recomputed.
    pub fn edit<P: Prompter + ?Sized>(
        &mut self,
        prompter: &mut P,
        column: Column,
        key: &str,
    ) -> Result<EditOutcome> {
        let hits = self.history.search(column, key);
        if hits.is_empty() {
            return Ok(EditOutcome::NoMatch);
        }

        let mut selected = None;
        for hit in hits {
            let row = &self.history.rows()[hit.index];
            let question = format!("Edit this transaction? {}", describe(row));
            match ask_yes_no(prompter, &question)? {
                YesNo::Yes => {
                    selected = Some(hit.index);
                    break;
                }
                YesNo::No => continue,
                YesNo::Control(word) if word.halts() => return Ok(EditOutcome::Cancelled),
                YesNo::Control(_) => continue,
            }
        }
        let Some(index) = selected else {
            return Ok(EditOutcome::Declined);
        };

        let outcome =
            TransactionWizard::new(&self.accounts, &self.history, prompter, &mut self.pending)?
                .run()?;
        let record = match outcome {
            WizardResult::Completed(record) => record,
            WizardResult::Cancelled => return Ok(EditOutcome::Cancelled),
        };
        let Some(removed) = self.history.remove(index) else {
            return Ok(EditOutcome::NoMatch);
        };
        self.store.save_history(&self.history)?;
        self.recalculate()?;
        info!(record = %record.name, "replaced transaction");
        Ok(EditOutcome::Replaced { removed, record })
    }
}

fn reconcile(initial: &Balances, current: &Balances) -> Balances {
    Balances::from_pairs(initial.entries().iter().map(|entry| {
        let balance = current.get(&entry.account).unwrap_or(entry.balance);
        (entry.account.clone(), balance)
    }))
}

fn describe(transaction: &Transaction) -> String {
    let mut text = format!(
        "{} {} -> {} \"{}\" {:.2}",
        transaction.date, transaction.from, transaction.to, transaction.memo, transaction.amount
    );
    if !transaction.categories.is_empty() {
        text.push_str(&format!(" [{}]", transaction.categories.join(" / ")));
    }
    text
}
