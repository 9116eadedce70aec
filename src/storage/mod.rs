pub mod csv_backend;
pub mod json_backend;

use crate::{
    errors::Result,
    ledger::{Balances, History, Transaction},
    report::ReportTable,
};

/// A wizard-completed transaction that has not yet been merged into history.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRecord {
    pub name: String,
    pub transaction: Transaction,
}

/// Append-only area for pending transactions, one named document each.
pub trait PendingStore {
    /// Writes `transaction` under a fresh name and returns that name.
    fn save_pending(&mut self, transaction: &Transaction) -> Result<String>;
    /// Every pending record, ordered by name.
    fn load_pending(&self) -> Result<Vec<PendingRecord>>;
    /// Removes every pending record, returning how many were dropped.
    fn clear_pending(&mut self) -> Result<usize>;
}

impl<S: PendingStore + ?Sized> PendingStore for &mut S {
    fn save_pending(&mut self, transaction: &Transaction) -> Result<String> {
        (**self).save_pending(transaction)
    }

    fn load_pending(&self) -> Result<Vec<PendingRecord>> {
        (**self).load_pending()
    }

    fn clear_pending(&mut self) -> Result<usize> {
        (**self).clear_pending()
    }
}

/// Seed and current per-account balances.
pub trait BalanceStore {
    /// Fails with `MissingStore` when the seed file does not exist.
    fn load_initial(&self) -> Result<Balances>;
    /// Current balances, or the seed when none were saved yet.
    fn load_current(&self) -> Result<Balances>;
    fn save_initial(&self, balances: &Balances) -> Result<()>;
    fn save_current(&self, balances: &Balances) -> Result<()>;
}

/// The permanent transaction table.
pub trait HistoryStore {
    fn load_history(&self) -> Result<History>;
    fn save_history(&self, history: &History) -> Result<()>;
}

/// Receives finished report tables for export.
pub trait ReportSink {
    /// Returns a description of where the report went.
    fn write_report(&self, table: &ReportTable) -> Result<String>;
}

/// Document stem for the `n`th pending record sharing date, payer and payee.
pub fn pending_name(transaction: &Transaction, n: usize) -> String {
    format!(
        "{}_{}_{}_{}",
        transaction.date.format("%Y%m%d"),
        file_safe(&transaction.from),
        file_safe(&transaction.to),
        n
    )
}

fn file_safe(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "party".into()
    } else {
        sanitized
    }
}

/// In-memory pending store for wizard runs that never touch disk.
#[derive(Debug, Default)]
pub struct MemoryPendingStore {
    records: Vec<PendingRecord>,
}

impl MemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PendingRecord] {
        &self.records
    }
}

impl PendingStore for MemoryPendingStore {
    fn save_pending(&mut self, transaction: &Transaction) -> Result<String> {
        let name = (0..)
            .map(|n| pending_name(transaction, n))
            .find(|candidate| self.records.iter().all(|record| &record.name != candidate))
            .unwrap_or_default();
        self.records.push(PendingRecord {
            name: name.clone(),
            transaction: transaction.clone(),
        });
        Ok(name)
    }

    fn load_pending(&self) -> Result<Vec<PendingRecord>> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    fn clear_pending(&mut self) -> Result<usize> {
        let cleared = self.records.len();
        self.records.clear();
        Ok(cleared)
    }
}
