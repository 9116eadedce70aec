use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, Writer};
use tracing::{debug, warn};

use crate::{
    errors::{LedgerError, Result},
    ledger::{
        category_field, BalanceEntry, Balances, History, Transaction, STORED_DATE_FORMAT,
    },
    report::ReportTable,
    utils::{ensure_dir, PathResolver},
};

use super::{BalanceStore, HistoryStore, ReportSink};

const BASE_COLUMNS: [&str; 5] = ["Date", "From", "To", "Memo", "Amount"];

/// Balances, history and reports kept as CSV tables under one data root.
#[derive(Debug, Clone)]
pub struct CsvStore {
    paths: PathResolver,
}

impl CsvStore {
    pub fn new(paths: PathResolver) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn report_path(&self, table: &ReportTable) -> PathBuf {
        self.paths
            .reports_dir()
            .join(format!("{}.csv", table.file_stem()))
    }
}

impl BalanceStore for CsvStore {
    fn load_initial(&self) -> Result<Balances> {
        let path = self.paths.initial_balances_file();
        if !path.exists() {
            return Err(LedgerError::MissingStore(path));
        }
        read_balances(&path)
    }

    fn load_current(&self) -> Result<Balances> {
        let path = self.paths.current_balances_file();
        if path.exists() {
            read_balances(&path)
        } else {
            debug!("no current balances yet, using initial seed");
            self.load_initial()
        }
    }

    fn save_initial(&self, balances: &Balances) -> Result<()> {
        write_balances(&self.paths.initial_balances_file(), balances)
    }

    fn save_current(&self, balances: &Balances) -> Result<()> {
        write_balances(&self.paths.current_balances_file(), balances)
    }
}

impl HistoryStore for CsvStore {
    fn load_history(&self) -> Result<History> {
        let path = self.paths.transactions_file();
        if !path.exists() {
            return Ok(History::default());
        }
        let mut reader = ReaderBuilder::new().flexible(true).from_path(&path)?;
        let headers = reader.headers()?.clone();
        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let fields: BTreeMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.trim().to_string(), value.to_string()))
                .collect();
            // Header is line 1.
            let line = line + 2;
            let transaction = Transaction::from_fields(&fields).map_err(|err| {
                warn!(path = %path.display(), line, error = %err, "unreadable history row");
                let detail = match err {
                    LedgerError::InvalidRecord(detail) => detail,
                    other => other.to_string(),
                };
                LedgerError::InvalidRecord(format!("{} line {line}: {detail}", path.display()))
            })?;
            rows.push(transaction);
        }
        Ok(History::new(rows))
    }

    fn save_history(&self, history: &History) -> Result<()> {
        let path = self.paths.transactions_file();
        let depth = history.max_depth();
        let mut headers: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        headers.extend((1..=depth).map(category_field));

        let rows = history.rows().iter().map(|transaction| {
            let mut row = vec![
                transaction.date.format(STORED_DATE_FORMAT).to_string(),
                transaction.from.clone(),
                transaction.to.clone(),
                transaction.memo.clone(),
                transaction.amount.to_string(),
            ];
            row.extend((1..=depth).map(|level| {
                transaction.category(level).unwrap_or_default().to_string()
            }));
            row
        });
        write_table(&path, &headers, rows)
    }
}

impl ReportSink for CsvStore {
    fn write_report(&self, table: &ReportTable) -> Result<String> {
        let path = self.report_path(table);
        write_table(&path, &table.headers, table.rows.iter().cloned())?;
        Ok(path.display().to_string())
    }
}

fn read_balances(path: &Path) -> Result<Balances> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut balances = Balances::default();
    for entry in reader.deserialize::<BalanceEntry>() {
        let entry = entry?;
        if !balances.insert(entry.account.clone(), entry.balance) {
            warn!(account = %entry.account, path = %path.display(), "duplicate balance row ignored");
        }
    }
    Ok(balances)
}

fn write_balances(path: &Path, balances: &Balances) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut writer = Writer::from_path(path)?;
    if balances.is_empty() {
        writer.write_record(["Account", "Balance"])?;
    }
    for entry in balances.entries() {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_table<I>(path: &Path, headers: &[String], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut writer = Writer::from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes an empty `Account,Balance` seed unless one already exists.
pub fn ensure_seed(paths: &PathResolver) -> Result<bool> {
    let path = paths.initial_balances_file();
    if path.exists() {
        return Ok(false);
    }
    write_balances(&path, &Balances::default())?;
    Ok(true)
}
