use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    errors::{LedgerError, Result},
    ledger::Transaction,
    utils::{ensure_dir, PathResolver},
};

use super::{pending_name, PendingRecord, PendingStore};

const PENDING_EXTENSION: &str = "json";

/// Pending transactions stored as one flat JSON document per record under
/// `transactions/unreconciled/`.
#[derive(Debug, Clone)]
pub struct JsonPendingStore {
    dir: PathBuf,
}

impl JsonPendingStore {
    pub fn new(paths: &PathResolver) -> Self {
        Self::in_dir(paths.unreconciled_dir())
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{PENDING_EXTENSION}"))
    }

    fn documents(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(PENDING_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl PendingStore for JsonPendingStore {
    fn save_pending(&mut self, transaction: &Transaction) -> Result<String> {
        ensure_dir(&self.dir)?;
        let name = (0..)
            .map(|n| pending_name(transaction, n))
            .find(|candidate| !self.document_path(candidate).exists())
            .unwrap_or_default();
        let json = serde_json::to_string_pretty(transaction)?;
        let mut file = File::create(self.document_path(&name))?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        info!(record = %name, "saved pending transaction");
        Ok(name)
    }

    fn load_pending(&self) -> Result<Vec<PendingRecord>> {
        let mut records = Vec::new();
        for path in self.documents()? {
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default()
                .to_string();
            let data = fs::read_to_string(&path)?;
            let transaction: Transaction = serde_json::from_str(&data).map_err(|err| {
                warn!(path = %path.display(), error = %err, "unreadable pending record");
                LedgerError::InvalidRecord(format!("{}: {err}", path.display()))
            })?;
            records.push(PendingRecord { name, transaction });
        }
        Ok(records)
    }

    fn clear_pending(&mut self) -> Result<usize> {
        let documents = self.documents()?;
        for path in &documents {
            fs::remove_file(path)?;
        }
        Ok(documents.len())
    }
}
