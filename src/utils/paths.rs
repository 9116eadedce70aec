use dirs::home_dir;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".pocket_ledger";
const HOME_ENV: &str = "POCKET_LEDGER_HOME";
const BALANCES_DIR: &str = "balances";
const TRANSACTIONS_DIR: &str = "transactions";
const UNRECONCILED_DIR: &str = "unreconciled";
const REPORTS_DIR: &str = "reports";
const INITIAL_BALANCES_FILE: &str = "initial_balances.csv";
const CURRENT_BALANCES_FILE: &str = "current_balances.csv";
const TRANSACTIONS_FILE: &str = "transactions.csv";
const CONFIG_FILE: &str = "config.json";

/// Resolves every on-disk location relative to a single data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses `$POCKET_LEDGER_HOME` when set, otherwise `~/.pocket_ledger`.
    pub fn from_env() -> Self {
        Self::new(Self::base_dir())
    }

    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn balances_dir(&self) -> PathBuf {
        self.root.join(BALANCES_DIR)
    }

    pub fn initial_balances_file(&self) -> PathBuf {
        self.balances_dir().join(INITIAL_BALANCES_FILE)
    }

    pub fn current_balances_file(&self) -> PathBuf {
        self.balances_dir().join(CURRENT_BALANCES_FILE)
    }

    pub fn transactions_dir(&self) -> PathBuf {
        self.root.join(TRANSACTIONS_DIR)
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.transactions_dir().join(TRANSACTIONS_FILE)
    }

    pub fn unreconciled_dir(&self) -> PathBuf {
        self.transactions_dir().join(UNRECONCILED_DIR)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join(REPORTS_DIR)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Creates the balances, reports and pending-transaction directories.
    pub fn ensure_layout(&self) -> io::Result<()> {
        ensure_dir(&self.balances_dir())?;
        ensure_dir(&self.reports_dir())?;
        ensure_dir(&self.unreconciled_dir())
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
