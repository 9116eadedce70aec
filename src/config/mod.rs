use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    errors::Result,
    utils::{ensure_dir, PathResolver},
};

const TMP_SUFFIX: &str = "tmp";

/// User-tunable behaviour of the ledger shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Write each report run to `reports/<Kind>_<date>.csv`.
    pub write_report_files: bool,
    /// Print report tables to the terminal.
    pub print_reports: bool,
    pub show_net_worth: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            write_report_files: true,
            print_reports: true,
            show_net_worth: true,
        }
    }
}

impl Config {
    pub const FLAGS: [&'static str; 3] = ["write_report_files", "print_reports", "show_net_worth"];

    pub fn flag(&self, key: &str) -> Option<bool> {
        match key {
            "write_report_files" => Some(self.write_report_files),
            "print_reports" => Some(self.print_reports),
            "show_net_worth" => Some(self.show_net_worth),
            _ => None,
        }
    }

    /// Returns `false` for an unknown key.
    pub fn set_flag(&mut self, key: &str, value: bool) -> bool {
        let slot = match key {
            "write_report_files" => &mut self.write_report_files,
            "print_reports" => &mut self.print_reports,
            "show_net_worth" => &mut self.show_net_worth,
            _ => return false,
        };
        *slot = value;
        true
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(paths: &PathResolver) -> Self {
        Self {
            path: paths.config_file(),
        }
    }

    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
