use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

pub const DATE_FIELD: &str = "Date";
pub const FROM_FIELD: &str = "From";
pub const TO_FIELD: &str = "To";
pub const MEMO_FIELD: &str = "Memo";
pub const AMOUNT_FIELD: &str = "Amount";
const CATEGORY_PREFIX: &str = "Category";

/// Category assigned automatically to movements between two known accounts.
pub const TRANSFER_CATEGORY: &str = "Transfer";

pub const STORED_DATE_FORMAT: &str = "%Y-%m-%d";
const ENTRY_DATE_FORMATS: [&str; 2] = ["%m/%d/%y", "%m/%d/%Y"];

/// Field key of the category at `level` (1-based, coarsest first).
pub fn category_field(level: usize) -> String {
    format!("{CATEGORY_PREFIX}{level}")
}

/// Parses the level out of a `CategoryN` column name, ignoring case.
pub fn category_level(field: &str) -> Option<usize> {
    let lower = field.trim().to_ascii_lowercase();
    lower
        .strip_prefix("category")
        .and_then(|digits| digits.parse::<usize>().ok())
        .filter(|level| *level > 0)
}

/// Parses dates typed by a user: `M/D/YY` or `M/D/YYYY`, with `-` and `_`
/// accepted as separators.
pub fn parse_entry_date(input: &str) -> Option<NaiveDate> {
    let normalized = input.trim().replace(['-', '_'], "/");
    ENTRY_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
}

fn parse_stored_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), STORED_DATE_FORMAT)
        .ok()
        .or_else(|| parse_entry_date(input))
}

/// A single movement of money between two parties.
///
/// Stored as a flat field map (`Date`, `From`, `To`, `Memo`, `Amount`,
/// `Category1`..`CategoryN`) both in pending JSON documents and history rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct Transaction {
    pub date: NaiveDate,
    pub from: String,
    pub to: String,
    pub memo: String,
    pub amount: f64,
    /// Category path, coarsest first.
    pub categories: Vec<String>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        from: impl Into<String>,
        to: impl Into<String>,
        memo: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            date,
            from: from.into(),
            to: to.into(),
            memo: memo.into(),
            amount,
            categories: Vec::new(),
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Category at `level` (1-based); `None` once the path is exhausted.
    pub fn category(&self, level: usize) -> Option<&str> {
        level
            .checked_sub(1)
            .and_then(|index| self.categories.get(index))
            .map(String::as_str)
    }

    pub fn to_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert(
            DATE_FIELD.to_string(),
            self.date.format(STORED_DATE_FORMAT).to_string(),
        );
        fields.insert(FROM_FIELD.to_string(), self.from.clone());
        fields.insert(TO_FIELD.to_string(), self.to.clone());
        fields.insert(MEMO_FIELD.to_string(), self.memo.clone());
        fields.insert(AMOUNT_FIELD.to_string(), self.amount.to_string());
        for (index, category) in self.categories.iter().enumerate() {
            fields.insert(category_field(index + 1), category.clone());
        }
        fields
    }

    /// Rebuilds a transaction from its flat field map. Category levels are
    /// read in order and the path stops at the first missing or empty level.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Result<Self> {
        let required = |key: &str| {
            fields
                .get(key)
                .map(|value| value.trim().to_string())
                .ok_or_else(|| LedgerError::InvalidRecord(format!("missing `{key}` field")))
        };

        let raw_date = required(DATE_FIELD)?;
        let date = parse_stored_date(&raw_date)
            .ok_or_else(|| LedgerError::InvalidRecord(format!("bad date `{raw_date}`")))?;
        let raw_amount = required(AMOUNT_FIELD)?;
        let amount = raw_amount
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| LedgerError::InvalidRecord(format!("bad amount `{raw_amount}`")))?;

        let mut levels: Vec<(usize, &String)> = fields
            .iter()
            .filter_map(|(key, value)| category_level(key).map(|level| (level, value)))
            .collect();
        levels.sort_by_key(|(level, _)| *level);

        let mut categories = Vec::new();
        for (level, value) in levels {
            let value = value.trim();
            if level != categories.len() + 1 || value.is_empty() {
                break;
            }
            categories.push(value.to_string());
        }

        Ok(Self {
            date,
            from: required(FROM_FIELD)?,
            to: required(TO_FIELD)?,
            memo: fields.get(MEMO_FIELD).cloned().unwrap_or_default(),
            amount,
            categories,
        })
    }
}

impl TryFrom<BTreeMap<String, String>> for Transaction {
    type Error = LedgerError;

    fn try_from(fields: BTreeMap<String, String>) -> Result<Self> {
        Self::from_fields(&fields)
    }
}

impl From<Transaction> for BTreeMap<String, String> {
    fn from(transaction: Transaction) -> Self {
        transaction.to_fields()
    }
}
