use std::cmp::Ordering;
use std::fmt;

use strsim::levenshtein;

use super::transaction::{
    category_field, category_level, Transaction, AMOUNT_FIELD, DATE_FIELD, FROM_FIELD,
    MEMO_FIELD, STORED_DATE_FORMAT, TO_FIELD,
};
use crate::errors::{LedgerError, Result};

/// A searchable column of the transaction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    From,
    To,
    Memo,
    Amount,
    Category(usize),
}

impl Column {
    pub fn parse(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        let column = match trimmed.to_ascii_lowercase().as_str() {
            "date" => Column::Date,
            "from" => Column::From,
            "to" => Column::To,
            "memo" => Column::Memo,
            "amount" => Column::Amount,
            _ => category_level(trimmed)
                .map(Column::Category)
                .ok_or_else(|| LedgerError::UnknownColumn(trimmed.to_string()))?,
        };
        Ok(column)
    }

    fn value_of(&self, transaction: &Transaction) -> String {
        match self {
            Column::Date => transaction.date.format(STORED_DATE_FORMAT).to_string(),
            Column::From => transaction.from.clone(),
            Column::To => transaction.to.clone(),
            Column::Memo => transaction.memo.clone(),
            Column::Amount => transaction.amount.to_string(),
            Column::Category(level) => transaction.category(*level).unwrap_or("").to_string(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Date => f.write_str(DATE_FIELD),
            Column::From => f.write_str(FROM_FIELD),
            Column::To => f.write_str(TO_FIELD),
            Column::Memo => f.write_str(MEMO_FIELD),
            Column::Amount => f.write_str(AMOUNT_FIELD),
            Column::Category(level) => f.write_str(&category_field(*level)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub index: usize,
    pub distance: usize,
}

/// The permanent, merged transaction table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    rows: Vec<Transaction>,
}

impl History {
    pub fn new(rows: Vec<Transaction>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends pending records and re-sorts newest first.
    pub fn merge(&mut self, pending: impl IntoIterator<Item = Transaction>) {
        self.rows.extend(pending);
        self.rows.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.from.cmp(&a.from))
                .then_with(|| b.to.cmp(&a.to))
                .then_with(|| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal))
        });
    }

    pub fn remove(&mut self, index: usize) -> Option<Transaction> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    /// Deepest category level present on any row.
    pub fn max_depth(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.categories.len())
            .max()
            .unwrap_or(0)
    }

    pub fn from_names(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|row| row.from.as_str()))
    }

    pub fn to_names(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|row| row.to.as_str()))
    }

    /// Every category label used at any level.
    pub fn category_names(&self) -> Vec<String> {
        distinct(
            self.rows
                .iter()
                .flat_map(|row| row.categories.iter().map(String::as_str)),
        )
    }

    /// Rows whose `column` value lies within `max(len - 2, len / 2)` edits of
    /// `key` (strictly), closest first. Amounts only match numerically.
    pub fn search(&self, column: Column, key: &str) -> Vec<SearchHit> {
        let key = key.trim();
        let mut hits: Vec<SearchHit> = match column {
            Column::Amount => {
                let Ok(wanted) = key.parse::<f64>() else {
                    return Vec::new();
                };
                self.rows
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| (row.amount - wanted).abs() < 1e-9)
                    .map(|(index, _)| SearchHit { index, distance: 0 })
                    .collect()
            }
            _ => {
                let length = key.chars().count() as f64;
                let threshold = (length - 2.0).max(length / 2.0);
                self.rows
                    .iter()
                    .enumerate()
                    .map(|(index, row)| SearchHit {
                        index,
                        distance: levenshtein(&column.value_of(row), key),
                    })
                    .filter(|hit| (hit.distance as f64) < threshold)
                    .collect()
            }
        };
        hits.sort_by_key(|hit| hit.distance);
        hits
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.iter().any(|known| known == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn(day: u32, from: &str, to: &str, amount: f64) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            from,
            to,
            "memo",
            amount,
        )
    }

    #[test]
    fn merge_sorts_newest_first() {
        let mut history = History::new(vec![txn(1, "Checking", "Cafe", 3.0)]);
        history.merge(vec![
            txn(3, "Checking", "Grocer", 20.0),
            txn(2, "Checking", "Cafe", 4.0),
            txn(3, "Checking", "Grocer", 25.0),
        ]);
        let amounts: Vec<f64> = history.rows().iter().map(|row| row.amount).collect();
        assert_eq!(amounts, vec![25.0, 20.0, 4.0, 3.0]);
    }

    #[test]
    fn names_are_distinct_in_first_seen_order() {
        let history = History::new(vec![
            txn(1, "Checking", "Cafe", 1.0).with_categories(["Food", "Coffee"]),
            txn(2, "Employer", "Checking", 1.0).with_categories(["Salary"]),
            txn(3, "Checking", "Cafe", 1.0).with_categories(["Food"]),
        ]);
        assert_eq!(history.from_names(), ["Checking", "Employer"]);
        assert_eq!(history.to_names(), ["Cafe", "Checking"]);
        assert_eq!(history.category_names(), ["Food", "Coffee", "Salary"]);
        assert_eq!(history.max_depth(), 2);
    }

    #[test]
    fn search_ranks_by_edit_distance() {
        let history = History::new(vec![
            txn(1, "Checking", "Walmart", 10.0),
            txn(2, "Checking", "Walmrt", 11.0),
            txn(3, "Checking", "Gas", 12.0),
        ]);
        let hits = history.search(Column::parse("to").unwrap(), "Walmart");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].index, 0);
        assert_eq!(hits[0].distance, 0);
        assert_eq!(hits[1].index, 1);
    }

    #[test]
    fn amount_search_matches_numerically() {
        let history = History::new(vec![txn(1, "Checking", "A", 10.0), txn(2, "Checking", "B", 12.5)]);
        let hits = history.search(Column::Amount, "12.50");
        assert_eq!(hits, vec![SearchHit { index: 1, distance: 0 }]);
        assert!(history.search(Column::Amount, "twelve").is_empty());
    }

    #[test]
    fn unknown_column_is_an_error() {
        assert!(matches!(
            Column::parse("payee"),
            Err(LedgerError::UnknownColumn(_))
        ));
        assert_eq!(Column::parse("CATEGORY2").unwrap(), Column::Category(2));
        assert_eq!(Column::Category(2).to_string(), "Category2");
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut history = History::new(vec![txn(1, "Checking", "A", 1.0)]);
        assert!(history.remove(3).is_none());
        assert!(history.remove(0).is_some());
        assert!(history.is_empty());
    }
}
