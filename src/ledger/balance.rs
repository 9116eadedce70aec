use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceEntry {
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Balance", alias = "Starting Balance")]
    pub balance: f64,
}

/// One balance per known account, in directory order.
///
/// Values are kept unrounded; use [`Balances::rounded`] for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balances {
    entries: Vec<BalanceEntry>,
}

impl Balances {
    /// Builds balances from `(account, balance)` pairs. A repeated account
    /// keeps its first value.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut balances = Self::default();
        for (account, balance) in pairs {
            balances.insert(account, balance);
        }
        balances
    }

    /// Adds an account. Returns `false` when it is already tracked.
    pub fn insert(&mut self, account: impl Into<String>, balance: f64) -> bool {
        let account = account.into();
        if self.get(&account).is_some() {
            return false;
        }
        self.entries.push(BalanceEntry { account, balance });
        true
    }

    pub fn get(&self, account: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.account == account)
            .map(|entry| entry.balance)
    }

    fn get_mut(&mut self, account: &str) -> Option<&mut f64> {
        self.entries
            .iter_mut()
            .find(|entry| entry.account == account)
            .map(|entry| &mut entry.balance)
    }

    pub fn entries(&self) -> &[BalanceEntry] {
        &self.entries
    }

    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.account.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Debits the sending account and credits the receiving one. Parties
    /// that are not tracked are ignored.
    pub fn apply(&mut self, transaction: &Transaction) {
        if let Some(balance) = self.get_mut(&transaction.from) {
            *balance -= transaction.amount;
        }
        if let Some(balance) = self.get_mut(&transaction.to) {
            *balance += transaction.amount;
        }
    }

    pub fn rounded(&self) -> Vec<BalanceEntry> {
        self.entries
            .iter()
            .map(|entry| BalanceEntry {
                account: entry.account.clone(),
                balance: round_cents(entry.balance),
            })
            .collect()
    }

    /// Sum of the rounded balances.
    pub fn net_worth(&self) -> f64 {
        round_cents(
            self.entries
                .iter()
                .map(|entry| round_cents(entry.balance))
                .sum(),
        )
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Folds transactions into account balances.
pub struct BalanceEngine;

impl BalanceEngine {
    /// Applies `transactions` on top of `current`, leaving `current` untouched.
    pub fn apply_transactions(current: &Balances, transactions: &[Transaction]) -> Balances {
        let mut next = current.clone();
        for transaction in transactions {
            next.apply(transaction);
        }
        next
    }

    /// Replays the full history from the initial balances.
    pub fn recompute(initial: &Balances, history: &[Transaction]) -> Balances {
        Self::apply_transactions(initial, history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn(from: &str, to: &str, amount: f64) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            from,
            to,
            "memo",
            amount,
        )
    }

    #[test]
    fn empty_batch_is_identity() {
        let balances = Balances::from_pairs([("Checking", 100.0), ("Savings", 5.5)]);
        assert_eq!(BalanceEngine::apply_transactions(&balances, &[]), balances);
    }

    #[test]
    fn expense_debits_known_account_only() {
        let balances = Balances::from_pairs([("Checking", 100.0)]);
        let next =
            BalanceEngine::apply_transactions(&balances, &[txn("Checking", "Amazon", 50.0)]);
        assert_eq!(next.get("Checking"), Some(50.0));
        assert_eq!(next.get("Amazon"), None);
        assert_eq!(next.len(), 1);
        assert_eq!(balances.get("Checking"), Some(100.0));
    }

    #[test]
    fn transfer_moves_between_accounts() {
        let balances = Balances::from_pairs([("Checking", 100.0), ("Savings", 0.0)]);
        let next =
            BalanceEngine::apply_transactions(&balances, &[txn("Checking", "Savings", 25.0)]);
        assert_eq!(next.get("Checking"), Some(75.0));
        assert_eq!(next.get("Savings"), Some(25.0));
    }

    #[test]
    fn income_credits_receiving_account() {
        let balances = Balances::from_pairs([("Checking", 0.0)]);
        let next =
            BalanceEngine::apply_transactions(&balances, &[txn("Employer", "Checking", 1200.0)]);
        assert_eq!(next.get("Checking"), Some(1200.0));
    }

    #[test]
    fn recompute_is_idempotent() {
        let initial = Balances::from_pairs([("Checking", 10.0), ("Savings", 1.0)]);
        let history = vec![
            txn("Checking", "Cafe", 3.335),
            txn("Employer", "Checking", 100.0),
            txn("Checking", "Savings", 20.0),
        ];
        let first = BalanceEngine::recompute(&initial, &history);
        let second = BalanceEngine::recompute(&initial, &history);
        assert_eq!(first, second);
    }

    #[test]
    fn rounding_is_display_only() {
        let balances = Balances::from_pairs([("Checking", 0.0)]);
        let mut next = balances;
        for _ in 0..3 {
            next = BalanceEngine::apply_transactions(&next, &[txn("Gift", "Checking", 0.004)]);
        }
        assert!((next.get("Checking").unwrap() - 0.012).abs() < 1e-9);
        assert_eq!(next.rounded()[0].balance, 0.01);
    }

    #[test]
    fn net_worth_sums_rounded_balances() {
        let balances = Balances::from_pairs([("Checking", 10.004), ("Card", -4.5)]);
        assert_eq!(balances.net_worth(), 5.5);
    }

    #[test]
    fn insert_keeps_single_entry_per_account() {
        let mut balances = Balances::from_pairs([("Checking", 1.0)]);
        assert!(!balances.insert("Checking", 9.0));
        assert!(balances.insert("Savings", 2.0));
        assert_eq!(balances.get("Checking"), Some(1.0));
        assert_eq!(balances.accounts().collect::<Vec<_>>(), ["Checking", "Savings"]);
    }
}
