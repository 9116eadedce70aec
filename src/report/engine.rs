use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use crate::ledger::{AccountDirectory, Transaction};

/// Which side of the ledger a report breaks down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Money arriving in a known account from an external party.
    Income,
    /// Money leaving a known account for an external party.
    Expense,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Income, ReportKind::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Income => "Income",
            ReportKind::Expense => "Expense",
        }
    }

    /// Transfers between known accounts and movements between two external
    /// parties belong to neither kind.
    pub fn includes(&self, transaction: &Transaction, accounts: &AccountDirectory) -> bool {
        let from_known = accounts.contains(&transaction.from);
        let to_known = accounts.contains(&transaction.to);
        match self {
            ReportKind::Income => to_known && !from_known,
            ReportKind::Expense => from_known && !to_known,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A child's portion of one ancestor's total.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub percent: f64,
    pub ancestor: String,
}

impl Share {
    fn of(amount: f64, ancestor: &Ancestor) -> Self {
        let percent = if ancestor.amount == 0.0 {
            0.0
        } else {
            round_percent(100.0 * amount / ancestor.amount)
        };
        Self {
            percent,
            ancestor: ancestor.name.clone(),
        }
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.percent.fract() == 0.0 {
            write!(f, "{:.1}% of {}", self.percent, self.ancestor)
        } else {
            write!(f, "{}% of {}", self.percent, self.ancestor)
        }
    }
}

fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportLine {
    /// `"<path>: $<amount>"` for one node of the category tree.
    Total { path: String, amount: f64 },
    /// A child category's share of every ancestor, nearest first.
    Category { name: String, shares: Vec<Share> },
    /// Uncategorized remainder attributed to one counterparty.
    Counterparty {
        name: String,
        amount: f64,
        shares: Vec<Share>,
    },
}

impl ReportLine {
    pub fn label(&self) -> String {
        match self {
            ReportLine::Total { path, amount } => format!("{path}: ${amount:.2}"),
            ReportLine::Category { name, .. } => name.clone(),
            ReportLine::Counterparty { name, amount, .. } => format!("{name} ${amount:.2}"),
        }
    }

    pub fn shares(&self) -> &[Share] {
        match self {
            ReportLine::Total { .. } => &[],
            ReportLine::Category { shares, .. } | ReportLine::Counterparty { shares, .. } => {
                shares
            }
        }
    }
}

/// The ordered lines of one report run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub kind: ReportKind,
    pub lines: Vec<ReportLine>,
}

impl Report {
    /// Number of percentage columns needed by the longest ancestor chain.
    pub fn depth(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.shares().len())
            .max()
            .unwrap_or(0)
    }

    pub fn line(&self, label: &str) -> Option<&ReportLine> {
        self.lines.iter().find(|line| match line {
            ReportLine::Total { path, .. } => path == label,
            ReportLine::Category { name, .. } | ReportLine::Counterparty { name, .. } => {
                name == label
            }
        })
    }
}

#[derive(Debug, Clone)]
struct Ancestor {
    name: String,
    amount: f64,
}

#[derive(Debug, Clone)]
struct Node {
    path: String,
    /// Category values from level 1 down to this node.
    categories: Vec<String>,
    /// Totals from the report root down to this node's parent.
    ancestors: Vec<Ancestor>,
    name: String,
}

/// Breadth-first rollup of transactions into a category tree.
pub struct ReportEngine<'a> {
    accounts: &'a AccountDirectory,
}

impl<'a> ReportEngine<'a> {
    pub fn new(accounts: &'a AccountDirectory) -> Self {
        Self { accounts }
    }

    pub fn run(&self, transactions: &[Transaction], kind: ReportKind) -> Report {
        let rows: Vec<&Transaction> = transactions
            .iter()
            .filter(|txn| kind.includes(txn, self.accounts))
            .collect();
        debug!(kind = %kind, rows = rows.len(), "running report");

        let mut lines = Vec::new();
        let mut worklist = VecDeque::from([Node {
            path: kind.as_str().to_string(),
            categories: Vec::new(),
            ancestors: Vec::new(),
            name: kind.as_str().to_string(),
        }]);

        while let Some(node) = worklist.pop_front() {
            let subset: Vec<&Transaction> = rows
                .iter()
                .copied()
                .filter(|txn| matches_chain(txn, &node.categories))
                .collect();
            let amount: f64 = subset.iter().map(|txn| txn.amount).sum();
            lines.push(ReportLine::Total {
                path: node.path.clone(),
                amount,
            });

            let mut chain = vec![Ancestor {
                name: node.name.clone(),
                amount,
            }];
            chain.extend(node.ancestors.iter().rev().cloned());

            let level = node.categories.len() + 1;
            for (child, child_amount) in group_by(&subset, |txn| txn.category(level)) {
                lines.push(ReportLine::Category {
                    name: child.to_string(),
                    shares: shares_of(child_amount, &chain),
                });

                let mut categories = node.categories.clone();
                categories.push(child.to_string());
                let mut ancestors = node.ancestors.clone();
                ancestors.push(chain[0].clone());
                worklist.push_back(Node {
                    path: format!("{} | {}", node.path, child),
                    categories,
                    ancestors,
                    name: child.to_string(),
                });
            }

            let leftover: Vec<&Transaction> = subset
                .iter()
                .copied()
                .filter(|txn| txn.category(level).is_none())
                .collect();
            for (counterparty, party_amount) in group_by(&leftover, |txn| Some(txn.to.as_str())) {
                lines.push(ReportLine::Counterparty {
                    name: counterparty.to_string(),
                    amount: party_amount,
                    shares: shares_of(party_amount, &chain),
                });
            }
        }

        Report { kind, lines }
    }
}

fn matches_chain(transaction: &Transaction, categories: &[String]) -> bool {
    categories
        .iter()
        .enumerate()
        .rev()
        .all(|(index, wanted)| transaction.category(index + 1) == Some(wanted.as_str()))
}

/// Sums amounts per distinct non-empty key, in first-seen order.
fn group_by<'t>(
    rows: &[&'t Transaction],
    key: impl Fn(&'t Transaction) -> Option<&'t str>,
) -> Vec<(&'t str, f64)> {
    let mut groups: Vec<(&str, f64)> = Vec::new();
    for row in rows {
        let Some(value) = key(*row).filter(|value| !value.is_empty()) else {
            continue;
        };
        match groups.iter_mut().find(|(name, _)| *name == value) {
            Some((_, total)) => *total += row.amount,
            None => groups.push((value, row.amount)),
        }
    }
    groups
}

fn shares_of(amount: f64, chain: &[Ancestor]) -> Vec<Share> {
    chain
        .iter()
        .map(|ancestor| Share::of(amount, ancestor))
        .collect()
}
