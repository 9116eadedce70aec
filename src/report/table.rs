use chrono::NaiveDate;

use super::engine::{Report, ReportKind};

pub const CATEGORY_HEADER: &str = "Category";

/// A report laid out as `Category, %1..%K`, every row padded to full width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub kind: ReportKind,
    pub date: NaiveDate,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn from_report(report: &Report, date: NaiveDate) -> Self {
        let depth = report.depth();
        let mut headers = vec![CATEGORY_HEADER.to_string()];
        headers.extend((1..=depth).map(|level| format!("%{level}")));

        let rows = report
            .lines
            .iter()
            .map(|line| {
                let mut row = Vec::with_capacity(depth + 1);
                row.push(line.label());
                row.extend(line.shares().iter().map(ToString::to_string));
                row.resize(depth + 1, String::new());
                row
            })
            .collect();

        Self {
            kind: report.kind,
            date,
            headers,
            rows,
        }
    }

    /// `<Kind>_<YYYYMMDD>`
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.kind, self.date.format("%Y%m%d"))
    }

    /// Plain-text rendering with columns sized to their widest cell.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = render_row(&self.headers, &widths);
        out.push('\n');
        out.push_str(&horizontal_rule(&widths));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&render_row(row, &widths));
        }
        out
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .fold(header.chars().count(), usize::max)
            })
            .collect()
    }
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn horizontal_rule(widths: &[usize]) -> String {
    let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    "-".repeat(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AccountDirectory, Transaction};
    use crate::report::ReportEngine;

    fn table() -> ReportTable {
        let date = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        let rows = vec![
            Transaction::new(date, "Checking", "Store", "", 30.0).with_categories(["Food"]),
            Transaction::new(date, "Checking", "Store2", "", 10.0)
                .with_categories(["Food", "Snacks"]),
        ];
        let accounts = AccountDirectory::new(["Checking"]);
        let report = ReportEngine::new(&accounts).run(&rows, ReportKind::Expense);
        ReportTable::from_report(&report, date)
    }

    #[test]
    fn rows_are_padded_to_deepest_chain() {
        let table = table();
        assert_eq!(table.headers, ["Category", "%1", "%2", "%3"]);
        assert!(table.rows.iter().all(|row| row.len() == 4));
        assert_eq!(table.rows[0], ["Expense: $40.00", "", "", ""]);
        assert_eq!(table.rows[1], ["Food", "100.0% of Expense", "", ""]);
        assert_eq!(table.file_stem(), "Expense_20240509");
    }

    #[test]
    fn render_aligns_columns() {
        let rendered = table().render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].starts_with("Category"));
        assert!(lines[1].chars().all(|c| c == '-'));
        let snacks = lines.iter().find(|line| line.starts_with("Snacks")).unwrap();
        let offset = lines[0].find("%1").unwrap();
        assert_eq!(snacks.find("25.0% of Food"), Some(offset));
    }
}
