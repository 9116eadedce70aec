//! Hierarchical income/expense breakdowns.

pub mod engine;
pub mod table;

pub use engine::{Report, ReportEngine, ReportKind, ReportLine, Share};
pub use table::ReportTable;
