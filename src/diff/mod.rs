//! Checklist diff engine.
//!
//! Compares two checklists by rule comparison key and reports rules found
//! on only one side plus rules whose finding differs. Comments and finding
//! details are not compared.
//!
//! # Example
//!
//! ```ignore
//! use cklb_sync::diff::DiffEngine;
//!
//! let report = DiffEngine::new().diff(&before, &after);
//! for entry in &report.only_in_b {
//!     println!("+ {} {}", entry.key, entry.title);
//! }
//! ```

mod engine;
mod result;

pub use engine::DiffEngine;
pub use result::{DiffReport, DiffSummary, RuleEntry, StatusDiff, StigMismatch};
