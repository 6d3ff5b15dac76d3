//! **A library for keeping DISA STIG checklists in step with new benchmark releases.**
//!
//! `cklb-sync` converts XCCDF 1.1 benchmarks into CKLB checklists, carries a
//! reviewer's findings from an old checklist into the blank checklist of a
//! newer release, and compares two checklists rule by rule. It powers both a
//! command-line interface and a Rust library for programmatic integration.
//!
//! ## Key Features
//!
//! - **Benchmark Import**: Reads XCCDF 1.1 `Benchmark` documents, including the
//!   escaped description markup DISA embeds, and emits a CKLB checklist.
//! - **Finding Migration**: Copies status, comments, finding details and
//!   overrides onto matching rules of a new template. Rules new in the
//!   template keep their defaults and are reported for review.
//! - **Stable Rule Identity**: Rules are matched on a comparison key that
//!   ignores the revision suffix (`SV-230221r858734_rule` → `SV-230221`).
//! - **Checklist Diff**: Lists rules on one side only and rules whose finding
//!   changed, as a terminal summary or JSON.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: The [`Checklist`] document and its [`Rule`] records.
//!   Unknown keys are preserved so documents survive a load/save cycle.
//! - **[`parsers`]**: The XCCDF benchmark parser.
//! - **[`store`]**: Loads checklists with shape validation and saves them atomically.
//! - **[`identity`]**: Comparison keys and the [`RuleIndex`] lookup table.
//! - **[`merge`]**: The [`MergeEngine`] and its STIG identity gate.
//! - **[`naming`]**: Collision-free output names derived from the host identity.
//! - **[`diff`]**: The [`DiffEngine`].
//! - **[`pipeline`]**: Load → merge/diff → write workflows shared by the CLI.
//! - **[`reports`]**: Summary and JSON report generators.
//!
//! ## Getting Started: Merging a Checklist
//!
//! ```no_run
//! use std::path::Path;
//! use cklb_sync::{merge, store, MergeOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let old = store::load(Path::new("web01_RHEL_8_V1R11.cklb"))?;
//!     let template = store::load(Path::new("RHEL_8_V1R12.cklb"))?;
//!
//!     let outcome = merge(&old, &template, MergeOptions::default())?;
//!     println!(
//!         "{} findings carried forward, {} new rules to review",
//!         outcome.updated,
//!         outcome.added_rules.len()
//!     );
//!
//!     store::save(&outcome.merged, Path::new("web01_RHEL_8_V1R12.cklb"))?;
//!     Ok(())
//! }
//! ```
//!
//! ### Diffing Two Checklists
//!
//! ```no_run
//! use std::path::Path;
//! use cklb_sync::{store, DiffEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let a = store::load(Path::new("before.cklb"))?;
//!     let b = store::load(Path::new("after.cklb"))?;
//!
//!     let report = DiffEngine::new().diff(&a, &b);
//!     for change in &report.status_diffs {
//!         println!("{}: {:?} -> {:?}", change.key, change.a, change.b);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Importing a Benchmark
//!
//! ```no_run
//! use std::path::Path;
//! use cklb_sync::{parse_benchmark, store};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checklist = parse_benchmark(Path::new("U_RHEL_8_STIG_V1R12_Manual-xccdf.xml"))?;
//!     println!("{} rules", checklist.rule_count());
//!     store::save(&checklist, Path::new("RHEL_8_V1R12.cklb"))?;
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::struct_excessive_bools,
    clippy::module_name_repetitions,
    // Variable names like `a`/`b` or `old`/`new` are clear in context
    clippy::similar_names
)]

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod identity;
pub mod merge;
pub mod model;
pub mod naming;
pub mod parsers;
pub mod pipeline;
pub mod reports;
pub mod store;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, OutputConfig, Validatable};
pub use config::{BatchMergeConfig, DiffConfig, MergeConfig, ParseConfig, ValidateConfig};
pub use diff::{DiffEngine, DiffReport};
pub use error::{CklbError, ErrorContext, Result};
pub use identity::{resolve_key, RuleIndex};
pub use merge::{merge, MergeEngine, MergeOptions, MergeOutcome};
pub use model::{Checklist, Rule, RuleStatus, StigDefinition, TargetData};
pub use naming::{HostIdentity, OutputNamer};
pub use parsers::{parse_benchmark, parse_benchmark_str, XccdfParser};
pub use reports::{ReportFormat, ReportGenerator};
