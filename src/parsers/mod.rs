//! Benchmark parsers.
//!
//! Converts XCCDF 1.1 benchmark XML into a [`Checklist`](crate::model::Checklist)
//! template ready to be saved or merged.
//!
//! ## Usage
//!
//! ```no_run
//! use cklb_sync::parsers::parse_benchmark;
//! use std::path::Path;
//!
//! let template = parse_benchmark(Path::new("U_RHEL_8_STIG_V1R12_Manual-xccdf.xml")).unwrap();
//! println!("{} rules", template.rule_count());
//! ```

mod xccdf;
mod xml_tree;

pub use xccdf::{
    parse_benchmark, parse_benchmark_str, BenchmarkSource, XccdfParser, CCI_SYSTEM, CKLB_VERSION,
    XCCDF_NS,
};
