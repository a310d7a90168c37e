//! Flow type-coverage reporting.
//!
//! Starts the Flow server, measures every annotated file one at a time,
//! streams a `<percent>\t<path>` line per file plus a total, and gates the
//! total against a minimum percentage.

pub mod app;
pub mod coverage;
pub mod enumerate;
pub mod error;
pub mod flow;
pub mod process;
pub mod report;

pub use coverage::{compute_coverage, ExpressionCounts, FileCoverage, RunTotals};
pub use error::{CoverageError, CoverageResult, ThresholdNotMet};
pub use report::{Aggregator, Phase, Summary};
