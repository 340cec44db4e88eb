//! Analysis modules.
//!
//! Extraction of `uses:` references, their categorization, and the
//! aggregation that feeds the reports.

pub mod aggregator;
pub mod categorizer;
pub mod extractor;

pub use aggregator::*;
pub use extractor::extract_references;
