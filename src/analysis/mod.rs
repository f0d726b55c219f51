//! Analysis modules.
//!
//! Aggregation of application records into metrics.

pub mod aggregator;

pub use aggregator::*;
