//! Analysis modules.
//!
//! This module runs the fetch loop and aggregates its results.

pub mod aggregator;
pub mod pipeline;

pub use aggregator::*;
pub use pipeline::generate_dataset;
