//! Coverage aggregation and statistics.
//!
//! This module partitions a finished coverage table into the dashboard's
//! per-category views and computes summary totals.

use crate::models::{Category, CategoryTotals, CoverageSummary, CoverageTable, CoverageViews};

/// Split the table into the overall view and one view per category.
pub fn partition(table: &CoverageTable) -> CoverageViews {
    CoverageViews {
        all: table.rows().to_vec(),
        population: table.filter(Category::Population),
        intervention: table.filter(Category::Intervention),
        outcome: table.filter(Category::Outcome),
    }
}

/// Compute overall and per-category totals.
pub fn summarize(table: &CoverageTable) -> CoverageSummary {
    let by_category = Category::ALL
        .iter()
        .map(|&category| {
            let rows = table.rows().iter().filter(|r| r.category == category);
            CategoryTotals {
                category,
                concepts: rows.clone().count(),
                coverage: rows.map(|r| r.coverage).sum(),
            }
        })
        .collect();

    CoverageSummary {
        concepts: table.len(),
        total_coverage: table.rows().iter().map(|r| r.coverage).sum(),
        by_category,
    }
}
