//! Data models for the coverage dashboard.
//!
//! This module contains the core data structures shared by the fetcher,
//! the aggregator and the renderers: PICO categories, coverage rows and
//! the coverage table built on every run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// PICO category of a concept.
///
/// Comparator concepts are not tracked by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Population,
    Intervention,
    Outcome,
}

impl Category {
    /// All categories, in dashboard tab order.
    pub const ALL: [Category; 3] = [
        Category::Population,
        Category::Intervention,
        Category::Outcome,
    ];

    /// Classify a link suffix by its leading character.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.chars().next()? {
            'p' => Some(Category::Population),
            'i' => Some(Category::Intervention),
            'o' => Some(Category::Outcome),
            _ => None,
        }
    }

    /// Bar colour used for this category in the dashboard.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Population => "#636efa",
            Category::Intervention => "#EF553B",
            Category::Outcome => "#00cc96",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Population => write!(f, "Population"),
            Category::Intervention => write!(f, "Intervention"),
            Category::Outcome => write!(f, "Outcome"),
        }
    }
}

/// One row of the coverage table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRow {
    /// Concept label, as listed in the concept file.
    #[serde(rename = "Concept")]
    pub concept: String,
    /// Number of matching results reported by the search API.
    #[serde(rename = "Coverage")]
    pub coverage: u64,
    /// PICO category derived from the concept's link suffix.
    #[serde(rename = "Type")]
    pub category: Category,
}

/// Ordered coverage table, one row per concept in concept-file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageTable {
    rows: Vec<CoverageRow>,
}

impl CoverageTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Append a row; rows keep insertion order.
    pub fn push(&mut self, row: CoverageRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[CoverageRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of a single category, in table order.
    pub fn filter(&self, category: Category) -> Vec<CoverageRow> {
        self.rows
            .iter()
            .filter(|row| row.category == category)
            .cloned()
            .collect()
    }
}

impl From<Vec<CoverageRow>> for CoverageTable {
    fn from(rows: Vec<CoverageRow>) -> Self {
        Self { rows }
    }
}

/// The four views rendered by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageViews {
    pub all: Vec<CoverageRow>,
    pub population: Vec<CoverageRow>,
    pub intervention: Vec<CoverageRow>,
    pub outcome: Vec<CoverageRow>,
}

impl CoverageViews {
    /// Rows of the view for a category.
    pub fn for_category(&self, category: Category) -> &[CoverageRow] {
        match category {
            Category::Population => &self.population,
            Category::Intervention => &self.intervention,
            Category::Outcome => &self.outcome,
        }
    }
}

/// Totals for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub category: Category,
    pub concepts: usize,
    pub coverage: u64,
}

/// Summary statistics of a coverage table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Number of concepts in the table.
    pub concepts: usize,
    /// Sum of coverage over all concepts.
    pub total_coverage: u64,
    /// Per-category totals, in tab order.
    pub by_category: Vec<CategoryTotals>,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// When the table was fetched.
    pub generated_at: DateTime<Utc>,
    /// Search endpoint queried.
    pub endpoint: String,
    /// Concept file the run was driven from.
    pub concept_file: String,
    /// Wall-clock duration of the fetch loop in seconds.
    pub duration_seconds: f64,
}

/// A complete coverage report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub metadata: ReportMetadata,
    pub summary: CoverageSummary,
    pub rows: CoverageTable,
}
