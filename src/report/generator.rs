//! Markdown and JSON report generation.
//!
//! This module generates coverage reports from a finished coverage table.

use crate::analysis::partition;
use crate::models::{Category, CoverageReport, CoverageRow, CoverageSummary, ReportMetadata};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &CoverageReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# PICO Coverage Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary));

    // Overall table, then one section per category
    output.push_str("## Overall\n\n");
    output.push_str(&generate_rows_table(report.rows.rows(), true));

    let views = partition(&report.rows);
    for category in Category::ALL {
        let rows = views.for_category(category);
        output.push_str(&format!("## {}\n\n", category));
        if rows.is_empty() {
            output.push_str(&format!(
                "No {} concepts in this run.\n\n",
                category.to_string().to_lowercase()
            ));
        } else {
            output.push_str(&generate_rows_table(rows, false));
        }
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Endpoint:** {}\n", metadata.endpoint));
    section.push_str(&format!("- **Concept File:** `{}`\n", metadata.concept_file));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Fetch Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &CoverageSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Type | Concepts | Coverage |\n");
    section.push_str("|:---|:---:|---:|\n");

    for totals in &summary.by_category {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            totals.category, totals.concepts, totals.coverage
        ));
    }
    section.push_str(&format!(
        "| **Total** | **{}** | **{}** |\n\n",
        summary.concepts, summary.total_coverage
    ));

    section
}

/// Generate a Concept/Coverage table, optionally with the Type column.
fn generate_rows_table(rows: &[CoverageRow], with_type: bool) -> String {
    let mut table = String::new();

    if with_type {
        table.push_str("| Concept | Coverage | Type |\n|:---|---:|:---|\n");
    } else {
        table.push_str("| Concept | Coverage |\n|:---|---:|\n");
    }

    for row in rows {
        let concept = row.concept.replace('|', "\\|");
        if with_type {
            table.push_str(&format!("| {} | {} | {} |\n", concept, row.coverage, row.category));
        } else {
            table.push_str(&format!("| {} | {} |\n", concept, row.coverage));
        }
    }
    table.push('\n');

    table
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by pico-coverage*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &CoverageReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summarize;
    use crate::models::CoverageTable;
    use chrono::Utc;

    fn create_test_report() -> CoverageReport {
        let rows = CoverageTable::from(vec![
            CoverageRow {
                concept: "Adults".to_string(),
                coverage: 120,
                category: Category::Population,
            },
            CoverageRow {
                concept: "Mortality".to_string(),
                coverage: 55,
                category: Category::Outcome,
            },
        ]);

        CoverageReport {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                endpoint: "https://data.cochrane.org/pico-search".to_string(),
                concept_file: "editorial-topics.json".to_string(),
                duration_seconds: 1.5,
            },
            summary: summarize(&rows),
            rows,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report());

        assert!(markdown.contains("# PICO Coverage Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("| Adults | 120 | Population |"));
        assert!(markdown.contains("| Mortality | 55 |"));
        assert!(markdown.contains("No intervention concepts in this run."));
        assert!(markdown.contains("| **Total** | **2** | **175** |"));
    }

    #[test]
    fn test_generate_metadata_section() {
        let report = create_test_report();
        let section = generate_metadata_section(&report.metadata);

        assert!(section.contains("https://data.cochrane.org/pico-search"));
        assert!(section.contains("`editorial-topics.json`"));
        assert!(section.contains("1.5s"));
    }

    #[test]
    fn test_rows_table_escapes_pipes() {
        let rows = vec![CoverageRow {
            concept: "A|B".to_string(),
            coverage: 3,
            category: Category::Intervention,
        }];
        let table = generate_rows_table(&rows, false);
        assert!(table.contains("| A\\|B | 3 |"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"Concept\": \"Adults\""));
        assert!(json.contains("\"Type\": \"Outcome\""));
    }
}
