//! The fetch loop: concepts in, coverage table out.

use crate::concepts::ConceptEntry;
use crate::error::Result;
use crate::fetcher::CoverageClient;
use crate::models::{CoverageRow, CoverageTable};
use crate::query::build_queries;
use indicatif::ProgressBar;
use tracing::info;

/// Fetch the coverage of every concept, one request at a time.
///
/// All concepts are classified before the first request so a bad suffix
/// aborts the run without touching the network. Any failure aborts the
/// whole table; there are no partial results.
pub async fn generate_dataset(
    client: &CoverageClient,
    concepts: &[ConceptEntry],
    progress: &ProgressBar,
) -> Result<CoverageTable> {
    let queries = build_queries(concepts)?;
    let mut table = CoverageTable::with_capacity(concepts.len());

    for (concept, query) in concepts.iter().zip(queries) {
        progress.set_message(concept.label.clone());

        let coverage = client
            .fetch_coverage(&concept.label, &query.fragment)
            .await?;
        info!(
            "{} ({}): {} results",
            concept.label, query.category, coverage
        );

        table.push(CoverageRow {
            concept: concept.label.clone(),
            coverage,
            category: query.category,
        });
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(table)
}
