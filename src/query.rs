//! Query fragment construction and PICO classification.

use crate::concepts::ConceptEntry;
use crate::error::{CoverageError, Result};
use crate::models::Category;

/// URL-encoded `||`, the search API's OR operator.
pub const OR_SEPARATOR: &str = "%7C%7C";

/// A concept's query-string fragment and its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptQuery {
    pub fragment: String,
    pub category: Category,
}

/// Build the query fragment for one concept.
///
/// Population suffixes carry a comma-separated value list after the last
/// `=`; it becomes a parenthesised OR group. Intervention and outcome
/// suffixes are passed through unchanged. Anything else is rejected.
pub fn build_query(concept: &ConceptEntry) -> Result<ConceptQuery> {
    let suffix = concept.link_suffix.as_str();

    let category =
        Category::from_suffix(suffix).ok_or_else(|| CoverageError::UnclassifiedConcept {
            label: concept.label.clone(),
            suffix: suffix.to_string(),
        })?;

    let fragment = match category {
        Category::Population => {
            let values = suffix.rsplit('=').next().unwrap_or_default();
            let joined = values.split(',').collect::<Vec<_>>().join(OR_SEPARATOR);
            format!("p=({})", joined)
        }
        Category::Intervention | Category::Outcome => suffix.to_string(),
    };

    Ok(ConceptQuery { fragment, category })
}

/// Build queries for every concept, failing on the first unclassifiable one.
pub fn build_queries(concepts: &[ConceptEntry]) -> Result<Vec<ConceptQuery>> {
    concepts.iter().map(build_query).collect()
}
