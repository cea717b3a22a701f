//! Concept list loading.
//!
//! The concept file is the editorial topics export: a JSON document with a
//! `results` array of `{label, linkSuffix}` objects. Extra fields are ignored.
//! Labels are unique keys: a repeated label keeps its first position and
//! takes the last suffix.

use crate::error::{CoverageError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// One editorial concept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConceptEntry {
    /// Display label, used as the `Concept` column.
    pub label: String,
    /// Query-string stub, e.g. `p=<uri>,<uri>` or `i=<uri>`.
    #[serde(rename = "linkSuffix")]
    pub link_suffix: String,
}

#[derive(Debug, Deserialize)]
struct ConceptFile {
    results: Vec<ConceptEntry>,
}

/// Parse a concept document from a string.
pub fn parse_concepts(content: &str, path: &Path) -> Result<Vec<ConceptEntry>> {
    let file: ConceptFile =
        serde_json::from_str(content).map_err(|source| CoverageError::ConceptFileParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(dedup_by_label(file.results))
}

/// Collapse entries sharing a label into one, in first-seen order.
fn dedup_by_label(entries: Vec<ConceptEntry>) -> Vec<ConceptEntry> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut concepts: Vec<ConceptEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        match positions.get(&entry.label) {
            Some(&index) => {
                warn!(
                    "Duplicate concept label '{}'; using its last suffix",
                    entry.label
                );
                concepts[index].link_suffix = entry.link_suffix;
            }
            None => {
                positions.insert(entry.label.clone(), concepts.len());
                concepts.push(entry);
            }
        }
    }

    concepts
}

/// Load the concept list from disk, preserving file order.
pub fn load_concepts(path: &Path) -> Result<Vec<ConceptEntry>> {
    debug!("Reading concept file: {}", path.display());

    let content =
        std::fs::read_to_string(path).map_err(|source| CoverageError::ConceptFileRead {
            path: path.to_path_buf(),
            source,
        })?;

    let concepts = parse_concepts(&content, path)?;
    info!("Loaded {} concepts from {}", concepts.len(), path.display());

    Ok(concepts)
}
