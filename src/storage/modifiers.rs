//! Modifier term loading
//!
//! The modifier file holds one term per line. Only the first comma-separated
//! column is used; blank terms are ignored.

use crate::storage::csv::parse_records;
use std::io;
use std::path::Path;

/// Loads the ordered modifier list from `path`
///
/// A missing file is not an error: the campaign then runs the seed query
/// alone.
pub fn load_modifiers(path: &Path) -> io::Result<Vec<String>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(
                "{} not found. No modifier terms will be used.",
                path.display()
            );
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let terms = parse_modifiers(&content);
    if terms.is_empty() {
        tracing::warn!("{} is empty. No modifier terms loaded.", path.display());
    } else {
        tracing::info!(
            "Loaded {} modifier terms from {}",
            terms.len(),
            path.display()
        );
    }

    Ok(terms)
}

/// Extracts the modifier terms from file content
pub fn parse_modifiers(content: &str) -> Vec<String> {
    parse_records(content)
        .into_iter()
        .filter_map(|record| record.into_iter().next())
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty())
        .collect()
}
