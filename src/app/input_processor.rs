//! Turns the positional INPUT into an ordered list of document ids.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Reads document ids from `input`.
///
/// When `input` names an existing file, every non-blank line (trimmed) is a
/// document id, in file order. Otherwise `input` itself is the single id.
pub(crate) fn load_document_ids(input: &str) -> Result<Vec<String>> {
    let path = Path::new(input);
    if path.is_file() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read id list '{}'", path.display()))?;
        let ids = parse_id_list(&raw);
        if ids.is_empty() {
            bail!("Id list '{}' contains no document ids", path.display());
        }
        debug!(path = %path.display(), count = ids.len(), "loaded document id list");
        return Ok(ids);
    }

    let id = input.trim();
    if id.is_empty() {
        bail!("Document id must not be empty");
    }
    Ok(vec![id.to_string()])
}

fn parse_id_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
