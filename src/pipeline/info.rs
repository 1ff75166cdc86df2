// src/pipeline/info.rs

//! Inspection of a source document and its last emitted catalog.

use std::path::Path;

use crate::error::Result;
use crate::models::Category;
use crate::schema::validate_line;
use crate::storage::non_blank_lines;
use crate::utils::hash_content;

/// What `run_info` found on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunInfo {
    /// Fingerprint of the source document, if readable
    pub snapshot_hash: Option<String>,
    /// Records per category in the output file, if present
    pub counts: Option<Vec<(Category, usize)>>,
    /// Output lines that are not valid records
    pub invalid: usize,
}

/// Report the current source fingerprint and emitted record counts.
pub fn run_info(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<RunInfo> {
    let input = input.as_ref();
    let output = output.as_ref();
    let mut info = RunInfo::default();

    match std::fs::read_to_string(input) {
        Ok(content) => {
            let hash = hash_content(&content);
            log::info!("Source {}: {}", input.display(), hash);
            info.snapshot_hash = Some(hash);
        }
        Err(e) => log::info!("Source {} not readable: {}", input.display(), e),
    }

    if !output.exists() {
        log::info!("No catalog output at {} yet.", output.display());
        return Ok(info);
    }

    let content = std::fs::read_to_string(output)?;
    let mut counts: Vec<(Category, usize)> = Category::ALL.iter().map(|c| (*c, 0)).collect();
    for (_, line) in non_blank_lines(&content) {
        match validate_line(line) {
            Ok(record) => {
                if let Some(entry) = counts.iter_mut().find(|(c, _)| *c == record.category) {
                    entry.1 += 1;
                }
            }
            Err(_) => info.invalid += 1,
        }
    }

    log::info!("Catalog {}:", output.display());
    for (category, count) in &counts {
        log::info!("    {category}: {count}");
    }
    if info.invalid > 0 {
        log::warn!("    {} invalid lines", info.invalid);
    }
    info.counts = Some(counts);
    Ok(info)
}
