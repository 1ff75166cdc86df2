//! Section and field extraction.
//!
//! Four passes over the source document:
//! scope slicing → section partition → block segmentation → field
//! extraction. Extraction never fails; unusable blocks are dropped as
//! structural skips.

pub mod fields;
pub mod scope;
pub mod sections;

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::models::{Candidate, Category, ParserConfig, Section};
use crate::utils::{hash_content, to_slug};

use fields::{BlockOutcome, ExtractedFields, extract_block};
use scope::slice_for_scope;
use sections::{SectionMarkers, partition_sections};

/// Slug used when a name has no ASCII-representable characters.
const FALLBACK_SLUG: &str = "entry";

/// Result of extracting one document.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Fingerprint of the whole source document
    pub snapshot_hash: String,
    /// Surviving entries: official first, then community, each in document order
    pub candidates: Vec<Candidate>,
    /// Blocks dropped by the structural filter
    pub skipped: usize,
    /// Sections found in scope
    pub section_count: usize,
}

impl Extraction {
    /// Number of candidates in a category.
    pub fn count(&self, category: Category) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.category == category)
            .count()
    }
}

/// Per-run slug de-duplication keyed by category and base slug.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    seen: HashMap<(Category, String), u32>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique slug for `base` within `category`: `base`, `base-2`, `base-3`, ...
    pub fn assign(&mut self, category: Category, base: &str) -> String {
        let count = self.seen.entry((category, base.to_string())).or_insert(0);
        *count += 1;
        if *count == 1 {
            base.to_string()
        } else {
            format!("{base}-{count}")
        }
    }
}

/// Read a document from disk and extract it.
pub fn extract_file(path: impl AsRef<Path>, config: &ParserConfig) -> Result<Extraction> {
    let content = std::fs::read_to_string(path)?;
    Ok(extract_catalog(&content, config))
}

/// Extract catalog candidates from document text.
pub fn extract_catalog(document: &str, config: &ParserConfig) -> Extraction {
    let snapshot_hash = hash_content(document);
    let scope = slice_for_scope(document, &config.start_anchor);
    let sections = partition_sections(scope, &SectionMarkers::from(config));

    let mut slugs = SlugRegistry::new();
    let mut candidates = Vec::new();
    let mut skipped = 0;

    for category in Category::ALL {
        let mut order = 0u32;
        for section in sections.iter().filter(|s| s.category == category) {
            for block in &section.blocks {
                match extract_block(block, &config.repo_hosts) {
                    BlockOutcome::Keep(fields) => {
                        order += 1;
                        candidates.push(assemble(category, order, fields, &mut slugs));
                    }
                    BlockOutcome::Skip(reason) => {
                        skipped += 1;
                        log::debug!(
                            "Skipping {} block ({:?}): {}",
                            category,
                            reason,
                            first_line(block)
                        );
                    }
                }
            }
        }
    }

    log_sections(&sections);

    Extraction {
        snapshot_hash,
        candidates,
        skipped,
        section_count: sections.len(),
    }
}

fn assemble(
    category: Category,
    order_in_section: u32,
    fields: ExtractedFields,
    slugs: &mut SlugRegistry,
) -> Candidate {
    let base = to_slug(&fields.name);
    let base = if base.is_empty() { FALLBACK_SLUG } else { base.as_str() };
    let slug = slugs.assign(category, base);
    let homepage = fields.homepage().unwrap_or_default().to_string();

    let candidate = Candidate {
        category,
        order_in_section,
        name: fields.name,
        slug,
        primary_url: fields.primary_url,
        repo_url: fields.repo_url,
        homepage,
        description: fields.description,
        icons: fields.icons,
        transports: fields.transports,
        language: fields.language,
        raw_md: fields.raw_md,
    };
    log::trace!(
        "{} #{} transports={:?} language={:?}",
        candidate.idempotent_key(),
        candidate.order_in_section,
        candidate.transports,
        candidate.language
    );
    candidate
}

fn log_sections(sections: &[Section]) {
    for section in sections {
        log::debug!(
            "Section {:?} ({}): {} blocks",
            section.title,
            section.category,
            section.blocks.len()
        );
    }
}

fn first_line(block: &str) -> &str {
    block.lines().next().unwrap_or_default()
}
