// src/pipeline/icons.rs

//! JSONL → icon directory pipeline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{CatalogRecord, FetcherConfig};
use crate::schema::validate_line;
use crate::services::{AssetFetcher, IconFetcher, IconOutcome};
use crate::storage::{AssetStore, non_blank_lines};
use crate::utils::report;

/// Settings for one icon run.
#[derive(Debug, Clone)]
pub struct IconOptions {
    /// Stop after this many processed (saved or skipped) records; 0 is no limit
    pub limit: Option<usize>,
    pub overwrite: bool,
    /// Downloads in flight; 1 is sequential
    pub concurrency: usize,
    pub request_delay_ms: u64,
    pub split_by_category: bool,
}

impl Default for IconOptions {
    fn default() -> Self {
        Self::from(&FetcherConfig::default())
    }
}

impl From<&FetcherConfig> for IconOptions {
    fn from(config: &FetcherConfig) -> Self {
        Self {
            limit: None,
            overwrite: false,
            concurrency: config.concurrency,
            request_delay_ms: config.request_delay_ms,
            split_by_category: config.split_by_category,
        }
    }
}

/// Counters for one icon run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub without_icon: usize,
    /// Lines that did not pass validation
    pub invalid: usize,
}

impl FetchReport {
    /// Records that count toward the limit.
    pub fn processed(&self) -> usize {
        self.saved + self.skipped
    }
}

/// Download the first icon of every record in `input` into `out_dir`.
///
/// An unreadable input file is fatal; every per-record problem is logged,
/// counted and skipped.
pub async fn run_fetch_icons<F: AssetFetcher>(
    input: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    options: &IconOptions,
    fetcher: F,
) -> Result<FetchReport> {
    let input = input.as_ref();
    let out_dir = out_dir.as_ref();
    report::header("Icon fetch");

    report::step(1, 2, &format!("Reading {}", input.display()));
    let content = tokio::fs::read_to_string(input).await?;
    let mut stats = FetchReport::default();
    let records = load_records(&content, &mut stats);
    report::sub_item(&format!(
        "{} records with icons, {} without, {} invalid",
        records.len(),
        stats.without_icon,
        stats.invalid
    ));

    report::step(2, 2, &format!("Downloading into {}", out_dir.display()));
    let store = if options.split_by_category {
        AssetStore::split_by_category(out_dir)
    } else {
        AssetStore::new(out_dir)
    };
    let records = claim_destinations(records, &store, &mut stats);
    let icons = IconFetcher::new(fetcher, store, options.overwrite);
    let delay = Duration::from_millis(options.request_delay_ms);
    let limit = options.limit.filter(|limit| *limit > 0);

    let mut outcomes = stream::iter(records.iter())
        .map(|record| {
            let icons = &icons;
            async move { (record, icons.fetch_record(record).await) }
        })
        .buffered(options.concurrency.max(1));

    loop {
        if limit.is_some_and(|limit| stats.processed() >= limit) {
            log::info!("Reached limit of {} records", stats.processed());
            break;
        }
        let Some((record, outcome)) = outcomes.next().await else {
            break;
        };

        let requested = match outcome {
            Ok(IconOutcome::Saved { path, source }) => {
                stats.saved += 1;
                log::info!("Saved {} ({source}) -> {}", record.name, path.display());
                true
            }
            Ok(IconOutcome::Skipped { path }) => {
                stats.skipped += 1;
                log::debug!("Skipped {}: {} exists", record.name, path.display());
                false
            }
            Ok(IconOutcome::NoIcon) => {
                stats.without_icon += 1;
                false
            }
            Err(e) => {
                stats.failed += 1;
                log::warn!(
                    "Icon failed for {}:{} ({}): {}",
                    record.category,
                    record.order_in_section,
                    record.name,
                    e
                );
                true
            }
        };

        if requested && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    report::summary(
        "Icons",
        &[
            ("saved", stats.saved.to_string()),
            ("skipped", stats.skipped.to_string()),
            ("failed", stats.failed.to_string()),
            ("without icon", stats.without_icon.to_string()),
            ("invalid", stats.invalid.to_string()),
        ],
    );
    Ok(stats)
}

/// Keep the first record for each destination; later ones count as failed.
///
/// Orders restart per category, so a combined directory maps official and
/// community entries with the same order onto one path.
fn claim_destinations(
    records: Vec<CatalogRecord>,
    store: &AssetStore,
    stats: &mut FetchReport,
) -> Vec<CatalogRecord> {
    let mut claimed: HashMap<PathBuf, String> = HashMap::new();
    let mut kept = Vec::with_capacity(records.len());

    for record in records {
        let key = format!("{}:{}", record.category, record.order_in_section);
        let base = store.base_path(&record);
        if let Some(owner) = claimed.get(&base) {
            stats.failed += 1;
            log::warn!(
                "Icon failed for {key} ({}): destination {} already claimed by {owner}",
                record.name,
                base.display()
            );
            continue;
        }
        claimed.insert(base, key);
        kept.push(record);
    }
    kept
}

/// Valid records that carry at least one icon reference.
fn load_records(content: &str, stats: &mut FetchReport) -> Vec<CatalogRecord> {
    let mut records = Vec::new();
    for (line_no, line) in non_blank_lines(content) {
        match validate_line(line) {
            Ok(record) if record.primary_icon().is_some() => records.push(record),
            Ok(_) => stats.without_icon += 1,
            Err(e) => {
                stats.invalid += 1;
                log::warn!("Line {line_no}: invalid record ({e})");
            }
        }
    }
    records
}
