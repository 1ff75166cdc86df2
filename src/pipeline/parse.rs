// src/pipeline/parse.rs

//! README → JSONL pipeline.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result, ValidationError};
use crate::models::ParserConfig;
use crate::parser::{Extraction, extract_file};
use crate::schema;
use crate::storage::{JsonlWriter, write_text_lines};
use crate::utils::report;

/// Settings for one parse run.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Abort on the first validation failure
    pub strict: bool,
    /// Failure log destination
    pub log_path: PathBuf,
    pub parser: ParserConfig,
}

/// A candidate rejected by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// `<category>:<slug>` of the rejected candidate
    pub key: String,
    pub error: ValidationError,
}

impl RecordFailure {
    fn log_line(&self) -> String {
        format!("[VALIDATION] Failed for {}: {}", self.key, self.error)
    }
}

/// Outcome of a completed parse run.
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub written: usize,
    pub failed: usize,
    /// Blocks dropped before validation
    pub skipped: usize,
    pub snapshot_hash: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub failures: Vec<RecordFailure>,
}

/// Extract, validate and write every catalog record of `input` to `output`.
///
/// Non-strict runs log failures and continue. Strict runs stop at the first
/// failure, leaving the records written so far plus a log with that failure
/// and the stats line, then return `AppError::Validation`.
pub fn run_parse(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<ParseReport> {
    let input = input.as_ref();
    let started_at = Utc::now();
    report::header("Catalog parse");

    report::step(1, 2, &format!("Extracting {}", input.display()));
    let extraction = extract_file(input, &options.parser)?;
    log_extraction(&extraction);

    report::step(2, 2, &format!("Writing {}", output.as_ref().display()));
    let mut writer = JsonlWriter::create(output.as_ref())?;
    let mut failures = Vec::new();

    for candidate in &extraction.candidates {
        match schema::validate(&candidate.to_record_value()) {
            Ok(record) => writer.write_record(&record)?,
            Err(error) => {
                let failure = RecordFailure {
                    key: candidate.idempotent_key(),
                    error,
                };
                log::warn!("{}", failure.log_line());
                failures.push(failure);

                if options.strict {
                    let written = writer.finish()?;
                    write_log(&options.log_path, &failures, written)?;
                    log::error!("Strict mode: aborting after {written} records");
                    let failure = failures.remove(0);
                    return Err(AppError::Validation(failure.error));
                }
            }
        }
    }

    let written = writer.finish()?;
    write_log(&options.log_path, &failures, written)?;

    let report = ParseReport {
        written,
        failed: failures.len(),
        skipped: extraction.skipped,
        snapshot_hash: extraction.snapshot_hash,
        started_at,
        finished_at: Utc::now(),
        failures,
    };
    summarize(&report);
    Ok(report)
}

/// Failure lines followed by `[STATS] wrote=<n> failed=<m>`.
fn write_log(path: &Path, failures: &[RecordFailure], written: usize) -> Result<()> {
    let mut lines: Vec<String> = failures.iter().map(RecordFailure::log_line).collect();
    lines.push(stats_line(written, failures.len()));
    write_text_lines(path, &lines)
}

fn stats_line(written: usize, failed: usize) -> String {
    format!("[STATS] wrote={written} failed={failed}")
}

fn log_extraction(extraction: &Extraction) {
    report::sub_item(&format!("Snapshot: {}", extraction.snapshot_hash));
    report::sub_item(&format!(
        "{} sections, {} candidates, {} skipped",
        extraction.section_count,
        extraction.candidates.len(),
        extraction.skipped
    ));
    if extraction.section_count == 0 {
        log::warn!("No catalog sections found; check parser.start_anchor");
    }
}

fn summarize(report: &ParseReport) {
    let elapsed = report.finished_at - report.started_at;
    report::summary(
        "Parse",
        &[
            ("written", report.written.to_string()),
            ("failed", report.failed.to_string()),
            ("skipped", report.skipped.to_string()),
            ("snapshot", report.snapshot_hash.clone()),
            ("elapsed", format!("{}ms", elapsed.num_milliseconds())),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::models::{CatalogRecord, Category};
    use tempfile::TempDir;

    const README: &str = "# Servers\n\
        ## 🤝 Third-Party Servers\n\
        ### 🎖️ Official Integrations\n\
        - <img src=\"https://a.test/a.png\" width=\"12\"/> **[Alpha](https://alpha.test)** - First official\n\
        - **[Broken](https://broken.test)**\n\
        - **[Beta](https://beta.test)** - Second official\n\
        ### 🌎 Community Servers\n\
        - **[Gamma](https://github.com/acme/gamma)** - First community\n\
        ## 📚 Resources\n";

    struct Fixture {
        _tmp: TempDir,
        input: PathBuf,
        output: PathBuf,
        options: ParseOptions,
    }

    fn fixture(readme: &str, strict: bool) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("input/README.md");
        fs::create_dir_all(input.parent().unwrap()).unwrap();
        fs::write(&input, readme).unwrap();
        let output = tmp.path().join("output/catalogItems.jsonl");
        let options = ParseOptions {
            strict,
            log_path: tmp.path().join("output/parse.log"),
            parser: ParserConfig::default(),
        };
        Fixture {
            _tmp: tmp,
            input,
            output,
            options,
        }
    }

    fn read_records(path: &Path) -> Vec<CatalogRecord> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn writes_valid_records_and_logs_failures() {
        let f = fixture(README, false);
        let report = run_parse(&f.input, &f.output, &f.options).unwrap();

        assert_eq!(report.written, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].key, "official:broken");
        assert_eq!(report.failures[0].error.field, "description");

        let records = read_records(&f.output);
        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.name.as_str(), r.category, r.order_in_section))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Alpha", Category::Official, 1),
                ("Beta", Category::Official, 3),
                ("Gamma", Category::Community, 1),
            ]
        );
        assert_eq!(records[0].icons, Some(vec!["https://a.test/a.png".to_string()]));

        let log = fs::read_to_string(&f.options.log_path).unwrap();
        assert_eq!(
            log,
            "[VALIDATION] Failed for official:broken: description: must not be empty\n\
             [STATS] wrote=3 failed=1\n"
        );
    }

    #[test]
    fn strict_mode_aborts_on_first_failure() {
        let f = fixture(README, true);
        let err = run_parse(&f.input, &f.output, &f.options).unwrap_err();

        match err {
            AppError::Validation(e) => assert_eq!(e.field, "description"),
            other => panic!("unexpected error: {other}"),
        }

        let records = read_records(&f.output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alpha");

        let log = fs::read_to_string(&f.options.log_path).unwrap();
        assert!(log.ends_with("[STATS] wrote=1 failed=1\n"));
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        let f = fixture(README, false);
        run_parse(&f.input, &f.output, &f.options).unwrap();
        let first = fs::read(&f.output).unwrap();
        run_parse(&f.input, &f.output, &f.options).unwrap();
        assert_eq!(fs::read(&f.output).unwrap(), first);
    }

    #[test]
    fn missing_anchor_writes_empty_output() {
        let f = fixture("# Nothing here\n### Official Integrations\n", true);
        let report = run_parse(&f.input, &f.output, &f.options).unwrap();

        assert_eq!((report.written, report.failed), (0, 0));
        assert_eq!(fs::read_to_string(&f.output).unwrap(), "");
        assert_eq!(
            fs::read_to_string(&f.options.log_path).unwrap(),
            "[STATS] wrote=0 failed=0\n"
        );
    }

    #[test]
    fn unreadable_input_is_fatal() {
        let f = fixture(README, false);
        let missing = f.input.with_file_name("missing.md");
        let err = run_parse(&missing, &f.output, &f.options).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn report_carries_snapshot_hash() {
        let f = fixture(README, false);
        let report = run_parse(&f.input, &f.output, &f.options).unwrap();
        assert_eq!(report.snapshot_hash, crate::utils::hash_content(README));
        assert!(report.finished_at >= report.started_at);
    }
}
