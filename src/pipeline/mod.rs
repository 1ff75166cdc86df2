//! Pipeline entry points.
//!
//! - `run_parse`: README → validated JSONL catalog plus failure log
//! - `run_fetch_icons`: JSONL catalog → icon directory
//! - `run_info`: source fingerprint and emitted record counts

pub mod icons;
pub mod info;
pub mod parse;

pub use icons::{FetchReport, IconOptions, run_fetch_icons};
pub use info::{RunInfo, run_info};
pub use parse::{ParseOptions, ParseReport, RecordFailure, run_parse};
