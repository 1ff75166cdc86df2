// src/models/mod.rs

//! Domain models for the catalog pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod candidate;
mod config;
mod record;

// Re-export all public types
pub use candidate::{Candidate, Section};
pub use config::{Config, FetcherConfig, ParserConfig, PathsConfig};
pub use record::{CatalogRecord, Category};
