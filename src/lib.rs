// src/lib.rs

//! README catalog extractor library.
//!
//! Turns the third-party server listing of a markdown README into a
//! validated line-delimited catalog and downloads each entry's icon.

pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod schema;
pub mod services;
pub mod storage;
pub mod utils;
