//! Service layer for the catalog pipeline.
//!
//! This module contains the business logic for:
//! - Icon retrieval (`IconFetcher`) behind the `AssetFetcher` seam

mod icons;

pub use icons::{AssetFetcher, FetchedAsset, HttpAssetFetcher, IconFetcher, IconOutcome};
