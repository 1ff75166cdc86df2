// src/services/icons.rs

//! Icon retrieval service.
//!
//! Resolves a record's first icon reference to a fetchable URL, downloads
//! it and stores it under the record's order with an inferred extension.

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::{AppError, Result};
use crate::models::{CatalogRecord, FetcherConfig};
use crate::storage::AssetStore;
use crate::storage::assets::with_suffix;
use crate::utils::http::create_client;
use crate::utils::url::{
    FALLBACK_EXTENSION, extension_from_content_type, extension_from_url, to_raw_content_url,
};

/// Body and declared content type of a downloaded asset.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Source of asset bytes.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Retrieve `url`; a non-success status is an error.
    async fn fetch(&self, url: &str) -> Result<FetchedAsset>;
}

/// `AssetFetcher` backed by a configured HTTP client.
pub struct HttpAssetFetcher {
    client: Client,
}

impl HttpAssetFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedAsset> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedAsset {
            bytes,
            content_type,
        })
    }
}

/// What happened to one record's icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconOutcome {
    /// Downloaded from `source` (the reference as written in the record)
    Saved { path: PathBuf, source: String },
    /// Destination already present and overwrite is off
    Skipped { path: PathBuf },
    /// Record carries no icon reference
    NoIcon,
}

/// Downloads record icons into an `AssetStore`.
pub struct IconFetcher<F> {
    fetcher: F,
    store: AssetStore,
    overwrite: bool,
}

impl<F: AssetFetcher> IconFetcher<F> {
    pub fn new(fetcher: F, store: AssetStore, overwrite: bool) -> Self {
        Self {
            fetcher,
            store,
            overwrite,
        }
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    /// Fetch and persist the first icon of `record`.
    pub async fn fetch_record(&self, record: &CatalogRecord) -> Result<IconOutcome> {
        let Some(source) = record.primary_icon() else {
            return Ok(IconOutcome::NoIcon);
        };

        let url = to_raw_content_url(source);
        let url_extension = extension_from_url(&url);
        let base = self.store.base_path(record);

        if !self.overwrite {
            let existing = match &url_extension {
                Some(ext) => Some(with_suffix(&base, ext)).filter(|p| p.exists()),
                None => self.store.existing_asset(&base),
            };
            if let Some(path) = existing {
                return Ok(IconOutcome::Skipped { path });
            }
        }

        let asset = self.fetcher.fetch(&url).await?;
        let extension = url_extension.unwrap_or_else(|| {
            asset
                .content_type
                .as_deref()
                .and_then(extension_from_content_type)
                .unwrap_or(FALLBACK_EXTENSION)
                .to_string()
        });

        let path = self.store.write_asset(&base, &extension, &asset.bytes).await?;
        Ok(IconOutcome::Saved {
            path,
            source: source.to_string(),
        })
    }
}
