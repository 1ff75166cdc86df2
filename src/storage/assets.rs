//! Local filesystem store for downloaded icon assets.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! ├── 1.png                 # combined: keyed by orderInSection
//! ├── 2.svg
//! └── official/             # split_by_category = true
//!     └── 1.ico
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::CatalogRecord;
use crate::utils::url::FALLBACK_EXTENSION;

/// Suffix of in-progress downloads.
const DOWNLOAD_SUFFIX: &str = ".download";

/// Extensions an asset may have been saved under.
const KNOWN_EXTENSIONS: &[&str] = &[
    ".png",
    ".jpg",
    ".gif",
    ".svg",
    ".webp",
    ".ico",
    ".avif",
    FALLBACK_EXTENSION,
];

/// Asset directory keyed by record order.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root_dir: PathBuf,
    split_by_category: bool,
}

impl AssetStore {
    /// Create a store writing every asset directly under `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            split_by_category: false,
        }
    }

    /// Create a store with one subdirectory per category.
    pub fn split_by_category(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            split_by_category: true,
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Destination path without extension for a record.
    pub fn base_path(&self, record: &CatalogRecord) -> PathBuf {
        let dir = if self.split_by_category {
            self.root_dir.join(record.category.as_str())
        } else {
            self.root_dir.clone()
        };
        dir.join(record.order_in_section.to_string())
    }

    /// An already saved asset for `base`, under any known extension.
    pub fn existing_asset(&self, base: &Path) -> Option<PathBuf> {
        KNOWN_EXTENSIONS
            .iter()
            .map(|ext| with_suffix(base, ext))
            .find(|path| path.exists())
    }

    /// Write bytes via a temporary file, then rename to `<base><extension>`.
    pub async fn write_asset(&self, base: &Path, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
        if let Some(parent) = base.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = with_suffix(base, DOWNLOAD_SUFFIX);
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        let path = with_suffix(base, extension);
        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }
}

/// Append a raw suffix (such as `.png`) to a path.
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
