//! Catalog record data structure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which list section an entry was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Official,
    Community,
}

impl Category {
    /// All categories in emission order.
    pub const ALL: [Category; 2] = [Category::Official, Category::Community];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Official => "official",
            Category::Community => "community",
        }
    }

    pub fn is_official(&self) -> bool {
        matches!(self, Category::Official)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "official" => Ok(Category::Official),
            "community" => Ok(Category::Community),
            other => Err(format!(
                "must be one of \"official\", \"community\" (got {other:?})"
            )),
        }
    }
}

/// A validated catalog entry, emitted as one JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Display name taken from the bold link
    pub name: String,

    /// Section the entry belongs to
    pub category: Category,

    /// 1-based position within its category
    pub order_in_section: u32,

    /// One-line description
    pub description: String,

    /// Canonical URL (primary link, else repository link)
    pub homepage: String,

    /// Icon URLs in document order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<Vec<String>>,
}

impl CatalogRecord {
    /// First icon reference, if any.
    pub fn primary_icon(&self) -> Option<&str> {
        self.icons
            .as_deref()
            .and_then(|icons| icons.first())
            .map(String::as_str)
    }
}
