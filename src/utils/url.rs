// src/utils/url.rs

//! URL manipulation utilities for icon retrieval.

use std::path::Path;

use url::Url;

/// Fallback extension when neither URL nor content type name a format.
pub const FALLBACK_EXTENSION: &str = ".bin";

/// Rewrite a GitHub "view file" URL to its raw-content equivalent.
///
/// # Examples
/// ```
/// use readme_catalog::utils::url::to_raw_content_url;
///
/// assert_eq!(
///     to_raw_content_url("https://github.com/acme/tool/blob/main/docs/logo.svg"),
///     "https://raw.githubusercontent.com/acme/tool/main/docs/logo.svg"
/// );
/// ```
pub fn to_raw_content_url(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Cannot convert {url} to a raw-content URL: {e}");
            return url.to_string();
        }
    };

    if parsed.host_str() != Some("github.com") {
        return url.to_string();
    }

    let parts: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match parts.iter().position(|p| *p == "blob") {
        Some(blob) if blob >= 2 && parts.len() > blob + 2 => format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            parts[0],
            parts[1],
            parts[blob + 1],
            parts[blob + 2..].join("/")
        ),
        _ => url.to_string(),
    }
}

/// File extension (with leading dot) of the URL's last path segment.
pub fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    Path::new(last)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
}

/// Map a declared content type to a file extension.
pub fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    match media_type.as_str() {
        "image/png" => Some(".png"),
        "image/jpeg" | "image/jpg" => Some(".jpg"),
        "image/gif" => Some(".gif"),
        "image/svg+xml" => Some(".svg"),
        "image/webp" => Some(".webp"),
        "image/x-icon" | "image/vnd.microsoft.icon" => Some(".ico"),
        "image/avif" => Some(".avif"),
        _ => None,
    }
}
