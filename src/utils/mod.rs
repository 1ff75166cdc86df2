//! Text utilities shared by the extractor, validator and icon fetcher.

pub mod http;
pub mod report;
pub mod url;

use std::sync::LazyLock;

use chrono::{SecondsFormat, Utc};
use regex::Regex;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Source-hosting domains recognised as repository links.
pub const REPO_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org"];

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("static regex"));

/// Fingerprint document content for change detection.
///
/// Rendered as `sha256:<hex>`. Not intended for any security purpose.
pub fn hash_content(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Prefix `https://` when the URL carries no scheme.
///
/// Malformed input is passed along; validation happens downstream.
pub fn ensure_secure_url(url: &str) -> String {
    let url = url.trim();
    if SCHEME_RE.is_match(url) {
        return url.to_string();
    }
    match url.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => format!("https://{url}"),
    }
}

/// Whether the URL's host is one of the known source-hosting domains.
pub fn is_repo_host(url: &str) -> bool {
    host_in(url, REPO_HOSTS)
}

/// Whether the URL's host exactly matches one of `hosts`, ignoring case.
pub fn host_in<S: AsRef<str>>(url: &str, hosts: &[S]) -> bool {
    let Ok(parsed) = ::url::Url::parse(url) else {
        return false;
    };
    parsed
        .host_str()
        .is_some_and(|host| hosts.iter().any(|h| h.as_ref().eq_ignore_ascii_case(host)))
}

/// Normalize text into a lowercase ASCII slug separated by single hyphens.
///
/// # Examples
/// ```
/// use readme_catalog::utils::to_slug;
///
/// assert_eq!(to_slug("Café Müller!!"), "cafe-muller");
/// assert_eq!(to_slug("  snake_case  name "), "snake-case-name");
/// ```
pub fn to_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Current UTC time as RFC 3339 with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Collapse every whitespace run into a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
