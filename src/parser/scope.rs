//! Working-scope slicing.

use std::sync::LazyLock;

use regex::Regex;

static TOP_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n##[ \t]").expect("static regex"));

/// Slice the document down to the part that holds the catalog.
///
/// Starts at `anchor` and ends just before the second level-2 heading that
/// follows it, so the section right after the anchor's own block is
/// included. Returns an empty slice when the anchor is absent.
pub fn slice_for_scope<'a>(content: &'a str, anchor: &str) -> &'a str {
    let Some(start) = content.find(anchor) else {
        return "";
    };
    let after_start = &content[start..];

    match TOP_HEADING_RE.find_iter(after_start).nth(1) {
        Some(stop) => &after_start[..stop.start()],
        None => after_start,
    }
}
