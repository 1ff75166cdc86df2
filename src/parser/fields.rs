//! Per-block field extraction.
//!
//! Heuristic and non-exhaustive: every pattern miss degrades to an empty or
//! missing field, never to an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::{collapse_whitespace, ensure_secure_url, host_in};

static BOLD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*\s*\[([^\]]+)\]\(([^)]+)\)\s*\*\*").expect("static regex")
});
static HTML_IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["'][^>]*>"#).expect("static regex")
});
static MD_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[[^\]]*\]\(\s*([^)\s]+)[^)]*\)").expect("static regex")
});
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]\(\s*([^)\s]+)[^)]*\)").expect("static regex"));
static LEADING_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+").expect("static regex"));

/// Delimiter between the name link and the description.
const DESCRIPTION_DELIMITER: &str = " - ";

/// Transport keywords, matched against lower-cased text.
const TRANSPORTS: &[&str] = &["stdio", "sse", "streamable http"];

/// Fields recovered from a single bullet block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub name: String,
    pub primary_url: Option<String>,
    pub repo_url: Option<String>,
    pub description: String,
    pub icons: Vec<String>,
    pub transports: Option<Vec<String>>,
    pub language: Option<String>,
    pub raw_md: String,
}

impl ExtractedFields {
    /// Primary URL, else repository URL.
    pub fn homepage(&self) -> Option<&str> {
        self.primary_url.as_deref().or(self.repo_url.as_deref())
    }
}

/// Why a block produced no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    MissingUrl,
}

/// Tagged extraction result for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Keep(ExtractedFields),
    Skip(SkipReason),
}

/// Extract fields and apply the name + homepage structural filter.
pub fn extract_block<S: AsRef<str>>(raw_block: &str, repo_hosts: &[S]) -> BlockOutcome {
    let fields = extract_fields(raw_block, repo_hosts);
    if fields.name.is_empty() {
        BlockOutcome::Skip(SkipReason::MissingName)
    } else if fields.homepage().is_none() {
        BlockOutcome::Skip(SkipReason::MissingUrl)
    } else {
        BlockOutcome::Keep(fields)
    }
}

/// Extract every field the block offers.
pub fn extract_fields<S: AsRef<str>>(raw_block: &str, repo_hosts: &[S]) -> ExtractedFields {
    let raw_md = raw_block.trim();

    let bold = BOLD_LINK_RE.captures(raw_md);
    let name = bold
        .as_ref()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let primary_url = bold
        .as_ref()
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().trim())
        .filter(|url| !url.is_empty())
        .map(ensure_secure_url);
    let link_end = bold.as_ref().and_then(|caps| caps.get(0)).map_or(0, |m| m.end());

    let description = extract_description(raw_md, link_end);
    let icons = extract_icons(raw_md);
    let repo_url = extract_repo_url(raw_md, primary_url.as_deref(), repo_hosts);

    let surface = format!("{raw_md} {description}").to_lowercase();

    ExtractedFields {
        name,
        primary_url,
        repo_url,
        description,
        icons,
        transports: detect_transports(&surface),
        language: detect_language(&surface),
        raw_md: raw_md.to_string(),
    }
}

/// Text after the first delimiter following the name link.
///
/// Without a delimiter, falls back to the block with bullet, name link and
/// image markup stripped. Either way whitespace is collapsed.
fn extract_description(raw_md: &str, link_end: usize) -> String {
    if let Some(idx) = raw_md[link_end..].find(DESCRIPTION_DELIMITER) {
        let start = link_end + idx + DESCRIPTION_DELIMITER.len();
        return collapse_whitespace(&raw_md[start..]);
    }

    let stripped = LEADING_BULLET_RE.replace(raw_md, "");
    let stripped = BOLD_LINK_RE.replace(&stripped, " ");
    let stripped = HTML_IMG_RE.replace_all(&stripped, " ");
    let stripped = MD_IMAGE_RE.replace_all(&stripped, " ");
    collapse_whitespace(&stripped)
        .trim_start_matches(|c: char| matches!(c, '-' | '–' | '—' | ':') || c.is_whitespace())
        .to_string()
}

/// Every inline image source, HTML or markdown, in document order.
fn extract_icons(raw_md: &str) -> Vec<String> {
    let mut found: Vec<(usize, &str)> = HTML_IMG_RE
        .captures_iter(raw_md)
        .chain(MD_IMAGE_RE.captures_iter(raw_md))
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let src = caps.get(1)?;
            Some((whole.start(), src.as_str().trim()))
        })
        .filter(|(_, src)| !src.is_empty())
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found
        .into_iter()
        .map(|(_, src)| ensure_secure_url(src))
        .collect()
}

/// Primary URL when it is a repository, else the first repository link.
fn extract_repo_url<S: AsRef<str>>(
    raw_md: &str,
    primary_url: Option<&str>,
    repo_hosts: &[S],
) -> Option<String> {
    if let Some(url) = primary_url.filter(|url| host_in(url, repo_hosts)) {
        return Some(url.to_string());
    }

    LINK_RE
        .captures_iter(raw_md)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            // Image references are not links
            if raw_md[..whole.start()].ends_with('!') {
                return None;
            }
            caps.get(1).map(|m| ensure_secure_url(m.as_str()))
        })
        .find(|url| host_in(url, repo_hosts))
}

fn detect_transports(surface: &str) -> Option<Vec<String>> {
    let transports: Vec<String> = TRANSPORTS
        .iter()
        .filter(|t| surface.contains(*t))
        .map(|t| t.to_uppercase())
        .collect();
    (!transports.is_empty()).then_some(transports)
}

fn detect_language(surface: &str) -> Option<String> {
    let language = if surface.contains("typescript") {
        "TypeScript"
    } else if surface.contains("python") {
        "Python"
    } else if surface.contains("go ") || surface.contains(" golang") || surface.contains(" in go")
    {
        "Go"
    } else {
        return None;
    };
    Some(language.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::REPO_HOSTS;

    fn fields(block: &str) -> ExtractedFields {
        extract_fields(block, REPO_HOSTS)
    }

    #[test]
    fn bold_link_with_dash_description() {
        let f = fields("- **[Foo](https://x.test/a)** - Does a thing");
        assert_eq!(f.name, "Foo");
        assert_eq!(f.primary_url.as_deref(), Some("https://x.test/a"));
        assert_eq!(f.homepage(), Some("https://x.test/a"));
        assert_eq!(f.description, "Does a thing");
        assert!(f.icons.is_empty());
        assert_eq!(f.repo_url, None);
    }

    #[test]
    fn readme_style_entry_with_logo() {
        let block = r#"- <img height="12" width="12" src="https://www.convex.dev/favicon.ico" alt="Convex Logo" /> **[Convex](https://stack.convex.dev/convex-mcp-server)** - Introspect and query your apps
  deployed to   Convex."#;
        let f = fields(block);
        assert_eq!(f.name, "Convex");
        assert_eq!(f.icons, vec!["https://www.convex.dev/favicon.ico"]);
        assert_eq!(
            f.description,
            "Introspect and query your apps deployed to Convex."
        );
    }

    #[test]
    fn icons_keep_document_order_across_syntaxes() {
        let block = r#"- ![a](https://a.test/1.png) <IMG SRC='//b.test/2.svg'> **[N](https://n.test)** ![c](https://c.test/3.gif "title") - d"#;
        assert_eq!(
            fields(block).icons,
            vec![
                "https://a.test/1.png",
                "https://b.test/2.svg",
                "https://c.test/3.gif"
            ]
        );
    }

    #[test]
    fn delimiter_inside_name_is_ignored() {
        let f = fields("- **[A - B](https://ab.test)** - The real description");
        assert_eq!(f.name, "A - B");
        assert_eq!(f.description, "The real description");
    }

    #[test]
    fn description_fallback_strips_markup() {
        let f = fields(r#"- <img src="https://i.test/x.png"/> **[Bar](https://bar.test)**: Tools for bars"#);
        assert_eq!(f.description, "Tools for bars");

        let f = fields("- **[Bare](https://bare.test)**");
        assert_eq!(f.description, "");
    }

    #[test]
    fn repo_url_from_primary() {
        let f = fields("- **[Tool](https://github.com/acme/tool)** - A tool");
        assert_eq!(f.repo_url.as_deref(), Some("https://github.com/acme/tool"));
    }

    #[test]
    fn repo_url_from_later_link() {
        let f = fields(
            "- **[Tool](https://tool.test)** - See [docs](https://docs.test) and [source](gitlab.com/acme/tool)",
        );
        assert_eq!(f.repo_url.as_deref(), Some("https://gitlab.com/acme/tool"));
        assert_eq!(f.homepage(), Some("https://tool.test"));
    }

    #[test]
    fn repo_images_are_not_repo_links() {
        let f = fields(
            "- ![logo](https://github.com/acme/tool/blob/main/logo.png) **[Tool](https://tool.test)** - x",
        );
        assert_eq!(f.repo_url, None);
    }

    #[test]
    fn missing_bold_link_means_no_name() {
        let f = fields("- [Plain](https://github.com/acme/plain) - not bold");
        assert_eq!(f.name, "");
        assert_eq!(f.primary_url, None);
        assert_eq!(f.repo_url.as_deref(), Some("https://github.com/acme/plain"));
    }

    #[test]
    fn primary_url_without_scheme_is_secured() {
        let f = fields("- **[Foo](foo.test/docs)** - x");
        assert_eq!(f.primary_url.as_deref(), Some("https://foo.test/docs"));
    }

    #[test]
    fn detects_tags() {
        let f = fields(
            "- **[T](https://t.test)** - A TypeScript server over stdio and Streamable HTTP",
        );
        assert_eq!(
            f.transports,
            Some(vec!["STDIO".to_string(), "STREAMABLE HTTP".to_string()])
        );
        assert_eq!(f.language.as_deref(), Some("TypeScript"));

        let f = fields("- **[G](https://g.test)** - Manages Google Docs");
        assert_eq!(f.language, None);

        let f = fields("- **[G](https://g.test)** - Written in Go for speed");
        assert_eq!(f.language.as_deref(), Some("Go"));

        let f = fields("- **[P](https://p.test)** - Plain");
        assert_eq!(f.transports, None);
        assert_eq!(f.language, None);
    }

    #[test]
    fn structural_filter() {
        assert_eq!(
            extract_block("- no link at all - text", REPO_HOSTS),
            BlockOutcome::Skip(SkipReason::MissingName)
        );
        assert_eq!(
            extract_block("- **[Empty]()** - text", REPO_HOSTS),
            BlockOutcome::Skip(SkipReason::MissingName)
        );
        assert!(matches!(
            extract_block("- **[Ok](https://ok.test)** - text", REPO_HOSTS),
            BlockOutcome::Keep(_)
        ));
    }

    #[test]
    fn never_panics_on_garbage() {
        for block in ["", "-", "**[", "- **[x](", "- ![](", "<img src=", "- - - -"] {
            let _ = extract_block(block, REPO_HOSTS);
        }
    }
}
