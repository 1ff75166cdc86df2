//! Section partition and bullet-block segmentation.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Category, ParserConfig, Section};

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("static regex"));
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*+]\s+").expect("static regex"));

/// Headings at this level or above close a section.
const SECTION_LEVEL: usize = 3;

/// Heading patterns that open the two catalog sections.
#[derive(Debug, Clone)]
pub struct SectionMarkers {
    official: String,
    community: String,
}

impl SectionMarkers {
    pub fn new(official: &str, community: &str) -> Self {
        Self {
            official: official.to_lowercase(),
            community: community.to_lowercase(),
        }
    }

    /// Category opened by a level-3 heading with this text, if any.
    pub fn classify(&self, heading_text: &str) -> Option<Category> {
        let text = heading_text.to_lowercase();
        if text.contains(&self.official) {
            Some(Category::Official)
        } else if text.contains(&self.community) {
            Some(Category::Community)
        } else {
            None
        }
    }
}

impl From<&ParserConfig> for SectionMarkers {
    fn from(config: &ParserConfig) -> Self {
        Self::new(&config.official_heading, &config.community_heading)
    }
}

/// Heading level and text, if the line is a markdown heading.
pub fn heading(line: &str) -> Option<(usize, &str)> {
    HEADING_RE.captures(line).map(|caps| {
        let level = caps.get(1).map_or(0, |m| m.len());
        let text = caps.get(2).map_or("", |m| m.as_str());
        (level, text)
    })
}

/// Split the working scope into official and community sections.
///
/// A section runs from its heading to the next heading of level 3 or
/// above. Sections appear in document order; a repeated heading yields a
/// second section of the same category.
pub fn partition_sections(scope: &str, markers: &SectionMarkers) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(Section, Vec<&str>)> = None;

    for line in scope.lines() {
        if let Some((level, text)) = heading(line) {
            if level <= SECTION_LEVEL {
                if let Some((mut section, body)) = current.take() {
                    section.blocks = segment_blocks(&body);
                    sections.push(section);
                }
                if level == SECTION_LEVEL {
                    if let Some(category) = markers.classify(text) {
                        current = Some((Section::new(category, line.trim()), Vec::new()));
                    }
                }
                continue;
            }
        }

        if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }

    if let Some((mut section, body)) = current {
        section.blocks = segment_blocks(&body);
        sections.push(section);
    }

    sections
}

/// Group section lines into one block per top-level bullet.
///
/// Non-bullet lines continue the current block; lines before the first
/// bullet are dropped. A heading of level 3 or above ends segmentation.
pub fn segment_blocks(lines: &[&str]) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for &line in lines {
        if BULLET_RE.is_match(line) {
            flush_block(&mut current, &mut blocks);
            current.push(line);
        } else if heading(line).is_some_and(|(level, _)| level <= SECTION_LEVEL) {
            break;
        } else if !current.is_empty() {
            current.push(line);
        }
    }
    flush_block(&mut current, &mut blocks);

    blocks
}

fn flush_block(current: &mut Vec<&str>, blocks: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let block = current.join("\n").trim().to_string();
    current.clear();
    if !block.is_empty() {
        blocks.push(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> SectionMarkers {
        SectionMarkers::new("Official Integrations", "Community Servers")
    }

    #[test]
    fn classify_is_case_insensitive() {
        let m = markers();
        assert_eq!(
            m.classify("🎖️ OFFICIAL integrations"),
            Some(Category::Official)
        );
        assert_eq!(m.classify("🌎 Community Servers"), Some(Category::Community));
        assert_eq!(m.classify("Frameworks"), None);
    }

    #[test]
    fn partitions_two_sections() {
        let scope = "## 🤝 Third-Party Servers\n\
                     ### 🎖️ Official Integrations\n\
                     Intro paragraph.\n\
                     - **[A](https://a.test)** - first\n\
                     - **[B](https://b.test)** - second\n\
                     ### 🌎 Community Servers\n\
                     - **[C](https://c.test)** - third\n";
        let sections = partition_sections(scope, &markers());

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category, Category::Official);
        assert_eq!(sections[0].blocks.len(), 2);
        assert!(sections[0].blocks[0].starts_with("- **[A]"));
        assert_eq!(sections[1].category, Category::Community);
        assert!(!sections[1].is_official);
        assert_eq!(sections[1].blocks, vec!["- **[C](https://c.test)** - third"]);
    }

    #[test]
    fn unrelated_heading_closes_section() {
        let scope = "### Official Integrations\n- a\n### Other Things\n- not an entry\n";
        let sections = partition_sections(scope, &markers());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].blocks, vec!["- a"]);
    }

    #[test]
    fn level_two_heading_closes_section() {
        let scope = "### Community Servers\n- a\n## 📚 Frameworks\n- f\n";
        let sections = partition_sections(scope, &markers());
        assert_eq!(sections[0].blocks, vec!["- a"]);
    }

    #[test]
    fn continuation_lines_join_block() {
        let lines = [
            "- **[A](https://a.test)** - spans",
            "  two lines",
            "  - nested bullet stays inside",
            "#### deeper heading is text",
            "- next",
        ];
        let blocks = segment_blocks(&lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0],
            "- **[A](https://a.test)** - spans\n  two lines\n  - nested bullet stays inside\n#### deeper heading is text"
        );
        assert_eq!(blocks[1], "- next");
    }

    #[test]
    fn star_and_plus_bullets_start_blocks() {
        let blocks = segment_blocks(&["* one", "+ two", "**bold** is not a bullet"]);
        assert_eq!(blocks, vec!["* one", "+ two\n**bold** is not a bullet"]);
    }

    #[test]
    fn heading_stops_segmentation() {
        let blocks = segment_blocks(&["- a", "### Next", "- b"]);
        assert_eq!(blocks, vec!["- a"]);
    }

    #[test]
    fn crlf_lines_are_handled() {
        let scope = "### Official Integrations\r\n- a\r\n- b\r\n";
        let sections = partition_sections(scope, &markers());
        assert_eq!(sections[0].blocks, vec!["- a", "- b"]);
    }
}
