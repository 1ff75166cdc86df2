//! Extraction-time data structures.

use serde_json::{Map, Value, json};

use crate::models::Category;

/// A category-scoped group of raw entry blocks.
///
/// Lives only for the duration of one extraction.
#[derive(Debug, Clone)]
pub struct Section {
    pub category: Category,
    pub is_official: bool,
    /// Heading line that opened the section
    pub title: String,
    /// One raw markdown block per bullet entry
    pub blocks: Vec<String>,
}

impl Section {
    pub fn new(category: Category, title: impl Into<String>) -> Self {
        Self {
            category,
            is_official: category.is_official(),
            title: title.into(),
            blocks: Vec::new(),
        }
    }
}

/// Everything recovered from one surviving block, prior to validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub category: Category,
    pub order_in_section: u32,
    pub name: String,
    /// Per-run unique slug within the category
    pub slug: String,
    pub primary_url: Option<String>,
    pub repo_url: Option<String>,
    pub homepage: String,
    pub description: String,
    pub icons: Vec<String>,
    pub transports: Option<Vec<String>>,
    pub language: Option<String>,
    pub raw_md: String,
}

impl Candidate {
    /// `<category>:<slug>`, used to identify the candidate in logs.
    pub fn idempotent_key(&self) -> String {
        format!("{}:{}", self.category, self.slug)
    }

    /// Project the candidate onto the emitted record shape.
    ///
    /// The result is untyped so the validator sees exactly what would be
    /// written.
    pub fn to_record_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".into(), json!(self.name));
        map.insert("category".into(), json!(self.category));
        map.insert("orderInSection".into(), json!(self.order_in_section));
        map.insert("description".into(), json!(self.description));
        map.insert("homepage".into(), json!(self.homepage));
        if !self.icons.is_empty() {
            map.insert("icons".into(), json!(self.icons));
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candidate() -> Candidate {
        Candidate {
            category: Category::Community,
            order_in_section: 3,
            name: "Foo Server".to_string(),
            slug: "foo-server".to_string(),
            primary_url: Some("https://github.com/acme/foo".to_string()),
            repo_url: Some("https://github.com/acme/foo".to_string()),
            homepage: "https://github.com/acme/foo".to_string(),
            description: "Does a thing".to_string(),
            icons: Vec::new(),
            transports: Some(vec!["STDIO".to_string()]),
            language: Some("Python".to_string()),
            raw_md: "- **[Foo Server](https://github.com/acme/foo)** - Does a thing".to_string(),
        }
    }

    #[test]
    fn test_idempotent_key() {
        assert_eq!(sample_candidate().idempotent_key(), "community:foo-server");
    }

    #[test]
    fn test_record_value_shape() {
        let value = sample_candidate().to_record_value();
        assert_eq!(value["name"], "Foo Server");
        assert_eq!(value["category"], "community");
        assert_eq!(value["orderInSection"], 3);
        assert!(value.get("icons").is_none());
        assert!(value.get("language").is_none());
    }

    #[test]
    fn test_section_flags() {
        let section = Section::new(Category::Official, "### 🎖️ Official Integrations");
        assert!(section.is_official);
        assert!(section.blocks.is_empty());
    }
}
