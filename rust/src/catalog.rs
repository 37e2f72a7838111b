use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromptEntry {
    pub title: String,
    #[serde(alias = "prompt_text")]
    pub text: String,
}

impl PromptEntry {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Category name to prompt list, read-only once built.
///
/// Titles are trimmed and non-empty, and unique within their category;
/// entry order inside a category is the order the host supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptCatalog {
    categories: BTreeMap<String, Vec<PromptEntry>>,
}

impl PromptCatalog {
    pub fn from_entries<I, C>(categories: I) -> Self
    where
        I: IntoIterator<Item = (C, Vec<PromptEntry>)>,
        C: Into<String>,
    {
        let mut catalog = Self::default();
        for (category, entries) in categories {
            let category: String = category.into();
            let name = category.trim();
            if name.is_empty() {
                continue;
            }
            catalog.categories.entry(name.to_string()).or_default();
            for entry in entries {
                catalog.push_entry(name, entry);
            }
        }
        catalog
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(text).context("failed to parse prompt catalog JSON")?;
        Self::from_json_value(&doc)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let doc: Value = toml::from_str(text).context("failed to parse prompt catalog TOML")?;
        Self::from_json_value(&doc)
    }

    /// Reads a catalog file; `.json` files are parsed as JSON, anything
    /// else as TOML (one array of tables per category).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("prompt catalog not found: {}", path.display()));
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read prompt catalog: {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        };
        parsed.with_context(|| format!("invalid prompt catalog: {}", path.display()))
    }

    pub fn from_json_value(doc: &Value) -> Result<Self> {
        let root = doc
            .as_object()
            .ok_or_else(|| anyhow!("prompt catalog must be an object keyed by category"))?;

        let mut catalog = Self::default();
        for (raw_category, raw_entries) in root {
            let category = raw_category.trim();
            if category.is_empty() {
                log::warn!("skipping prompt category with a blank name");
                continue;
            }

            let Some(items) = raw_entries.as_array() else {
                log::warn!("prompt category {category:?} is not a list, skipping");
                continue;
            };

            catalog.categories.entry(category.to_string()).or_default();
            for item in items {
                let Some(entry) = item.as_object().and_then(entry_from_object) else {
                    continue;
                };
                catalog.push_entry(category, entry);
            }
        }

        Ok(catalog)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Category names, lexicographically ascending.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn entries(&self, category: &str) -> Option<&[PromptEntry]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn find(&self, category: &str, title: &str) -> Option<&PromptEntry> {
        self.entries(category)?
            .iter()
            .find(|entry| entry.title == title)
    }

    fn push_entry(&mut self, category: &str, entry: PromptEntry) {
        let title = entry.title.trim();
        let entries = self.categories.entry(category.to_string()).or_default();
        if title.is_empty() || entries.iter().any(|existing| existing.title == title) {
            return;
        }
        entries.push(PromptEntry {
            title: title.to_string(),
            text: entry.text,
        });
    }
}

fn entry_from_object(item: &Map<String, Value>) -> Option<PromptEntry> {
    let title = item.get("title").and_then(Value::as_str)?;
    let text = item
        .get("text")
        .or_else(|| item.get("prompt_text"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(PromptEntry::new(title, text))
}
