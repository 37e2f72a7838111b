//! Dependent category -> prompt title selection.
//!
//! The library is inert unless the host supplies a non-empty catalog. Once
//! attached it moves between three states: nothing chosen, a category
//! chosen, and a prompt injected into the target text area. The text area
//! is only ever written by a prompt choice, so edits made while browsing
//! categories survive until a title is picked.

use crate::catalog::PromptCatalog;
use crate::config::UiConfig;
use crate::NO_PROMPT_SELECTED;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn labelled(text: &str) -> Self {
        Self {
            value: text.to_string(),
            label: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryState {
    Unselected,
    CategorySelected { category: String },
    PromptChosen { category: String, title: String },
}

/// Replacement contents for the prompt selector after a category change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSelectSnapshot {
    /// Placeholder first, then one option per entry in catalog order.
    pub options: Vec<SelectOption>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionSource {
    Catalog,
    /// The chosen title was not in the current category; the title itself
    /// is written instead.
    TitleFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub text: String,
    pub focus: bool,
    pub source: InjectionSource,
}

#[derive(Debug, Clone)]
pub struct PromptLibrary {
    catalog: PromptCatalog,
    category_placeholder: String,
    prompt_placeholder: String,
    state: LibraryState,
}

impl PromptLibrary {
    /// Returns `None` for an empty catalog: pages without a prompt library
    /// simply never attach one.
    pub fn new(
        catalog: PromptCatalog,
        category_placeholder: impl Into<String>,
        prompt_placeholder: impl Into<String>,
    ) -> Option<Self> {
        if catalog.is_empty() {
            return None;
        }

        Some(Self {
            catalog,
            category_placeholder: category_placeholder.into(),
            prompt_placeholder: prompt_placeholder.into(),
            state: LibraryState::Unselected,
        })
    }

    pub fn from_config(catalog: PromptCatalog, config: &UiConfig) -> Option<Self> {
        Self::new(
            catalog,
            config.labels.category_placeholder.clone(),
            config.labels.prompt_placeholder.clone(),
        )
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    pub fn catalog(&self) -> &PromptCatalog {
        &self.catalog
    }

    /// Placeholder first (empty value, so the initial selection is
    /// `Unselected`), then every category ascending, labelled by its own name.
    pub fn category_options(&self) -> Vec<SelectOption> {
        let placeholder = SelectOption {
            value: NO_PROMPT_SELECTED.to_string(),
            label: self.category_placeholder.clone(),
        };
        std::iter::once(placeholder)
            .chain(self.catalog.categories().map(SelectOption::labelled))
            .collect()
    }

    pub fn select_category(&mut self, category: &str) -> PromptSelectSnapshot {
        let mut options = vec![SelectOption {
            value: NO_PROMPT_SELECTED.to_string(),
            label: self.prompt_placeholder.clone(),
        }];

        if category.is_empty() {
            self.state = LibraryState::Unselected;
            return PromptSelectSnapshot {
                options,
                enabled: false,
            };
        }

        self.state = LibraryState::CategorySelected {
            category: category.to_string(),
        };

        let entries = self.catalog.entries(category).unwrap_or_default();
        options.extend(entries.iter().map(|entry| SelectOption::labelled(&entry.title)));
        log::debug!(
            "prompt category {category:?} selected ({} prompts)",
            entries.len()
        );

        PromptSelectSnapshot {
            enabled: !entries.is_empty(),
            options,
        }
    }

    /// Resolves the chosen title against the current category. The
    /// placeholder (empty value) changes nothing.
    pub fn select_prompt(&mut self, title: &str) -> Option<Injection> {
        if title == NO_PROMPT_SELECTED {
            return None;
        }

        let category = match &self.state {
            LibraryState::Unselected => String::new(),
            LibraryState::CategorySelected { category }
            | LibraryState::PromptChosen { category, .. } => category.clone(),
        };

        let injection = match self.catalog.find(&category, title) {
            Some(entry) => {
                log::debug!("injecting prompt text for {title:?}");
                Injection {
                    text: entry.text.clone(),
                    focus: true,
                    source: InjectionSource::Catalog,
                }
            }
            None => {
                log::warn!(
                    "prompt {title:?} not found in category {category:?}, injecting the title"
                );
                Injection {
                    text: title.to_string(),
                    focus: false,
                    source: InjectionSource::TitleFallback,
                }
            }
        };

        self.state = LibraryState::PromptChosen {
            category,
            title: title.to_string(),
        };
        Some(injection)
    }
}

/// First candidate id the page actually has; the prompt library injects
/// into that element (a `<textarea>` or a text `<input>`).
pub fn first_present_id<'a, F>(candidates: &'a [String], is_present: F) -> Option<&'a str>
where
    F: Fn(&str) -> bool,
{
    candidates
        .iter()
        .map(String::as_str)
        .find(|id| is_present(id))
}
