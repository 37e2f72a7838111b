use anyhow::{Context, Result};
use toml::map::Map;
use toml::Value;

const DEFAULT_UI_TOML: &str = include_str!("../../config/ui.toml");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub busy: String,
    pub copy: String,
    pub copied: String,
    pub copy_failed: String,
    pub category_placeholder: String,
    pub prompt_placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colors {
    pub copy_success: String,
    pub copy_failure: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    pub tick_ms: u32,
    pub copied_revert_ms: u32,
    pub failed_revert_ms: u32,
}

/// DOM role markers. `copy_button`, `response_text`, `search_input`,
/// `no_results`, the two selects and `text_area_ids` are element ids;
/// `indicator_visible_class` is a class name; the rest are CSS selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub feature_form: String,
    pub feature_page: String,
    pub loading_indicator: String,
    pub indicator_visible_class: String,
    pub timer: String,
    pub submit_button: String,
    pub copy_button: String,
    pub response_text: String,
    pub search_input: String,
    pub card_grid: String,
    pub card: String,
    pub card_title: String,
    pub card_description: String,
    pub no_results: String,
    pub category_select: String,
    pub prompt_select: String,
    pub text_area_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    pub labels: Labels,
    pub colors: Colors,
    pub timing: Timing,
    pub selectors: Selectors,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            labels: Labels {
                busy: "Generating...".to_string(),
                copy: "Copy Text".to_string(),
                copied: "Copied!".to_string(),
                copy_failed: "Copy Failed".to_string(),
                category_placeholder: "-- Select Category --".to_string(),
                prompt_placeholder: "-- Select Prompt Title --".to_string(),
            },
            colors: Colors {
                copy_success: "#28a745".to_string(),
                copy_failure: "#dc3545".to_string(),
            },
            timing: Timing {
                tick_ms: 1000,
                copied_revert_ms: 2000,
                failed_revert_ms: 3000,
            },
            selectors: Selectors {
                feature_form: "form.feature-form".to_string(),
                feature_page: ".feature-page".to_string(),
                loading_indicator: ".loading-indicator".to_string(),
                indicator_visible_class: "visible".to_string(),
                timer: ".timer-span".to_string(),
                submit_button: r#"button[type="submit"]"#.to_string(),
                copy_button: "copy-button".to_string(),
                response_text: "response-text".to_string(),
                search_input: "feature-search-input".to_string(),
                card_grid: ".feature-grid".to_string(),
                card: ".feature-card".to_string(),
                card_title: "h3".to_string(),
                card_description: "p".to_string(),
                no_results: "no-results-message".to_string(),
                category_select: "prompt-category-select".to_string(),
                prompt_select: "prompt-select".to_string(),
                text_area_ids: [
                    "prompt_text",
                    "prompt_image",
                    "prompt_video",
                    "prompt_audio",
                    "prompt_pdf",
                    "prompt_excel",
                    "prompt_excel_row",
                ]
                .into_iter()
                .map(ToOwned::to_owned)
                .collect(),
            },
        }
    }
}

impl UiConfig {
    /// Defaults shipped with the crate (`config/ui.toml`).
    pub fn embedded() -> Self {
        match Self::default().merged_with_toml(DEFAULT_UI_TOML) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("embedded ui config rejected, using built-in values: {err:#}");
                Self::default()
            }
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::default().merged_with_toml(text)
    }

    /// Layers `text` over `self`. Keys that are missing, mistyped or out of
    /// range keep their current value; only a malformed document fails.
    pub fn merged_with_toml(&self, text: &str) -> Result<Self> {
        let doc: Value = toml::from_str(text).context("failed to parse ui config TOML")?;

        let labels = table(&doc, "labels");
        let colors = table(&doc, "colors");
        let timing = table(&doc, "timing");
        let selectors = table(&doc, "selectors");
        let current = &self.selectors;

        Ok(Self {
            labels: Labels {
                busy: text_or(labels, "busy", &self.labels.busy),
                copy: text_or(labels, "copy", &self.labels.copy),
                copied: text_or(labels, "copied", &self.labels.copied),
                copy_failed: text_or(labels, "copy_failed", &self.labels.copy_failed),
                category_placeholder: text_or(
                    labels,
                    "category_placeholder",
                    &self.labels.category_placeholder,
                ),
                prompt_placeholder: text_or(
                    labels,
                    "prompt_placeholder",
                    &self.labels.prompt_placeholder,
                ),
            },
            colors: Colors {
                copy_success: text_or(colors, "copy_success", &self.colors.copy_success),
                copy_failure: text_or(colors, "copy_failure", &self.colors.copy_failure),
            },
            timing: Timing {
                tick_ms: millis_or(timing, "tick_ms", self.timing.tick_ms),
                copied_revert_ms: millis_or(
                    timing,
                    "copied_revert_ms",
                    self.timing.copied_revert_ms,
                ),
                failed_revert_ms: millis_or(
                    timing,
                    "failed_revert_ms",
                    self.timing.failed_revert_ms,
                ),
            },
            selectors: Selectors {
                feature_form: text_or(selectors, "feature_form", &current.feature_form),
                feature_page: text_or(selectors, "feature_page", &current.feature_page),
                loading_indicator: text_or(
                    selectors,
                    "loading_indicator",
                    &current.loading_indicator,
                ),
                indicator_visible_class: text_or(
                    selectors,
                    "indicator_visible_class",
                    &current.indicator_visible_class,
                ),
                timer: text_or(selectors, "timer", &current.timer),
                submit_button: text_or(selectors, "submit_button", &current.submit_button),
                copy_button: text_or(selectors, "copy_button", &current.copy_button),
                response_text: text_or(selectors, "response_text", &current.response_text),
                search_input: text_or(selectors, "search_input", &current.search_input),
                card_grid: text_or(selectors, "card_grid", &current.card_grid),
                card: text_or(selectors, "card", &current.card),
                card_title: text_or(selectors, "card_title", &current.card_title),
                card_description: text_or(
                    selectors,
                    "card_description",
                    &current.card_description,
                ),
                no_results: text_or(selectors, "no_results", &current.no_results),
                category_select: text_or(
                    selectors,
                    "category_select",
                    &current.category_select,
                ),
                prompt_select: text_or(selectors, "prompt_select", &current.prompt_select),
                text_area_ids: list_or(selectors, "text_area_ids", &current.text_area_ids),
            },
        })
    }
}

fn table<'a>(doc: &'a Value, name: &str) -> Option<&'a Map<String, Value>> {
    doc.as_table()
        .and_then(|root| root.get(name))
        .and_then(Value::as_table)
}

fn text_or(table: Option<&Map<String, Value>>, key: &str, fallback: &str) -> String {
    table
        .and_then(|t| t.get(key))
        .and_then(Value::as_str)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn millis_or(table: Option<&Map<String, Value>>, key: &str, fallback: u32) -> u32 {
    table
        .and_then(|t| t.get(key))
        .and_then(value_to_i64)
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .unwrap_or(fallback)
}

fn list_or(table: Option<&Map<String, Value>>, key: &str, fallback: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    if let Some(Value::Array(items)) = table.and_then(|t| t.get(key)) {
        for item in items {
            let Some(text) = item.as_str().map(str::trim) else {
                continue;
            };
            if !text.is_empty() && !normalized.iter().any(|existing| existing == text) {
                normalized.push(text.to_string());
            }
        }
    }

    if normalized.is_empty() {
        fallback.to_vec()
    } else {
        normalized
    }
}

fn value_to_i64(value: &Value) -> Option<i64> {
    value
        .as_integer()
        .or_else(|| value.as_float().map(|v| v as i64))
        .or_else(|| value.as_str().and_then(|v| v.trim().parse::<i64>().ok()))
}
