use crate::config::UiConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed,
}

/// What the copy button shows. `background: None` clears the tint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonLook {
    pub label: String,
    pub background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFeedback {
    pub look: ButtonLook,
    pub revert_after_ms: u32,
    pub revert_to: ButtonLook,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyButton {
    resting_label: String,
    copied_label: String,
    failed_label: String,
    success_color: String,
    failure_color: String,
    copied_revert_ms: u32,
    failed_revert_ms: u32,
}

impl CopyButton {
    pub fn from_config(config: &UiConfig) -> Self {
        Self {
            resting_label: config.labels.copy.clone(),
            copied_label: config.labels.copied.clone(),
            failed_label: config.labels.copy_failed.clone(),
            success_color: config.colors.copy_success.clone(),
            failure_color: config.colors.copy_failure.clone(),
            copied_revert_ms: config.timing.copied_revert_ms,
            failed_revert_ms: config.timing.failed_revert_ms,
        }
    }

    pub fn resting(&self) -> ButtonLook {
        ButtonLook {
            label: self.resting_label.clone(),
            background: None,
        }
    }

    pub fn feedback(&self, outcome: CopyOutcome) -> CopyFeedback {
        let (label, color, revert_after_ms) = match outcome {
            CopyOutcome::Copied => (
                &self.copied_label,
                &self.success_color,
                self.copied_revert_ms,
            ),
            CopyOutcome::Failed => (
                &self.failed_label,
                &self.failure_color,
                self.failed_revert_ms,
            ),
        };

        CopyFeedback {
            look: ButtonLook {
                label: label.clone(),
                background: Some(color.clone()),
            },
            revert_after_ms,
            revert_to: self.resting(),
        }
    }
}

/// Prefers the rendered text; falls back to the raw text content when the
/// rendered form is missing or empty.
pub fn copy_source_text(rendered: Option<String>, raw: Option<String>) -> String {
    rendered
        .filter(|text| !text.is_empty())
        .or(raw)
        .unwrap_or_default()
}
