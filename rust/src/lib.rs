pub mod card_filter;
pub mod catalog;
pub mod config;
pub mod copy_button;
pub mod prompt_library;
pub mod submit_feedback;

#[cfg(target_arch = "wasm32")]
pub mod browser;

/// Value of the placeholder option that heads the prompt selector.
pub const NO_PROMPT_SELECTED: &str = "";
