//! Browser wiring tests
//!
//! Runs with `wasm-pack test --headless --chrome` (or firefox).

#![cfg(target_arch = "wasm32")]

use feature_page_ui::browser::{catalog_from_js, FeaturePage};
use feature_page_ui::catalog::{PromptCatalog, PromptEntry};
use feature_page_ui::config::UiConfig;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, Navigator,
};

wasm_bindgen_test_configure!(run_in_browser);

// ============================================================================
// Helpers
// ============================================================================

/// Markup mounted under `<body>` for one test, removed on drop.
struct Fixture {
    root: Element,
}

impl Fixture {
    fn new(html: &str) -> Self {
        let document = document();
        let root = document.create_element("div").expect("create root");
        root.set_inner_html(html);
        document
            .body()
            .expect("body")
            .append_child(&root)
            .expect("mount fixture");
        Self { root }
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        self.root.remove();
    }
}

fn document() -> Document {
    web_sys::window()
        .expect("window")
        .document()
        .expect("document")
}

fn by_id<T: JsCast>(id: &str) -> T {
    document()
        .get_element_by_id(id)
        .unwrap_or_else(|| panic!("missing #{id}"))
        .dyn_into::<T>()
        .unwrap_or_else(|_| panic!("#{id} has the wrong element type"))
}

fn fire(target: &Element, event: &str) {
    let event = Event::new(event).expect("create event");
    target.dispatch_event(&event).expect("dispatch event");
}

fn display_of(element: &HtmlElement) -> String {
    element
        .style()
        .get_property_value("display")
        .expect("read display")
}

fn active_id() -> Option<String> {
    document().active_element().map(|el| el.id())
}

fn option_labels(select: &HtmlSelectElement) -> Vec<String> {
    (0..select.length())
        .filter_map(|i| select.item(i))
        .filter_map(|el| el.text_content())
        .collect()
}

/// Replaces `navigator.clipboard` with an object whose `writeText` runs
/// `body`; the original getter is visible again on drop.
struct ClipboardStub {
    navigator: Navigator,
}

impl ClipboardStub {
    fn install(body: &str) -> Self {
        let navigator = web_sys::window().expect("window").navigator();
        let clipboard = Object::new();
        Reflect::set(
            &clipboard,
            &JsValue::from_str("writeText"),
            &Function::new_with_args("text", body),
        )
        .expect("set writeText");

        let descriptor = Object::new();
        Reflect::set(&descriptor, &JsValue::from_str("value"), &clipboard).expect("value");
        Reflect::set(&descriptor, &JsValue::from_str("configurable"), &JsValue::TRUE)
            .expect("configurable");
        Object::define_property(&navigator, &JsValue::from_str("clipboard"), &descriptor);

        Self { navigator }
    }
}

impl Drop for ClipboardStub {
    fn drop(&mut self) {
        let _ = Reflect::delete_property(&self.navigator, &JsValue::from_str("clipboard"));
    }
}

fn writing_catalog() -> PromptCatalog {
    PromptCatalog::from_entries([
        (
            "Writing",
            vec![PromptEntry::new(
                "Blog Intro",
                "Write an engaging introduction about {topic}.",
            )],
        ),
        (
            "Summarization",
            vec![
                PromptEntry::new("Summarize key points", "Summarize:"),
                PromptEntry::new("Extract action items", "Extract:"),
            ],
        ),
        ("Drafts", Vec::new()),
    ])
}

const CARD_GRID: &str = r#"
<input id="feature-search-input" type="text">
<div class="feature-grid">
  <div class="feature-card"><h3>Text Generation</h3><p>Chat using plain text.</p></div>
  <div class="feature-card"><h3>PDF Analysis</h3><p>Ask questions about a PDF.</p></div>
  <div class="feature-card"><h3>Image Generation</h3></div>
</div>
<div id="no-results-message" style="display: none">No features match.</div>
"#;

const PROMPT_LIBRARY: &str = r#"
<select id="prompt-category-select"></select>
<select id="prompt-select" disabled>
  <option value="">-- Select Prompt Title --</option>
</select>
<textarea id="prompt_image">my own draft</textarea>
"#;

const FEATURE_FORM: &str = r#"
<div class="feature-page">
  <form class="feature-form" action="javascript:void(0)">
    <button id="submit-button" type="submit">Generate</button>
  </form>
  <div id="loading" class="loading-indicator">
    Working <span id="timer" class="timer-span"></span>
  </div>
</div>
"#;

// ============================================================================
// Card filter
// ============================================================================

#[wasm_bindgen_test]
fn test_card_filter_hides_non_matching_cards() {
    let fixture = Fixture::new(CARD_GRID);
    let page = FeaturePage::attach(&document(), UiConfig::default(), PromptCatalog::default());

    let input: HtmlInputElement = by_id("feature-search-input");
    let notice: HtmlElement = by_id("no-results-message");
    let cards: Vec<HtmlElement> = {
        let nodes = fixture
            .root
            .query_selector_all(".feature-card")
            .expect("cards");
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|n| n.dyn_into::<HtmlElement>().ok())
            .collect()
    };

    input.set_value("  GENERATION ");
    fire(&input, "input");
    let displays: Vec<String> = cards.iter().map(display_of).collect();
    assert_eq!(displays, vec!["", "none", ""]);
    assert_eq!(display_of(&notice), "none");

    input.set_value("spreadsheet");
    fire(&input, "input");
    assert!(cards.iter().all(|card| display_of(card) == "none"));
    assert_eq!(display_of(&notice), "block");

    input.set_value("");
    fire(&input, "input");
    assert!(cards.iter().all(|card| display_of(card).is_empty()));
    assert_eq!(display_of(&notice), "none");

    page.teardown();
}

#[wasm_bindgen_test]
fn test_card_filter_needs_all_targets() {
    let _fixture = Fixture::new(
        r#"<input id="feature-search-input"><div class="feature-grid"></div>"#,
    );
    let page = FeaturePage::attach(&document(), UiConfig::default(), PromptCatalog::default());
    assert_eq!(page.listener_count(), 0);
}

#[wasm_bindgen_test]
fn test_teardown_unsubscribes_handlers() {
    let fixture = Fixture::new(CARD_GRID);
    let page = FeaturePage::attach(&document(), UiConfig::default(), PromptCatalog::default());
    assert_eq!(page.listener_count(), 1);
    page.teardown();

    let input: HtmlInputElement = by_id("feature-search-input");
    input.set_value("pdf");
    fire(&input, "input");

    let first: HtmlElement = fixture
        .root
        .query_selector(".feature-card")
        .expect("query")
        .expect("card")
        .dyn_into()
        .expect("html element");
    assert_eq!(display_of(&first), "");
}

// ============================================================================
// Prompt library
// ============================================================================

#[wasm_bindgen_test]
fn test_prompt_library_populates_sorted_categories() {
    let _fixture = Fixture::new(PROMPT_LIBRARY);
    let page = FeaturePage::attach(&document(), UiConfig::default(), writing_catalog());
    assert_eq!(page.listener_count(), 2);

    let categories: HtmlSelectElement = by_id("prompt-category-select");
    let prompts: HtmlSelectElement = by_id("prompt-select");
    assert_eq!(
        option_labels(&categories),
        vec!["-- Select Category --", "Drafts", "Summarization", "Writing"]
    );
    assert_eq!(categories.dataset().get("populated").as_deref(), Some("true"));

    assert_eq!(categories.value(), "");
    assert!(prompts.disabled());
    assert_eq!(option_labels(&prompts), vec!["-- Select Prompt Title --"]);
}

#[wasm_bindgen_test]
fn test_prompt_library_first_category_is_selectable() {
    let _fixture = Fixture::new(PROMPT_LIBRARY);
    let catalog = PromptCatalog::from_entries([
        ("Alpha", vec![PromptEntry::new("First", "First text.")]),
        ("Beta", vec![PromptEntry::new("Second", "Second text.")]),
    ]);
    let _page = FeaturePage::attach(&document(), UiConfig::default(), catalog);

    let categories: HtmlSelectElement = by_id("prompt-category-select");
    let prompts: HtmlSelectElement = by_id("prompt-select");
    assert_eq!(categories.value(), "");

    categories.set_value("Alpha");
    fire(&categories, "change");
    assert!(!prompts.disabled());
    assert_eq!(
        option_labels(&prompts),
        vec!["-- Select Prompt Title --", "First"]
    );
}

#[wasm_bindgen_test]
fn test_prompt_library_injects_selected_prompt() {
    let _fixture = Fixture::new(PROMPT_LIBRARY);
    let _page = FeaturePage::attach(&document(), UiConfig::default(), writing_catalog());

    let categories: HtmlSelectElement = by_id("prompt-category-select");
    let prompts: HtmlSelectElement = by_id("prompt-select");
    let text_area: HtmlTextAreaElement = by_id("prompt_image");

    categories.set_value("Summarization");
    fire(&categories, "change");
    assert!(!prompts.disabled());
    assert_eq!(prompts.length(), 3);
    assert_eq!(text_area.value(), "my own draft");

    categories.set_value("Writing");
    fire(&categories, "change");
    assert_eq!(prompts.length(), 2);

    categories.focus().expect("focus categories");
    prompts.set_value("Blog Intro");
    fire(&prompts, "change");
    assert_eq!(
        text_area.value(),
        "Write an engaging introduction about {topic}."
    );
    assert_eq!(active_id().as_deref(), Some("prompt_image"));
}

#[wasm_bindgen_test]
fn test_prompt_library_stale_title_writes_title_without_focus() {
    let _fixture = Fixture::new(PROMPT_LIBRARY);
    let _page = FeaturePage::attach(&document(), UiConfig::default(), writing_catalog());

    let categories: HtmlSelectElement = by_id("prompt-category-select");
    let prompts: HtmlSelectElement = by_id("prompt-select");
    let text_area: HtmlTextAreaElement = by_id("prompt_image");

    categories.set_value("Writing");
    fire(&categories, "change");

    let stale = web_sys::HtmlOptionElement::new_with_text_and_value("Old title", "Old title")
        .expect("option");
    prompts
        .add_with_html_option_element(&stale)
        .expect("add stale option");
    categories.focus().expect("focus categories");
    prompts.set_value("Old title");
    fire(&prompts, "change");

    assert_eq!(text_area.value(), "Old title");
    assert_eq!(active_id().as_deref(), Some("prompt-category-select"));
}

#[wasm_bindgen_test]
fn test_prompt_library_accepts_text_input_target() {
    let _fixture = Fixture::new(
        r#"<select id="prompt-category-select"></select>
           <select id="prompt-select" disabled></select>
           <input id="prompt_text" type="text">"#,
    );
    let page = FeaturePage::attach(&document(), UiConfig::default(), writing_catalog());
    assert_eq!(page.listener_count(), 2);

    let categories: HtmlSelectElement = by_id("prompt-category-select");
    let prompts: HtmlSelectElement = by_id("prompt-select");
    categories.set_value("Writing");
    fire(&categories, "change");
    prompts.set_value("Blog Intro");
    fire(&prompts, "change");

    let input: HtmlInputElement = by_id("prompt_text");
    assert_eq!(input.value(), "Write an engaging introduction about {topic}.");
    assert_eq!(active_id().as_deref(), Some("prompt_text"));
}

#[wasm_bindgen_test]
fn test_prompt_library_disables_empty_category() {
    let _fixture = Fixture::new(PROMPT_LIBRARY);
    let _page = FeaturePage::attach(&document(), UiConfig::default(), writing_catalog());

    let categories: HtmlSelectElement = by_id("prompt-category-select");
    let prompts: HtmlSelectElement = by_id("prompt-select");

    categories.set_value("Writing");
    fire(&categories, "change");
    assert!(!prompts.disabled());

    categories.set_value("Drafts");
    fire(&categories, "change");
    assert!(prompts.disabled());
    assert_eq!(prompts.length(), 1);
    assert_eq!(prompts.value(), "");
}

#[wasm_bindgen_test]
fn test_prompt_library_is_inert_without_catalog() {
    let _fixture = Fixture::new(PROMPT_LIBRARY);
    let page = FeaturePage::attach(&document(), UiConfig::default(), PromptCatalog::default());

    let categories: HtmlSelectElement = by_id("prompt-category-select");
    assert_eq!(page.listener_count(), 0);
    assert_eq!(categories.length(), 0);
}

#[wasm_bindgen_test]
fn test_catalog_from_js_reads_host_value() {
    let value = js_sys::JSON::parse(
        r#"{"Writing": [{"title": "Blog Intro", "prompt_text": "Write about {topic}."}]}"#,
    )
    .expect("parse json");
    let catalog = catalog_from_js(&value);
    assert_eq!(
        catalog.find("Writing", "Blog Intro").map(|e| e.text.as_str()),
        Some("Write about {topic}.")
    );

    assert!(catalog_from_js(&JsValue::UNDEFINED).is_empty());
    assert!(catalog_from_js(&JsValue::from_str("nope")).is_empty());
}

// ============================================================================
// Submission feedback
// ============================================================================

#[wasm_bindgen_test]
fn test_submit_shows_indicator_and_disables_button() {
    let _fixture = Fixture::new(FEATURE_FORM);
    let page = FeaturePage::attach(&document(), UiConfig::default(), PromptCatalog::default());

    let form = document()
        .query_selector("form.feature-form")
        .expect("query")
        .expect("form");
    fire(&form, "submit");

    let loading: HtmlElement = by_id("loading");
    let timer: HtmlElement = by_id("timer");
    let button: HtmlButtonElement = by_id("submit-button");
    assert!(loading.class_list().contains("visible"));
    assert_eq!(timer.text_content().as_deref(), Some("0s"));
    assert!(button.disabled());
    assert_eq!(button.text_content().as_deref(), Some("Generating..."));
    assert_eq!(page.running_timers(), 1);
}

#[wasm_bindgen_test]
fn test_submit_outside_feature_page_is_ignored() {
    let _fixture = Fixture::new(
        r#"<form class="feature-form" action="javascript:void(0)">
             <button id="lonely-submit" type="submit">Go</button>
           </form>"#,
    );
    let page = FeaturePage::attach(&document(), UiConfig::default(), PromptCatalog::default());

    let button: HtmlButtonElement = by_id("lonely-submit");
    let form = document()
        .query_selector("form.feature-form")
        .expect("query")
        .expect("form");
    fire(&form, "submit");

    assert!(!button.disabled());
    assert_eq!(button.text_content().as_deref(), Some("Go"));
    assert_eq!(page.running_timers(), 0);
}

#[wasm_bindgen_test]
async fn test_timer_ticks_until_teardown() {
    let _fixture = Fixture::new(FEATURE_FORM);
    let config = UiConfig::from_toml_str("[timing]\ntick_ms = 100\n").expect("config");
    let page = FeaturePage::attach(&document(), config, PromptCatalog::default());

    let form = document()
        .query_selector("form.feature-form")
        .expect("query")
        .expect("form");
    fire(&form, "submit");

    let timer: HtmlElement = by_id("timer");
    assert_eq!(timer.text_content().as_deref(), Some("0s"));

    // Three ticks land at 100, 200 and 300 ms.
    TimeoutFuture::new(350).await;
    assert_eq!(timer.text_content().as_deref(), Some("3s"));

    page.teardown();
    TimeoutFuture::new(250).await;
    assert_eq!(timer.text_content().as_deref(), Some("3s"));
}

// ============================================================================
// Clipboard copy
// ============================================================================

const COPY_TARGETS: &str = r#"<pre id="response-text">Hello world</pre>
<button id="copy-button">Copy Text</button>"#;

fn copy_config() -> UiConfig {
    UiConfig::from_toml_str("[timing]\ncopied_revert_ms = 100\nfailed_revert_ms = 300\n")
        .expect("config")
}

#[wasm_bindgen_test]
async fn test_copy_button_success_reverts_after_copied_delay() {
    let _fixture = Fixture::new(COPY_TARGETS);
    let _clipboard = ClipboardStub::install(
        "globalThis.__copiedText = text; return Promise.resolve();",
    );
    let page = FeaturePage::attach(&document(), copy_config(), PromptCatalog::default());
    assert_eq!(page.listener_count(), 1);

    let button: HtmlElement = by_id("copy-button");
    button.click();

    TimeoutFuture::new(30).await;
    assert_eq!(button.text_content().as_deref(), Some("Copied!"));
    assert!(!background_of(&button).is_empty());
    let copied = Reflect::get(&js_sys::global(), &JsValue::from_str("__copiedText"))
        .expect("read copied text");
    assert_eq!(copied.as_string().as_deref(), Some("Hello world"));

    TimeoutFuture::new(120).await;
    assert_eq!(button.text_content().as_deref(), Some("Copy Text"));
    assert!(background_of(&button).is_empty());

    let source: HtmlElement = by_id("response-text");
    assert_eq!(source.text_content().as_deref(), Some("Hello world"));
}

#[wasm_bindgen_test]
async fn test_copy_button_failure_holds_longer_then_reverts() {
    let _fixture = Fixture::new(COPY_TARGETS);
    let _clipboard =
        ClipboardStub::install("return Promise.reject(new Error('permission denied'));");
    let _page = FeaturePage::attach(&document(), copy_config(), PromptCatalog::default());

    let button: HtmlElement = by_id("copy-button");
    button.click();

    TimeoutFuture::new(30).await;
    assert_eq!(button.text_content().as_deref(), Some("Copy Failed"));
    assert!(!background_of(&button).is_empty());

    TimeoutFuture::new(120).await;
    assert_eq!(button.text_content().as_deref(), Some("Copy Failed"));

    TimeoutFuture::new(250).await;
    assert_eq!(button.text_content().as_deref(), Some("Copy Text"));
    assert!(background_of(&button).is_empty());
}

fn background_of(element: &HtmlElement) -> String {
    element
        .style()
        .get_property_value("background-color")
        .expect("read background")
}
