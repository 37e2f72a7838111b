//! Browser host for the feature page.
//!
//! Each feature looks up its own targets once, at mount time, and stays
//! inert when any of them is missing. Handlers read the current DOM
//! values, ask the core module what to do, and write the answer back.
//! Every subscription and running timer is owned by [`FeaturePage`], so
//! tearing the page down removes them explicitly.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;
use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlButtonElement, HtmlElement, HtmlInputElement,
    HtmlOptionElement, HtmlSelectElement, HtmlTextAreaElement, NodeList,
};

use crate::card_filter::{filter_cards, CardText};
use crate::catalog::PromptCatalog;
use crate::config::UiConfig;
use crate::copy_button::{copy_source_text, ButtonLook, CopyButton, CopyOutcome};
use crate::prompt_library::{first_present_id, PromptLibrary, PromptSelectSnapshot, SelectOption};
use crate::submit_feedback::{LoadingSession, SubmitPlan, SubmitTargets};

/// Window property the host page fills with the prompt catalog.
pub const CATALOG_GLOBAL: &str = "promptData";
/// Optional `<script type="application/toml">` element with config overrides.
pub const CONFIG_ELEMENT_ID: &str = "feature-ui-config";

thread_local! {
    static MOUNTED: RefCell<Option<FeaturePage>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    if document.ready_state() == "loading" {
        let on_ready = Closure::wrap(Box::new(move |_: Event| mount()) as Box<dyn FnMut(Event)>);
        if let Err(err) = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())
        {
            log::error!("failed to wait for DOMContentLoaded: {}", js_error_text(&err));
        }
        on_ready.forget();
    } else {
        mount();
    }

    // Pages restored from the back/forward cache get their handlers back.
    let on_pageshow = Closure::wrap(Box::new(move |_: Event| {
        if !is_mounted() {
            mount();
        }
    }) as Box<dyn FnMut(Event)>);
    let on_pagehide = Closure::wrap(Box::new(move |_: Event| teardown()) as Box<dyn FnMut(Event)>);
    for (event, callback) in [("pageshow", &on_pageshow), ("pagehide", &on_pagehide)] {
        if let Err(err) =
            window.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        {
            log::error!("failed to subscribe to {event}: {}", js_error_text(&err));
        }
    }
    on_pageshow.forget();
    on_pagehide.forget();
}

/// Attaches every feature the current document supports, replacing any
/// previously mounted page.
#[wasm_bindgen]
pub fn mount() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    let config = load_config(&document);
    let catalog = read_catalog();
    let page = FeaturePage::attach(&document, config, catalog);

    let previous = MOUNTED.with(|slot| slot.borrow_mut().replace(page));
    drop(previous);
}

#[wasm_bindgen]
pub fn teardown() {
    let page = MOUNTED.with(|slot| slot.borrow_mut().take());
    if let Some(page) = page {
        page.teardown();
    }
}

fn is_mounted() -> bool {
    MOUNTED.with(|slot| slot.borrow().is_some())
}

fn load_config(document: &Document) -> UiConfig {
    let config = UiConfig::embedded();
    let Some(text) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return config;
    };

    match config.merged_with_toml(&text) {
        Ok(merged) => merged,
        Err(err) => {
            log::error!("ignoring #{CONFIG_ELEMENT_ID}: {err:#}");
            config
        }
    }
}

fn read_catalog() -> PromptCatalog {
    let Some(window) = web_sys::window() else {
        return PromptCatalog::default();
    };
    match js_sys::Reflect::get(&window, &JsValue::from_str(CATALOG_GLOBAL)) {
        Ok(value) => catalog_from_js(&value),
        Err(_) => PromptCatalog::default(),
    }
}

/// Converts the host-supplied catalog value. `undefined`, `null` and
/// values of the wrong shape all yield the empty catalog.
pub fn catalog_from_js(value: &JsValue) -> PromptCatalog {
    if value.is_undefined() || value.is_null() {
        return PromptCatalog::default();
    }

    let parsed = serde_wasm_bindgen::from_value::<serde_json::Value>(value.clone())
        .map_err(|err| anyhow!("{err}"))
        .and_then(|doc| PromptCatalog::from_json_value(&doc));
    match parsed {
        Ok(catalog) => catalog,
        Err(err) => {
            log::warn!("ignoring window.{CATALOG_GLOBAL}: {err:#}");
            PromptCatalog::default()
        }
    }
}

/// Everything one page view subscribed. Dropping it unsubscribes every
/// handler and cancels running timers.
pub struct FeaturePage {
    listeners: Vec<Listener>,
    timers: TimerRegistry,
}

impl FeaturePage {
    pub fn attach(document: &Document, config: UiConfig, catalog: PromptCatalog) -> Self {
        let config = Rc::new(config);
        let timers = TimerRegistry::default();

        let mut listeners = attach_submit_feedback(document, &config, &timers);
        listeners.extend(attach_copy_button(document, &config));
        listeners.extend(attach_card_filter(document, &config));
        listeners.extend(attach_prompt_library(document, &config, catalog));

        Self { listeners, timers }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn running_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn teardown(self) {
        drop(self);
    }
}

impl Drop for FeaturePage {
    fn drop(&mut self) {
        let listeners = self.listeners.len();
        self.listeners.clear();
        let timers = self.timers.cancel_all();
        log::debug!("feature page torn down ({listeners} listeners, {timers} timers)");
    }
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach<F>(target: &EventTarget, event: &'static str, handler: F) -> Option<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        match target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
            Ok(()) => Some(Self {
                target: target.clone(),
                event,
                callback,
            }),
            Err(err) => {
                log::error!("failed to subscribe to {event}: {}", js_error_text(&err));
                None
            }
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

struct RunningTimer {
    session: Rc<RefCell<LoadingSession>>,
    _interval: Interval,
}

#[derive(Clone, Default)]
struct TimerRegistry(Rc<RefCell<Vec<RunningTimer>>>);

impl TimerRegistry {
    fn track(&self, session: Rc<RefCell<LoadingSession>>, interval: Interval) {
        self.0.borrow_mut().push(RunningTimer {
            session,
            _interval: interval,
        });
    }

    fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Stops every session; the intervals are cleared as they drop.
    fn cancel_all(&self) -> usize {
        let running: Vec<RunningTimer> = self.0.borrow_mut().drain(..).collect();
        for timer in &running {
            timer.session.borrow_mut().stop();
        }
        running.len()
    }
}

fn attach_submit_feedback(
    document: &Document,
    config: &Rc<UiConfig>,
    timers: &TimerRegistry,
) -> Vec<Listener> {
    let forms: Vec<Element> = match document.query_selector_all(&config.selectors.feature_form) {
        Ok(nodes) => elements(&nodes),
        Err(err) => {
            log::warn!("invalid feature form selector: {}", js_error_text(&err));
            return Vec::new();
        }
    };

    let listeners: Vec<Listener> = forms
        .into_iter()
        .filter_map(|form| {
            let config = Rc::clone(config);
            let timers = timers.clone();
            let submitted = form.clone();
            Listener::attach(&form, "submit", move |_| {
                on_feature_submit(&submitted, &config, &timers)
            })
        })
        .collect();

    if !listeners.is_empty() {
        log::info!("submission feedback attached to {} form(s)", listeners.len());
    }
    listeners
}

fn on_feature_submit(form: &Element, config: &UiConfig, timers: &TimerRegistry) {
    let selectors = &config.selectors;
    let container = form.closest(&selectors.feature_page).ok().flatten();
    let indicator = container
        .as_ref()
        .and_then(|c| first_match(c, &selectors.loading_indicator));
    let timer = indicator
        .as_ref()
        .and_then(|i| first_match(i, &selectors.timer));
    let submit = first_match(form, &selectors.submit_button);

    let plan = SubmitPlan::for_targets(
        SubmitTargets {
            container: container.is_some(),
            indicator: indicator.is_some(),
            timer: timer.is_some(),
            submit_control: submit.is_some(),
        },
        &config.labels.busy,
    );
    if plan.is_noop() {
        return;
    }

    if let (true, Some(indicator)) = (plan.show_indicator, &indicator) {
        if let Err(err) = indicator
            .class_list()
            .add_1(&selectors.indicator_visible_class)
        {
            log::warn!("failed to show loading indicator: {}", js_error_text(&err));
        }
    }

    if let (Some(session), Some(timer)) = (plan.session, timer) {
        timer.set_text_content(Some(&session.label()));
        let session = Rc::new(RefCell::new(session));
        let ticking = Rc::clone(&session);
        let interval = Interval::new(config.timing.tick_ms, move || {
            let label = ticking.borrow_mut().tick();
            if let Some(label) = label {
                timer.set_text_content(Some(&label));
            }
        });
        timers.track(session, interval);
    }

    if let (Some(label), Some(submit)) = (plan.submit_label, submit) {
        match submit.dyn_ref::<HtmlButtonElement>() {
            Some(button) => button.set_disabled(true),
            None => {
                let _ = submit.set_attribute("disabled", "");
            }
        }
        submit.set_text_content(Some(&label));
    }

    log::debug!("feature form submitted");
}

fn attach_copy_button(document: &Document, config: &Rc<UiConfig>) -> Option<Listener> {
    let button = document
        .get_element_by_id(&config.selectors.copy_button)?
        .dyn_into::<HtmlElement>()
        .ok()?;
    let source = document.get_element_by_id(&config.selectors.response_text)?;
    let copy = Rc::new(CopyButton::from_config(config));

    let clicked = button.clone();
    let listener = Listener::attach(&button, "click", move |_| {
        let text = copy_source_text(
            source.dyn_ref::<HtmlElement>().map(HtmlElement::inner_text),
            source.text_content(),
        );
        let button = clicked.clone();
        let copy = Rc::clone(&copy);

        wasm_bindgen_futures::spawn_local(async move {
            let outcome = match write_clipboard(&text).await {
                Ok(()) => CopyOutcome::Copied,
                Err(err) => {
                    log::error!("failed to copy text: {err}");
                    CopyOutcome::Failed
                }
            };

            let feedback = copy.feedback(outcome);
            paint_button(&button, &feedback.look);
            let revert_to = feedback.revert_to;
            Timeout::new(feedback.revert_after_ms, move || {
                paint_button(&button, &revert_to)
            })
            .forget();
        });
    })?;

    log::info!("copy button attached");
    Some(listener)
}

async fn write_clipboard(text: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
    let navigator = window.navigator();

    // Insecure contexts expose no `navigator.clipboard` at all.
    let available = js_sys::Reflect::get(&navigator, &JsValue::from_str("clipboard"))
        .map(|value| !value.is_undefined() && !value.is_null())
        .unwrap_or(false);
    if !available {
        return Err("clipboard API unavailable".to_string());
    }

    JsFuture::from(navigator.clipboard().write_text(text))
        .await
        .map(|_| ())
        .map_err(|err| js_error_text(&err))
}

fn paint_button(button: &HtmlElement, look: &ButtonLook) {
    button.set_text_content(Some(&look.label));
    set_style(button, "background-color", look.background.as_deref());
}

fn attach_card_filter(document: &Document, config: &Rc<UiConfig>) -> Option<Listener> {
    let selectors = &config.selectors;
    let input = document
        .get_element_by_id(&selectors.search_input)?
        .dyn_into::<HtmlInputElement>()
        .ok()?;
    let grid = document.query_selector(&selectors.card_grid).ok().flatten()?;
    let notice = document
        .get_element_by_id(&selectors.no_results)?
        .dyn_into::<HtmlElement>()
        .ok()?;
    let cards: Vec<HtmlElement> = elements(&grid.query_selector_all(&selectors.card).ok()?);
    let card_count = cards.len();

    let config = Rc::clone(config);
    let typed = input.clone();
    let listener = Listener::attach(&input, "input", move |_| {
        let texts: Vec<CardText> = cards
            .iter()
            .map(|card| CardText {
                title: child_text(card, &config.selectors.card_title),
                description: child_text(card, &config.selectors.card_description),
            })
            .collect();

        let snapshot = filter_cards(&typed.value(), &texts);
        for (card, visible) in cards.iter().zip(&snapshot.visible) {
            set_style(card, "display", (!visible).then_some("none"));
        }
        let notice_display = if snapshot.show_no_results { "block" } else { "none" };
        set_style(&notice, "display", Some(notice_display));
    })?;

    log::info!("card filter attached to {card_count} card(s)");
    Some(listener)
}

fn child_text(card: &Element, selector: &str) -> Option<String> {
    first_match(card, selector).and_then(|el| el.text_content())
}

fn attach_prompt_library(
    document: &Document,
    config: &Rc<UiConfig>,
    catalog: PromptCatalog,
) -> Vec<Listener> {
    let selectors = &config.selectors;
    let category_select = select_by_id(document, &selectors.category_select);
    let prompt_select = select_by_id(document, &selectors.prompt_select);
    let text_area = first_present_id(&selectors.text_area_ids, |id| {
        document
            .get_element_by_id(id)
            .and_then(PromptTarget::from_element)
            .is_some()
    })
    .and_then(|id| document.get_element_by_id(id))
    .and_then(PromptTarget::from_element);

    let (Some(category_select), Some(prompt_select), Some(text_area)) =
        (category_select, prompt_select, text_area)
    else {
        return Vec::new();
    };
    let Some(mut library) = PromptLibrary::from_config(catalog, config) else {
        return Vec::new();
    };

    replace_options(&category_select, &library.category_options());
    let initial = library.select_category(&category_select.value());
    apply_prompt_options(&prompt_select, &initial);
    if let Err(err) = category_select.dataset().set("populated", "true") {
        log::debug!("failed to mark category select: {}", js_error_text(&err));
    }
    log::info!(
        "prompt library attached with {} categories",
        library.catalog().len()
    );

    let library = Rc::new(RefCell::new(library));
    let mut listeners = Vec::with_capacity(2);

    {
        let library = Rc::clone(&library);
        let categories = category_select.clone();
        let prompts = prompt_select.clone();
        listeners.extend(Listener::attach(&category_select, "change", move |_| {
            let snapshot = library.borrow_mut().select_category(&categories.value());
            apply_prompt_options(&prompts, &snapshot);
        }));
    }

    let prompts = prompt_select.clone();
    listeners.extend(Listener::attach(&prompt_select, "change", move |_| {
        let injection = library.borrow_mut().select_prompt(&prompts.value());
        let Some(injection) = injection else {
            return;
        };

        text_area.set_value(&injection.text);
        if injection.focus {
            if let Err(err) = text_area.focus() {
                log::debug!("failed to focus prompt text area: {}", js_error_text(&err));
            }
        }
    }));

    listeners
}

/// Injection target: a `<textarea>` or a text `<input>`.
enum PromptTarget {
    Area(HtmlTextAreaElement),
    Input(HtmlInputElement),
}

impl PromptTarget {
    fn from_element(element: Element) -> Option<Self> {
        match element.dyn_into::<HtmlTextAreaElement>() {
            Ok(area) => Some(Self::Area(area)),
            Err(element) => element.dyn_into::<HtmlInputElement>().ok().map(Self::Input),
        }
    }

    fn set_value(&self, text: &str) {
        match self {
            Self::Area(area) => area.set_value(text),
            Self::Input(input) => input.set_value(text),
        }
    }

    fn focus(&self) -> Result<(), JsValue> {
        match self {
            Self::Area(area) => area.focus(),
            Self::Input(input) => input.focus(),
        }
    }
}

fn apply_prompt_options(select: &HtmlSelectElement, snapshot: &PromptSelectSnapshot) {
    replace_options(select, &snapshot.options);
    select.set_disabled(!snapshot.enabled);
}

fn select_by_id(document: &Document, id: &str) -> Option<HtmlSelectElement> {
    document
        .get_element_by_id(id)?
        .dyn_into::<HtmlSelectElement>()
        .ok()
}

fn replace_options(select: &HtmlSelectElement, options: &[SelectOption]) {
    select.set_length(0);
    for option in options {
        let element = match HtmlOptionElement::new_with_text_and_value(&option.label, &option.value)
        {
            Ok(element) => element,
            Err(err) => {
                log::warn!("failed to build option {:?}: {}", option.label, js_error_text(&err));
                continue;
            }
        };
        if let Err(err) = select.add_with_html_option_element(&element) {
            log::warn!("failed to add option {:?}: {}", option.label, js_error_text(&err));
        }
    }
}

fn first_match(scope: &Element, selector: &str) -> Option<Element> {
    scope.query_selector(selector).ok().flatten()
}

fn elements<T: JsCast>(nodes: &NodeList) -> Vec<T> {
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

/// `None` removes the inline property so the stylesheet value applies.
fn set_style(element: &HtmlElement, property: &str, value: Option<&str>) {
    let style = element.style();
    let result = match value {
        Some(value) => style.set_property(property, value),
        None => style.remove_property(property).map(|_| ()),
    };
    if let Err(err) = result {
        log::debug!("failed to set {property}: {}", js_error_text(&err));
    }
}

fn js_error_text(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}
