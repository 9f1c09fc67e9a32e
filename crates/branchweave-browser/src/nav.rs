//! Floating navigation panel.
//!
//! Shows a "↓" dot that scrolls to the bottom of the page, followed by one
//! numbered dot per branch start in render order.

use branchweave_core::BranchError;
use gloo_events::EventListener;
use web_sys::{Document, Element, ScrollBehavior, ScrollIntoViewOptions, ScrollToOptions};

/// Id of the panel element.
pub const NAV_ID: &str = "wb-nav-panel";
/// Class of each dot.
pub const DOT_CLASS: &str = "wb-nav-dot";

fn dom_err(e: wasm_bindgen::JsValue) -> BranchError {
    BranchError::Dom(format!("{:?}", e))
}

/// Navigation panel state.
///
/// Keeps the dot listeners alive and remembers which starts the panel was
/// built for, so an unchanged set of starts doesn't touch the DOM (which
/// would otherwise retrigger the change watcher).
#[derive(Default)]
pub struct NavPanel {
    targets: Vec<Element>,
    listeners: Vec<EventListener>,
}

impl NavPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the panel for `starts` if they changed or the panel is gone.
    ///
    /// Returns `true` if the DOM was rebuilt.
    pub fn update(&mut self, document: &Document, starts: &[Element]) -> Result<bool, BranchError> {
        let existing = document.get_element_by_id(NAV_ID);
        if existing.is_some() && self.targets == starts {
            return Ok(false);
        }

        let panel = match existing {
            Some(panel) => panel,
            None => {
                let panel = document.create_element("div").map_err(dom_err)?;
                panel.set_id(NAV_ID);
                let body = document.body().ok_or(BranchError::NoDocument)?;
                body.append_child(&panel).map_err(dom_err)?;
                panel
            }
        };
        panel.set_inner_html("");

        let mut listeners = Vec::with_capacity(starts.len() + 1);

        let bottom = make_dot(document, "↓")?;
        let doc = document.clone();
        listeners.push(EventListener::new(&bottom, "click", move |_| {
            scroll_to_bottom(&doc);
        }));
        panel.append_child(&bottom).map_err(dom_err)?;

        for (i, target) in starts.iter().enumerate() {
            let dot = make_dot(document, &(i + 1).to_string())?;
            let target = target.clone();
            listeners.push(EventListener::new(&dot, "click", move |_| {
                let opts = ScrollIntoViewOptions::new();
                opts.set_behavior(ScrollBehavior::Smooth);
                target.scroll_into_view_with_scroll_into_view_options(&opts);
            }));
            panel.append_child(&dot).map_err(dom_err)?;
        }

        // Old listeners belong to dots that were just removed.
        self.listeners = listeners;
        self.targets = starts.to_vec();
        tracing::debug!(dots = starts.len(), "rebuilt navigation panel");
        Ok(true)
    }
}

fn make_dot(document: &Document, text: &str) -> Result<Element, BranchError> {
    let dot = document.create_element("div").map_err(dom_err)?;
    dot.set_class_name(DOT_CLASS);
    dot.set_text_content(Some(text));
    Ok(dot)
}

fn scroll_to_bottom(document: &Document) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(body) = document.body() else {
        return;
    };
    let opts = ScrollToOptions::new();
    opts.set_top(body.scroll_height() as f64);
    opts.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&opts);
}
