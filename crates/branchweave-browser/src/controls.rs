//! Per-message controls: branch buttons, hover expansion, code collapsing.
//!
//! Everything here is injected at most once per element, guarded by the
//! `data-wb-injected` attribute, so it is safe to call on every pass.
//! Listeners are held in a `ListenerRegistry` keyed by their message and
//! dropped once the message leaves the document.

use std::cell::RefCell;
use std::rc::Rc;

use branchweave_core::{BranchError, MessageId, SiteSelectors};
use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use web_sys::{Document, Element};

use crate::dom::{DomMessage, INJECTED_ATTR};

/// Class of the button group container.
pub const GROUP_CLASS: &str = "wb-branch-group";
/// Class of each branch button.
pub const BUTTON_CLASS: &str = "wb-branch-btn";
/// Class added to a message while hovered long enough.
pub const EXPANDED_CLASS: &str = "wb-expanded";
/// Class toggled on collapsed code blocks.
pub const CODE_MINIMIZED_CLASS: &str = "wb-code-minimized";

/// A branch button action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchAction {
    Start,
    End,
    Remove,
}

impl BranchAction {
    /// Buttons in display order.
    pub const ALL: [BranchAction; 3] = [BranchAction::Start, BranchAction::End, BranchAction::Remove];

    pub fn label(&self) -> &'static str {
        match self {
            BranchAction::Start => "S",
            BranchAction::End => "E",
            BranchAction::Remove => "R",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BranchAction::Start => "start",
            BranchAction::End => "end",
            BranchAction::Remove => "remove",
        }
    }
}

/// Callback invoked when a branch button is clicked.
pub type ActionHandler = Rc<dyn Fn(BranchAction, MessageId)>;

/// Event listeners owned by injected messages.
#[derive(Default)]
pub struct ListenerRegistry {
    entries: Vec<(Element, EventListener)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `listener` alive while `owner` stays in the document.
    pub fn track(&mut self, owner: &Element, listener: EventListener) {
        self.entries.push((owner.clone(), listener));
    }

    /// Drop listeners of messages the page has removed.
    ///
    /// A removed message loses its injected controls and marker, so if the
    /// page re-attaches it the next pass wires it up again. Returns the
    /// number of listeners dropped.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        let mut detached: Vec<Element> = Vec::new();
        self.entries.retain(|(owner, _)| {
            let connected = owner.is_connected();
            if !connected && !detached.contains(owner) {
                detached.push(owner.clone());
            }
            connected
        });
        for owner in &detached {
            reset_injection(owner);
        }
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn reset_injection(message: &Element) {
    let _ = message.remove_attribute(INJECTED_ATTR);
    let _ = message.class_list().remove_1(EXPANDED_CLASS);
    let selector = format!(".{}, [{}]", GROUP_CLASS, INJECTED_ATTR);
    let Ok(nodes) = message.query_selector_all(&selector) else {
        return;
    };
    for i in 0..nodes.length() {
        let Some(el) = nodes
            .item(i)
            .and_then(|n| wasm_bindgen::JsCast::dyn_into::<Element>(n).ok())
        else {
            continue;
        };
        if el.class_list().contains(GROUP_CLASS) {
            el.remove();
        } else {
            let _ = el.remove_attribute(INJECTED_ATTR);
        }
    }
}

fn dom_err(e: wasm_bindgen::JsValue) -> BranchError {
    BranchError::Dom(format!("{:?}", e))
}

/// Inject branch buttons, hover expansion and code tools into a message.
///
/// Returns `false` if the message was already injected. Messages without
/// an id get hover and code tools but no buttons, since they can't be range
/// endpoints.
pub fn inject_controls(
    message: &DomMessage,
    id: Option<MessageId>,
    selectors: &SiteSelectors,
    hover_delay_ms: u32,
    on_action: &ActionHandler,
    registry: &mut ListenerRegistry,
) -> Result<bool, BranchError> {
    if message.is_injected() {
        return Ok(false);
    }
    let element = message.element();
    let document = element.owner_document().ok_or(BranchError::NoDocument)?;

    setup_hover(element, hover_delay_ms, registry);
    inject_code_tools(element, selectors.code_block, registry)?;

    if let Some(id) = id {
        let group = build_button_group(&document, element, &id, on_action, registry)?;
        let attach_point = selectors
            .action_area
            .and_then(|sel| element.query_selector(sel).ok().flatten());
        match attach_point {
            Some(area) => area.prepend_with_node_1(&group).map_err(dom_err)?,
            None => element.prepend_with_node_1(&group).map_err(dom_err)?,
        }
    }

    element.set_attribute(INJECTED_ATTR, "1").map_err(dom_err)?;
    Ok(true)
}

fn build_button_group(
    document: &Document,
    owner: &Element,
    id: &MessageId,
    on_action: &ActionHandler,
    registry: &mut ListenerRegistry,
) -> Result<Element, BranchError> {
    let group = document.create_element("div").map_err(dom_err)?;
    group.set_class_name(GROUP_CLASS);
    group
        .set_attribute("style", "display: inline-flex; gap: 4px;")
        .map_err(dom_err)?;

    for action in BranchAction::ALL {
        let button = document.create_element("button").map_err(dom_err)?;
        button.set_attribute("type", "button").map_err(dom_err)?;
        button.set_class_name(BUTTON_CLASS);
        button
            .set_attribute("data-wb-action", action.name())
            .map_err(dom_err)?;
        button.set_text_content(Some(action.label()));

        let handler = on_action.clone();
        let id = id.clone();
        let listener = EventListener::new(&button, "click", move |event| {
            event.stop_propagation();
            handler(action, id.clone());
        });
        registry.track(owner, listener);

        group.append_child(&button).map_err(dom_err)?;
    }
    Ok(group)
}

/// Expand the message after hovering for `delay_ms`; collapse on leave.
fn setup_hover(element: &Element, delay_ms: u32, registry: &mut ListenerRegistry) {
    let timer: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));

    let enter_timer = timer.clone();
    let enter_el = element.clone();
    let enter = EventListener::new(element, "mouseenter", move |_| {
        let el = enter_el.clone();
        let timeout = Timeout::new(delay_ms, move || {
            let _ = el.class_list().add_1(EXPANDED_CLASS);
        });
        *enter_timer.borrow_mut() = Some(timeout);
    });

    let leave_el = element.clone();
    let leave = EventListener::new(element, "mouseleave", move |_| {
        // Dropping the timeout cancels a pending expansion.
        timer.borrow_mut().take();
        let _ = leave_el.class_list().remove_1(EXPANDED_CLASS);
    });

    registry.track(element, enter);
    registry.track(element, leave);
}

/// Make every code block in `element` collapsible by clicking it.
///
/// Listeners are tracked under `element`. Returns the number of newly wired
/// blocks.
pub fn inject_code_tools(
    element: &Element,
    code_selector: &str,
    registry: &mut ListenerRegistry,
) -> Result<usize, BranchError> {
    let blocks = element.query_selector_all(code_selector).map_err(dom_err)?;
    let mut wired = 0;
    for i in 0..blocks.length() {
        let Some(block) = blocks
            .item(i)
            .and_then(|n| wasm_bindgen::JsCast::dyn_into::<Element>(n).ok())
        else {
            continue;
        };
        if block.has_attribute(INJECTED_ATTR) {
            continue;
        }

        let target = block.clone();
        let listener = EventListener::new(&block, "click", move |_| {
            let _ = target.class_list().toggle(CODE_MINIMIZED_CLASS);
        });
        registry.track(element, listener);
        block.set_attribute(INJECTED_ATTR, "1").map_err(dom_err)?;
        wired += 1;
    }
    Ok(wired)
}
