//! Page controller: wires the session, marking passes and injected UI.
//!
//! The controller is a cheap `Rc` handle. Button and watcher callbacks hold
//! weak references, so dropping the last handle tears everything down.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use branchweave_core::{
    BranchConfig, BranchError, BranchSession, IdentityIndex, InteractionError, MessageId,
    MessageSource, PairStore, PassReport, RangePair, run_pass,
};
use gloo_timers::callback::Timeout;
use web_sys::Element;

use crate::controls::{
    ActionHandler, BranchAction, ListenerRegistry, inject_code_tools, inject_controls,
};
use crate::dom::DomMessageSource;
use crate::nav::NavPanel;
use crate::watcher::ChangeWatcher;

/// Id of the transient notice element.
pub const NOTICE_ID: &str = "wb-notice";

struct ControllerState<S> {
    session: BranchSession<S>,
    source: DomMessageSource,
    config: BranchConfig,
    nav: NavPanel,
    listeners: ListenerRegistry,
    notice: Option<Timeout>,
}

/// Drives branch marking for one page.
pub struct PageController<S: PairStore + 'static> {
    inner: Rc<RefCell<ControllerState<S>>>,
}

impl<S: PairStore + 'static> Clone for PageController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: PairStore + 'static> PageController<S> {
    pub fn new(source: DomMessageSource, store: S, config: BranchConfig) -> Self {
        let session = BranchSession::with_config(store, &config);
        Self {
            inner: Rc::new(RefCell::new(ControllerState {
                session,
                source,
                config,
                nav: NavPanel::new(),
                listeners: ListenerRegistry::new(),
                notice: None,
            })),
        }
    }

    fn downgrade(&self) -> Weak<RefCell<ControllerState<S>>> {
        Rc::downgrade(&self.inner)
    }

    fn from_weak(weak: &Weak<RefCell<ControllerState<S>>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Inject controls into new messages, then run a marking pass.
    pub fn refresh(&self) -> PassReport {
        self.inject_ui();
        self.apply()
    }

    fn inject_ui(&self) {
        let weak = self.downgrade();
        let on_action: ActionHandler = Rc::new(move |action: BranchAction, id: MessageId| {
            if let Some(controller) = Self::from_weak(&weak) {
                // Rejections are already logged and shown as a notice.
                let _ = controller.dispatch(action, &id);
            }
        });

        let mut guard = self.inner.borrow_mut();
        let state = &mut *guard;

        let dropped = state.listeners.prune();
        if dropped > 0 {
            tracing::debug!(dropped, "released listeners of removed messages");
        }

        let selectors = state.source.site().selectors();
        let messages = state.source.enumerate_messages();
        tracing::debug!(count = messages.len(), "injecting controls");

        for message in &messages {
            let id = state.source.identity_of(message);
            let result = if message.is_injected() {
                // Code blocks can stream in after the message first appears.
                inject_code_tools(message.element(), selectors.code_block, &mut state.listeners)
                    .map(|_| false)
            } else {
                inject_controls(
                    message,
                    id,
                    selectors,
                    state.config.hover_delay_ms,
                    &on_action,
                    &mut state.listeners,
                )
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "failed to inject controls");
            }
        }
    }

    /// Run a marking pass and update the pending marker and navigation.
    pub fn apply(&self) -> PassReport {
        let mut guard = self.inner.borrow_mut();
        let state = &mut *guard;

        let (messages, report) = run_pass(&state.source, state.session.store());

        let pending = state.session.pending().cloned();
        for message in &messages {
            let is_pending =
                pending.is_some() && state.source.identity_of(message) == pending;
            if message.is_pending() != is_pending {
                message.set_pending(is_pending);
            }
        }

        let starts: Vec<Element> = report
            .starts
            .iter()
            .filter_map(|&i| messages.get(i))
            .map(|m| m.element().clone())
            .collect();
        if let Err(e) = state.nav.update(state.source.document(), &starts) {
            tracing::warn!(error = %e, "failed to update navigation panel");
        }

        report
    }

    /// Handle a branch button press for message `id`.
    ///
    /// Re-marks the page afterwards. A rejected action shows a notice and
    /// leaves the session unchanged.
    pub fn dispatch(&self, action: BranchAction, id: &str) -> Result<(), InteractionError> {
        let result = {
            let mut guard = self.inner.borrow_mut();
            let state = &mut *guard;
            let index = current_index(&state.source);
            tracing::debug!(action = action.name(), id, "branch action");

            match action {
                BranchAction::Start => state.session.mark_start(id),
                BranchAction::End => state.session.mark_end(id, &index).map(|pair| {
                    tracing::info!(start = %pair.start_id, end = %pair.end_id, "branch created");
                }),
                BranchAction::Remove => {
                    let outcome = state.session.remove(id, &index);
                    if outcome.save_failed {
                        Err(InteractionError::NotSaved)
                    } else {
                        if !outcome.changed() {
                            tracing::info!(id, "remove: no matching pair found");
                        }
                        Ok(())
                    }
                }
            }
        };

        if let Err(e) = &result {
            tracing::info!(action = action.name(), id, "rejected: {}", e);
            self.show_notice(&e.to_string());
        }
        self.apply();
        result
    }

    /// Pairs currently in the store.
    pub fn pairs(&self) -> Vec<RangePair> {
        self.inner.borrow().session.load_pairs()
    }

    /// Pending start id, if any.
    pub fn pending(&self) -> Option<MessageId> {
        self.inner.borrow().session.pending().cloned()
    }

    /// Event listeners currently held for injected messages.
    pub fn tracked_listeners(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn config(&self) -> BranchConfig {
        self.inner.borrow().config.clone()
    }

    /// Show a transient notice to the user.
    pub fn show_notice(&self, text: &str) {
        let mut state = self.inner.borrow_mut();
        let document = state.source.document().clone();

        let notice = match document.get_element_by_id(NOTICE_ID) {
            Some(el) => el,
            None => {
                let Ok(el) = document.create_element("div") else {
                    return;
                };
                el.set_id(NOTICE_ID);
                let _ = el.set_attribute("role", "status");
                let Some(body) = document.body() else {
                    return;
                };
                if body.append_child(&el).is_err() {
                    return;
                }
                el
            }
        };
        notice.set_text_content(Some(text));

        let el = notice.clone();
        let notice_ms = state.config.notice_ms;
        // Replacing the previous timeout cancels it.
        state.notice = Some(Timeout::new(notice_ms, move || {
            el.remove();
        }));
    }

    /// Start re-marking the page whenever its content settles.
    pub fn watch(&self) -> Result<ChangeWatcher, BranchError> {
        let state = self.inner.borrow();
        let body = state
            .source
            .document()
            .body()
            .ok_or(BranchError::NoDocument)?;
        let weak = self.downgrade();
        ChangeWatcher::observe(&body, state.config.settle_delay_ms, move || {
            if let Some(controller) = Self::from_weak(&weak) {
                let report = controller.refresh();
                tracing::debug!(
                    messages = report.message_count,
                    tagged = report.summary.tagged_count,
                    "refreshed after page change"
                );
            }
        })
    }
}

/// Identity index over the page as it is right now.
fn current_index(source: &DomMessageSource) -> IdentityIndex {
    let messages = source.enumerate_messages();
    let ids: Vec<_> = messages.iter().map(|m| source.identity_of(m)).collect();
    IdentityIndex::build(ids.iter().map(|id| id.as_deref()))
}
