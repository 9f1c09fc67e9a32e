//! Debounced page change notifications.
//!
//! Chat pages stream responses in many small DOM updates. `ChangeWatcher`
//! coalesces each burst into a single callback once the page has been quiet
//! for the settle delay.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use branchweave_core::BranchError;
use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use web_sys::{MutationObserver, MutationObserverInit, Node};

/// Watches a subtree and calls back after mutations settle.
///
/// Dropping the watcher disconnects the observer and cancels any pending
/// callback.
pub struct ChangeWatcher {
    observer: MutationObserver,
    pending: Rc<RefCell<Option<Timeout>>>,
    scheduled: Rc<Cell<bool>>,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl ChangeWatcher {
    /// Observe `target` (child list, whole subtree).
    ///
    /// Every mutation restarts a `settle_ms` timer; `on_settle` runs when it
    /// fires.
    pub fn observe(
        target: &Node,
        settle_ms: u32,
        on_settle: impl Fn() + 'static,
    ) -> Result<Self, BranchError> {
        let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
        let scheduled = Rc::new(Cell::new(false));
        let on_settle: Rc<dyn Fn()> = Rc::new(on_settle);

        let pending_cb = pending.clone();
        let scheduled_cb = scheduled.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |_records: js_sys::Array, _observer: MutationObserver| {
                let on_settle = on_settle.clone();
                let scheduled_inner = scheduled_cb.clone();
                scheduled_cb.set(true);
                // The fired timeout stays in `pending` until the next burst
                // replaces it; it can't be dropped from inside its own callback.
                let timeout = Timeout::new(settle_ms, move || {
                    scheduled_inner.set(false);
                    on_settle();
                });
                // Replacing the old timeout drops (and cancels) it.
                *pending_cb.borrow_mut() = Some(timeout);
            },
        );

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| BranchError::Dom(format!("{:?}", e)))?;

        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(target, &init)
            .map_err(|e| BranchError::Dom(format!("{:?}", e)))?;

        Ok(Self {
            observer,
            pending,
            scheduled,
            _callback: callback,
        })
    }

    /// Whether a settle callback is scheduled.
    pub fn is_pending(&self) -> bool {
        self.scheduled.get()
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
        self.pending.borrow_mut().take();
        self.scheduled.set(false);
    }
}
