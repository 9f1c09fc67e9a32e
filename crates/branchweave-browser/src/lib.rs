//! Browser DOM layer for branchweave.
//!
//! This crate provides the page-side collaborators for the core marker:
//! DOM enumeration, LocalStorage persistence, injected controls and the
//! debounced change watcher. It assumes a `wasm32-unknown-unknown` target
//! environment.
//!
//! # Architecture
//!
//! - `dom`: `MessageSource` over the active site's selectors, `data-wb-role` tagging
//! - `storage`: `PairStore` backed by LocalStorage
//! - `controls`: S/E/R buttons, hover expansion, code block collapsing
//! - `nav`: floating navigation panel for branch starts
//! - `watcher`: MutationObserver with debounce
//! - `controller`: ties the above to a `BranchSession`
//!
//! # Re-exports
//!
//! This crate re-exports `branchweave-core` for convenience, so consumers
//! only need to depend on `branchweave-browser`.

// Re-export core crate
pub use branchweave_core;
pub use branchweave_core::*;

pub mod controller;
pub mod controls;
pub mod dom;
pub mod nav;
pub mod storage;
pub mod watcher;

pub use controller::PageController;
pub use controls::{
    ActionHandler, BranchAction, ListenerRegistry, inject_code_tools, inject_controls,
};
pub use dom::{DomMessage, DomMessageSource, INJECTED_ATTR, PENDING_ATTR, ROLE_ATTR};
pub use nav::NavPanel;
pub use storage::LocalPairStore;
pub use watcher::ChangeWatcher;
