//! WASM entry point for the branchweave content script.
//!
//! The extension loads this module into ChatGPT, Claude and Grok pages and
//! calls `startBranchWeave` once the document is ready.

mod content;
mod telemetry;
mod types;

pub use content::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and tracing subscriber.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    telemetry::init();
}
