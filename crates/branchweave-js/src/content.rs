//! JsBranchWeave - the running content script handle for JavaScript.

use wasm_bindgen::prelude::*;

use branchweave_browser::{
    BranchAction, BranchConfig, BranchError, ChangeWatcher, DomMessageSource, LocalPairStore,
    PageController, SiteKind,
};

use crate::types::JsPassReport;

/// Branch marking attached to the current page.
///
/// Dropping the handle (or calling `free()` from JS) stops watching the page.
/// Controls already injected keep working until the page navigates.
#[wasm_bindgen]
pub struct JsBranchWeave {
    controller: PageController<LocalPairStore>,
    site: SiteKind,
    _watcher: ChangeWatcher,
}

/// Attach branch marking to the current page.
///
/// `config` is an optional partial config object; missing fields take their
/// defaults. The site adapter is picked from `location.host` unless the
/// config forces one.
#[wasm_bindgen(js_name = startBranchWeave)]
pub fn start(config: JsValue) -> Result<JsBranchWeave, JsError> {
    let config = parse_config(config)?;
    let window = web_sys::window().ok_or_else(|| to_js_error(BranchError::NoWindow))?;
    let host = window.location().host().unwrap_or_default();
    let site = config.site_for_host(&host);
    tracing::info!(host = %host, site = site.name(), "starting branch marking");

    let source = DomMessageSource::new(site).map_err(to_js_error)?;
    let store = LocalPairStore::new(config.storage_key.clone());
    let controller = PageController::new(source, store, config);

    let report = controller.refresh();
    tracing::debug!(
        messages = report.message_count,
        pairs = report.pair_count,
        "initial pass"
    );
    let watcher = controller.watch().map_err(to_js_error)?;

    Ok(JsBranchWeave {
        controller,
        site,
        _watcher: watcher,
    })
}

fn parse_config(value: JsValue) -> Result<BranchConfig, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(BranchConfig::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| to_js_error(BranchError::Config(e.to_string())))
}

fn to_js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

#[wasm_bindgen]
impl JsBranchWeave {
    /// Choose `id` as the pending branch start.
    ///
    /// Returns `false` if the action was rejected; the page shows a notice.
    #[wasm_bindgen(js_name = markStart)]
    pub fn mark_start(&self, id: &str) -> bool {
        self.controller.dispatch(BranchAction::Start, id).is_ok()
    }

    /// Complete the pending branch at `id`.
    ///
    /// Returns `false` if the action was rejected; the page shows a notice.
    #[wasm_bindgen(js_name = markEnd)]
    pub fn mark_end(&self, id: &str) -> bool {
        self.controller.dispatch(BranchAction::End, id).is_ok()
    }

    /// Remove every branch covering `id`.
    ///
    /// Returns `false` if the removal could not be saved.
    pub fn remove(&self, id: &str) -> bool {
        self.controller.dispatch(BranchAction::Remove, id).is_ok()
    }

    /// Re-inject controls and re-mark the page now.
    pub fn refresh(&self) -> JsPassReport {
        self.controller.refresh().into()
    }

    /// Stored pairs as `[{ startId, endId }]`.
    #[wasm_bindgen(js_name = getPairs)]
    pub fn get_pairs(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.controller.pairs())
            .map_err(|e| JsError::new(&format!("Failed to serialize pairs: {}", e)))
    }

    /// Pending start id, or `undefined`.
    #[wasm_bindgen(js_name = getPending)]
    pub fn get_pending(&self) -> Option<String> {
        self.controller.pending().map(|id| id.to_string())
    }

    /// Active site adapter name.
    #[wasm_bindgen(getter)]
    pub fn site(&self) -> String {
        self.site.name().to_string()
    }

    /// Current config as a plain object.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.controller.config())
            .map_err(|e| JsError::new(&format!("Failed to serialize config: {}", e)))
    }
}
