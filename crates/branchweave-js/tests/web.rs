//! WASM browser tests for the branchweave-js entry point.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use branchweave_js::start;

fn config(entries: &[(&str, JsValue)]) -> JsValue {
    let obj = js_sys::Object::new();
    for (key, value) in entries {
        js_sys::Reflect::set(&obj, &JsValue::from_str(key), value).unwrap();
    }
    obj.into()
}

#[wasm_bindgen_test]
fn test_start_with_default_config() {
    let Ok(handle) = start(JsValue::UNDEFINED) else {
        panic!("start failed with default config");
    };
    // Test runner host is localhost, which falls back to ChatGPT.
    assert_eq!(handle.site(), "chatgpt");
    assert_eq!(handle.get_pending(), None);
}

#[wasm_bindgen_test]
fn test_forced_site_and_storage_key() {
    let Ok(handle) = start(config(&[
        ("site", "grok".into()),
        ("storageKey", "wb_js_test_pairs".into()),
    ])) else {
        panic!("start failed with forced site");
    };
    assert_eq!(handle.site(), "grok");

    let Ok(cfg) = handle.get_config() else {
        panic!("config did not serialize");
    };
    let key = js_sys::Reflect::get(&cfg, &"storageKey".into()).unwrap();
    assert_eq!(key.as_string().as_deref(), Some("wb_js_test_pairs"));
}

#[wasm_bindgen_test]
fn test_rejected_end_shows_notice_without_throwing() {
    let Ok(handle) = start(config(&[("storageKey", "wb_js_test_reject".into())])) else {
        panic!("start failed");
    };
    assert!(!handle.mark_end("nothing-pending"));

    let notice = web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .get_element_by_id("wb-notice")
        .unwrap();
    assert_eq!(notice.text_content().as_deref(), Some("choose a start first"));
    notice.remove();
}

#[wasm_bindgen_test]
fn test_accepted_start_returns_true() {
    let Ok(handle) = start(config(&[("storageKey", "wb_js_test_accept".into())])) else {
        panic!("start failed");
    };
    assert!(handle.mark_start("any-id"));
    assert_eq!(handle.get_pending().as_deref(), Some("any-id"));
    assert!(handle.remove("any-id"));
    assert_eq!(handle.get_pending(), None);
}

#[wasm_bindgen_test]
fn test_invalid_config_is_js_error() {
    assert!(start(config(&[("settleDelayMs", "soon".into())])).is_err());
}
