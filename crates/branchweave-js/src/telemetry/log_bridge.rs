//! Forward log events to the extension via `window.postMessage`.
//!
//! The extension's background page listens for
//! `{ source: "wb-extension", type: "log", args: [...] }` and mirrors the
//! entries into its own console, which survives page reloads.

use std::fmt::Write as FmtWrite;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use wasm_bindgen::JsValue;

/// Message source tag the extension filters on.
pub const BRIDGE_SOURCE: &str = "wb-extension";

/// Module prefixes forwarded over the bridge.
const BRIDGED_PREFIXES: &[&str] = &["branchweave"];

/// Minimum level to forward.
const BRIDGE_MIN_LEVEL: Level = Level::INFO;

/// A tracing Layer that posts our log events to the page window.
/// Console output is handled by WASMLayer in the subscriber stack.
pub struct LogBridgeLayer;

impl<S: Subscriber> Layer<S> for LogBridgeLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = metadata.level();
        let target = metadata.target();

        let is_our_module = BRIDGED_PREFIXES.iter().any(|prefix| target.starts_with(prefix));
        if !is_our_module || *level > BRIDGE_MIN_LEVEL {
            return;
        }

        let mut message = String::new();
        let mut visitor = MessageVisitor(&mut message);
        event.record(&mut visitor);

        post_log(&[level.as_str(), target, &message]);
    }
}

fn post_log(args: &[&str]) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let payload = js_sys::Object::new();
    let list = js_sys::Array::new();
    for arg in args {
        list.push(&JsValue::from_str(arg));
    }
    let fields: [(&str, JsValue); 3] = [
        ("source", BRIDGE_SOURCE.into()),
        ("type", "log".into()),
        ("args", list.into()),
    ];
    for (key, value) in fields {
        if js_sys::Reflect::set(&payload, &key.into(), &value).is_err() {
            return;
        }
    }

    let _ = window.post_message(&payload, "*");
}

/// Visitor that extracts the message field from a tracing event.
struct MessageVisitor<'a>(&'a mut String);

impl MessageVisitor<'_> {
    fn separate(&mut self) {
        if !self.0.is_empty() {
            self.0.push_str(", ");
        }
    }
}

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.0, "{:?}", value);
        } else {
            self.separate();
            let _ = write!(self.0, "{}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0.push_str(value);
        } else {
            self.separate();
            let _ = write!(self.0, "{}={}", field.name(), value);
        }
    }
}
