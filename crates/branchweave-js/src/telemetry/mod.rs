//! Tracing setup for the content script.

mod log_bridge;

pub use log_bridge::LogBridgeLayer;

/// Install console output plus the extension log bridge.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let reg = Registry::default().with(wasm_layer).with(LogBridgeLayer);

    let _ = set_global_default(reg);
}
