//! Types exposed to JavaScript via wasm-bindgen.

use branchweave_browser::PassReport;
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

/// Outcome of a marking pass.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsPassReport {
    pub message_count: usize,
    pub pair_count: usize,
    pub tagged_count: usize,
    pub skipped_pairs: usize,
    /// Render positions of branch starts.
    pub starts: Vec<usize>,
}

impl From<PassReport> for JsPassReport {
    fn from(report: PassReport) -> Self {
        Self {
            message_count: report.message_count,
            pair_count: report.pair_count,
            tagged_count: report.summary.tagged_count,
            skipped_pairs: report.summary.skipped_pairs,
            starts: report.starts,
        }
    }
}
