//! One full marking pass: enumerate, index, load, mark.

use crate::index::IdentityIndex;
use crate::marker::{MarkSummary, mark_ranges};
use crate::platform::{MessageSource, RoleTagging};
use crate::store::PairStore;
use crate::types::Role;

/// Outcome of a marking pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Messages enumerated this pass.
    pub message_count: usize,
    /// Pairs loaded from the store.
    pub pair_count: usize,
    pub summary: MarkSummary,
    /// Positions tagged `start`, in render order, for navigation.
    pub starts: Vec<usize>,
}

impl PassReport {
    /// Report for a pass that found no messages.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Enumerate messages, build a fresh index, reload pairs and re-mark.
///
/// The enumeration and index always come from the same call, and pairs are
/// read from the store every time. A store failure marks as if no pairs
/// existed. An empty page is a transient no-op.
pub fn run_pass<M, S>(source: &M, store: &S) -> (Vec<M::Handle>, PassReport)
where
    M: MessageSource,
    S: PairStore + ?Sized,
{
    let mut messages = source.enumerate_messages();
    if messages.is_empty() {
        tracing::debug!("no messages found, skipping pass");
        return (messages, PassReport::empty());
    }

    let ids: Vec<_> = messages.iter().map(|m| source.identity_of(m)).collect();
    let index = IdentityIndex::build(ids.iter().map(|id| id.as_deref()));

    let pairs = store.load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load pairs, marking without them");
        Vec::new()
    });

    let summary = mark_ranges(&mut messages, &pairs, &index);
    let starts = messages
        .iter()
        .enumerate()
        .filter_map(|(i, m)| (m.role() == Some(Role::Start)).then_some(i))
        .collect();

    let report = PassReport {
        message_count: messages.len(),
        pair_count: pairs.len(),
        summary,
        starts,
    };
    tracing::debug!(
        messages = report.message_count,
        pairs = report.pair_count,
        tagged = report.summary.tagged_count,
        "marking pass complete"
    );
    (messages, report)
}
