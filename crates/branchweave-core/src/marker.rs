//! Range marking: turn range pairs into start/mid/end roles.
//!
//! Marking is total and idempotent. Every pass clears all roles and
//! recomputes them from the enumeration and the stored pairs alone, so a
//! stale pass is simply superseded by the next one.
//!
//! Role labels follow identity, range membership follows position: the
//! message named by `start_id` is always tagged `start` even if it renders
//! after the one named by `end_id`, and everything strictly between the two
//! positions is `mid`.

use crate::index::IdentityIndex;
use crate::platform::RoleTagging;
use crate::types::{RangePair, Role, RoleAssignment};

/// Result of a marking pass, for observability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarkSummary {
    /// Distinct messages carrying a role after the pass.
    pub tagged_count: usize,
    /// Pairs skipped because an endpoint was not enumerated.
    pub skipped_pairs: usize,
}

/// Compute roles for `len` enumerated messages.
///
/// Pairs are applied in input order and later pairs overwrite earlier ones
/// where they overlap. Within a pair, `mid` is written first, then `end`,
/// then `start`, so a pair whose endpoints are the same message resolves to
/// `start`.
pub fn assign_roles(len: usize, pairs: &[RangePair], index: &IdentityIndex) -> RoleAssignment {
    assign_roles_counting(len, pairs, index).0
}

fn assign_roles_counting(
    len: usize,
    pairs: &[RangePair],
    index: &IdentityIndex,
) -> (RoleAssignment, usize) {
    let mut roles = RoleAssignment::unmarked(len);
    let mut skipped = 0;

    for pair in pairs {
        let (Some(start_idx), Some(end_idx)) = (
            index.position(&pair.start_id),
            index.position(&pair.end_id),
        ) else {
            tracing::debug!(
                start_id = %pair.start_id,
                end_id = %pair.end_id,
                "skipping dangling pair"
            );
            skipped += 1;
            continue;
        };
        if start_idx >= len || end_idx >= len {
            tracing::debug!(start_idx, end_idx, len, "skipping out-of-range pair");
            skipped += 1;
            continue;
        }

        let lo = start_idx.min(end_idx);
        let hi = start_idx.max(end_idx);
        for position in (lo + 1)..hi {
            roles.set(position, Role::Mid);
        }
        roles.set(end_idx, Role::End);
        roles.set(start_idx, Role::Start);
    }

    (roles, skipped)
}

/// Clear and re-apply roles on `messages`.
///
/// `index` must have been built from the same enumeration as `messages`.
/// Malformed pairs are skipped, never reported as errors.
pub fn mark_ranges<M: RoleTagging>(
    messages: &mut [M],
    pairs: &[RangePair],
    index: &IdentityIndex,
) -> MarkSummary {
    if messages.is_empty() {
        return MarkSummary::default();
    }

    for message in messages.iter_mut() {
        message.clear_role();
    }

    let (roles, skipped_pairs) = assign_roles_counting(messages.len(), pairs, index);
    for (message, role) in messages.iter_mut().zip(roles.iter()) {
        if let Some(role) = role {
            message.set_role(role);
        }
    }

    let summary = MarkSummary {
        tagged_count: roles.tagged_count(),
        skipped_pairs,
    };
    tracing::debug!(
        tagged = summary.tagged_count,
        skipped = summary.skipped_pairs,
        "marked messages"
    );
    summary
}
