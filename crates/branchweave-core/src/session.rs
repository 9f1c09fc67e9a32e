//! Pending-start state machine for branch marking.
//!
//! A `BranchSession` owns the single pending start slot and an injected
//! `PairStore`. User actions (start, end, remove) go through it; the marker
//! never sees the session, it only reads what the store holds.
//!
//! ```text
//! Idle --mark_start(a)--> PendingStart(a) --mark_start(b)--> PendingStart(b)
//! PendingStart(s) --mark_end(e), e != s--> Idle   (pair {s, e} saved)
//! PendingStart(s) --remove(s)--> Idle
//! ```

use crate::config::BranchConfig;
use crate::error::InteractionError;
use crate::index::IdentityIndex;
use crate::store::PairStore;
use crate::types::{MessageId, RangePair};

/// Pending start selection state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PendingStart {
    #[default]
    Idle,
    /// A start was chosen and is waiting for its end.
    Pending(MessageId),
}

impl PendingStart {
    pub fn id(&self) -> Option<&MessageId> {
        match self {
            PendingStart::Idle => None,
            PendingStart::Pending(id) => Some(id),
        }
    }
}

/// What a `remove` call changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// The pending start was the removed message and got cancelled.
    pub cancelled_pending: bool,
    /// Pairs deleted from the store.
    pub removed_pairs: Vec<RangePair>,
    /// Covering pairs were found but the store refused the write, so
    /// nothing was deleted.
    pub save_failed: bool,
}

impl RemoveOutcome {
    /// True if anything changed.
    pub fn changed(&self) -> bool {
        self.cancelled_pending || !self.removed_pairs.is_empty()
    }
}

/// Session context for branch interactions.
///
/// Store failures never escape as store errors: a failed load behaves like
/// an empty store and a failed save leaves the previous contents in place.
/// Both are logged, and a failed save also rejects the action that caused it.
pub struct BranchSession<S> {
    store: S,
    pending: PendingStart,
    exclusive_endpoints: bool,
}

impl<S: PairStore> BranchSession<S> {
    /// Create a session over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            pending: PendingStart::Idle,
            exclusive_endpoints: false,
        }
    }

    /// Create a session honouring interaction settings from `config`.
    pub fn with_config(store: S, config: &BranchConfig) -> Self {
        Self {
            exclusive_endpoints: config.exclusive_endpoints,
            ..Self::new(store)
        }
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current pending state.
    pub fn state(&self) -> &PendingStart {
        &self.pending
    }

    /// Pending start id, if any.
    pub fn pending(&self) -> Option<&MessageId> {
        self.pending.id()
    }

    /// Load pairs, treating a store failure as empty.
    pub fn load_pairs(&self) -> Vec<RangePair> {
        match self.store.load() {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load pairs, treating as empty");
                Vec::new()
            }
        }
    }

    fn save_pairs(&self, pairs: &[RangePair]) -> bool {
        match self.store.save(pairs) {
            Ok(()) => {
                tracing::debug!(count = pairs.len(), "saved pairs");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save pairs");
                false
            }
        }
    }

    /// Choose `id` as the pending start, replacing any earlier choice.
    pub fn mark_start(&mut self, id: impl Into<MessageId>) -> Result<(), InteractionError> {
        let id = id.into();
        if self.exclusive_endpoints && self.load_pairs().iter().any(|p| p.has_endpoint(&id)) {
            return Err(InteractionError::AlreadyInPair(id));
        }
        if let PendingStart::Pending(previous) = &self.pending {
            if *previous != id {
                tracing::debug!(%previous, "discarding uncommitted start");
            }
        }
        tracing::debug!(%id, "pending start set");
        self.pending = PendingStart::Pending(id);
        Ok(())
    }

    /// Complete the pending start with `id` as the end.
    ///
    /// The new pair is appended to the freshly loaded store contents. On
    /// rejection, including a failed save, the pending state is left
    /// untouched.
    pub fn mark_end(
        &mut self,
        id: impl Into<MessageId>,
        index: &IdentityIndex,
    ) -> Result<RangePair, InteractionError> {
        let id = id.into();
        let PendingStart::Pending(start) = &self.pending else {
            return Err(InteractionError::NoPendingStart);
        };
        if *start == id {
            return Err(InteractionError::SameMessage);
        }

        let start_pos = index
            .position(start)
            .ok_or_else(|| InteractionError::NotRendered(start.clone()))?;
        let end_pos = index
            .position(&id)
            .ok_or_else(|| InteractionError::NotRendered(id.clone()))?;
        if end_pos <= start_pos {
            return Err(InteractionError::EndBeforeStart);
        }

        let pair = RangePair {
            start_id: start.clone(),
            end_id: id,
        };
        let mut pairs = self.load_pairs();
        pairs.push(pair.clone());
        if !self.save_pairs(&pairs) {
            return Err(InteractionError::NotSaved);
        }
        self.pending = PendingStart::Idle;
        Ok(pair)
    }

    /// Drop the pending start (if it is `id`) and every pair covering `id`.
    ///
    /// A pair covers `id` when `id`'s position lies within the pair's
    /// inclusive positional range, or when `id` is one of its endpoints (which
    /// also catches pairs whose other endpoint is dangling).
    pub fn remove(&mut self, id: &str, index: &IdentityIndex) -> RemoveOutcome {
        let mut outcome = RemoveOutcome::default();

        if self.pending.id().is_some_and(|pending| pending == id) {
            self.pending = PendingStart::Idle;
            outcome.cancelled_pending = true;
        }

        let position = index.position(id);
        let covers = |pair: &RangePair| {
            if pair.has_endpoint(id) {
                return true;
            }
            let (Some(pos), Some(a), Some(b)) = (
                position,
                index.position(&pair.start_id),
                index.position(&pair.end_id),
            ) else {
                return false;
            };
            a.min(b) <= pos && pos <= a.max(b)
        };

        let (removed, kept): (Vec<_>, Vec<_>) = self.load_pairs().into_iter().partition(covers);
        if removed.is_empty() {
            tracing::debug!(id, "no pair covers message");
        } else if self.save_pairs(&kept) {
            outcome.removed_pairs = removed;
        } else {
            outcome.save_failed = true;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryPairStore;

    fn index(ids: &[&str]) -> IdentityIndex {
        IdentityIndex::build(ids.iter().map(|id| Some(*id)))
    }

    fn abcde() -> IdentityIndex {
        index(&["a", "b", "c", "d", "e"])
    }

    struct BrokenStore;

    impl PairStore for BrokenStore {
        fn load(&self) -> Result<Vec<RangePair>, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn save(&self, _pairs: &[RangePair]) -> Result<(), StoreError> {
            Err(StoreError::Backend("quota exceeded".into()))
        }
    }

    #[test]
    fn test_start_then_end_creates_pair() {
        let mut session = BranchSession::new(MemoryPairStore::new());
        session.mark_start("a").unwrap();
        let pair = session.mark_end("c", &abcde()).unwrap();

        assert_eq!(pair, RangePair::new("a", "c"));
        assert_eq!(session.store().pairs(), vec![RangePair::new("a", "c")]);
        assert_eq!(session.state(), &PendingStart::Idle);
    }

    #[test]
    fn test_second_start_replaces_first() {
        let mut session = BranchSession::new(MemoryPairStore::new());
        session.mark_start("a").unwrap();
        session.mark_start("b").unwrap();
        let pair = session.mark_end("c", &abcde()).unwrap();

        assert_eq!(pair, RangePair::new("b", "c"));
    }

    #[test]
    fn test_end_on_same_message_is_rejected() {
        let mut session = BranchSession::new(MemoryPairStore::new());
        session.mark_start("a").unwrap();

        assert_eq!(
            session.mark_end("a", &abcde()),
            Err(InteractionError::SameMessage)
        );
        assert_eq!(session.state(), &PendingStart::Pending("a".into()));
        assert!(session.store().pairs().is_empty());
    }

    #[test]
    fn test_end_without_start_is_rejected() {
        let mut session = BranchSession::new(MemoryPairStore::new());
        let err = session.mark_end("b", &abcde()).unwrap_err();

        assert_eq!(err, InteractionError::NoPendingStart);
        assert_eq!(err.to_string(), "choose a start first");
        assert_eq!(session.state(), &PendingStart::Idle);
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut session = BranchSession::new(MemoryPairStore::new());
        session.mark_start("d").unwrap();

        assert_eq!(
            session.mark_end("b", &abcde()),
            Err(InteractionError::EndBeforeStart)
        );
        assert_eq!(session.pending().map(|id| id.as_str()), Some("d"));
    }

    #[test]
    fn test_end_with_unrendered_start_is_rejected() {
        let mut session = BranchSession::new(MemoryPairStore::new());
        session.mark_start("zz").unwrap();

        assert_eq!(
            session.mark_end("b", &abcde()),
            Err(InteractionError::NotRendered("zz".into()))
        );
    }

    #[test]
    fn test_new_pair_appends_to_fresh_store_contents() {
        let store = MemoryPairStore::new();
        let mut session = BranchSession::new(&store);
        session.mark_start("a").unwrap();

        // Another writer adds a pair while the start is pending.
        store.save(&[RangePair::new("d", "e")]).unwrap();

        session.mark_end("b", &abcde()).unwrap();
        assert_eq!(
            store.pairs(),
            vec![RangePair::new("d", "e"), RangePair::new("a", "b")]
        );
    }

    #[test]
    fn test_remove_cancels_pending() {
        let mut session = BranchSession::new(MemoryPairStore::new());
        session.mark_start("c").unwrap();

        let outcome = session.remove("c", &abcde());
        assert!(outcome.cancelled_pending);
        assert!(outcome.removed_pairs.is_empty());
        assert_eq!(session.state(), &PendingStart::Idle);
    }

    #[test]
    fn test_remove_other_message_keeps_pending() {
        let mut session = BranchSession::new(MemoryPairStore::new());
        session.mark_start("c").unwrap();

        let outcome = session.remove("a", &abcde());
        assert!(!outcome.changed());
        assert_eq!(session.pending().map(|id| id.as_str()), Some("c"));
    }

    #[test]
    fn test_remove_deletes_every_covering_pair() {
        let store = MemoryPairStore::with_pairs(vec![
            RangePair::new("a", "c"),
            RangePair::new("d", "e"),
            RangePair::new("b", "d"),
        ]);
        let mut session = BranchSession::new(store);

        let outcome = session.remove("c", &abcde());
        assert_eq!(
            outcome.removed_pairs,
            vec![RangePair::new("a", "c"), RangePair::new("b", "d")]
        );
        assert_eq!(session.store().pairs(), vec![RangePair::new("d", "e")]);
    }

    #[test]
    fn test_remove_inside_reversed_pair() {
        let store = MemoryPairStore::with_pairs(vec![RangePair::new("e", "b")]);
        let mut session = BranchSession::new(store);

        let outcome = session.remove("c", &abcde());
        assert_eq!(outcome.removed_pairs.len(), 1);
    }

    #[test]
    fn test_remove_endpoint_of_dangling_pair() {
        let store = MemoryPairStore::with_pairs(vec![RangePair::new("a", "gone")]);
        let mut session = BranchSession::new(store);

        let outcome = session.remove("a", &abcde());
        assert_eq!(outcome.removed_pairs, vec![RangePair::new("a", "gone")]);
        assert!(session.store().pairs().is_empty());
    }

    #[test]
    fn test_remove_outside_any_range_keeps_pairs() {
        let store = MemoryPairStore::with_pairs(vec![RangePair::new("a", "b")]);
        let mut session = BranchSession::new(store);

        let outcome = session.remove("e", &abcde());
        assert!(!outcome.changed());
        assert_eq!(session.store().pairs().len(), 1);
    }

    #[test]
    fn test_exclusive_endpoints() {
        let store = MemoryPairStore::with_pairs(vec![RangePair::new("a", "c")]);
        let config = BranchConfig {
            exclusive_endpoints: true,
            ..Default::default()
        };
        let mut session = BranchSession::with_config(store, &config);

        assert_eq!(
            session.mark_start("c"),
            Err(InteractionError::AlreadyInPair("c".into()))
        );
        assert_eq!(session.state(), &PendingStart::Idle);
        assert!(session.mark_start("d").is_ok());
    }

    #[test]
    fn test_shared_endpoints_allowed_by_default() {
        let store = MemoryPairStore::with_pairs(vec![RangePair::new("a", "c")]);
        let mut session = BranchSession::new(store);

        session.mark_start("c").unwrap();
        session.mark_end("e", &abcde()).unwrap();
        assert_eq!(session.store().pairs().len(), 2);
    }

    #[test]
    fn test_broken_store_never_escapes() {
        let mut session = BranchSession::new(BrokenStore);

        assert!(session.load_pairs().is_empty());
        session.mark_start("a").unwrap();
        assert_eq!(
            session.mark_end("b", &abcde()),
            Err(InteractionError::NotSaved)
        );
        assert_eq!(session.state(), &PendingStart::Pending("a".into()));

        let outcome = session.remove("a", &abcde());
        assert!(outcome.cancelled_pending);
        assert!(outcome.removed_pairs.is_empty());
        assert!(!outcome.save_failed);
    }

    struct ReadOnlyStore(Vec<RangePair>);

    impl PairStore for ReadOnlyStore {
        fn load(&self) -> Result<Vec<RangePair>, StoreError> {
            Ok(self.0.clone())
        }

        fn save(&self, _pairs: &[RangePair]) -> Result<(), StoreError> {
            Err(StoreError::Backend("read only".into()))
        }
    }

    #[test]
    fn test_failed_save_keeps_pending_start() {
        let mut session = BranchSession::new(ReadOnlyStore(vec![]));
        session.mark_start("a").unwrap();

        let err = session.mark_end("c", &abcde()).unwrap_err();
        assert_eq!(err.to_string(), "branches could not be saved");
        assert_eq!(session.pending().map(|id| id.as_str()), Some("a"));
    }

    #[test]
    fn test_failed_remove_reports_nothing_removed() {
        let store = ReadOnlyStore(vec![RangePair::new("a", "c")]);
        let mut session = BranchSession::new(store);

        let outcome = session.remove("b", &abcde());
        assert!(outcome.save_failed);
        assert!(outcome.removed_pairs.is_empty());
        assert!(!outcome.changed());
    }
}
