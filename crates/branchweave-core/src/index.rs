//! Id to position lookup for a single enumeration pass.

use std::collections::HashMap;

use crate::types::MessageId;

/// Maps message ids to their position in the current enumeration.
///
/// Built fresh every pass and never reused with handles from another pass.
/// Messages without an id still occupy a position, they just can't be found
/// by id.
#[derive(Clone, Debug, Default)]
pub struct IdentityIndex {
    positions: HashMap<MessageId, usize>,
    len: usize,
}

impl IdentityIndex {
    /// Build the index from ids in enumeration order.
    ///
    /// Missing or empty ids are skipped. If an id repeats, the first
    /// occurrence wins.
    pub fn build<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut positions = HashMap::new();
        let mut len = 0;
        for (position, id) in ids.into_iter().enumerate() {
            len = position + 1;
            let Some(id) = id.filter(|id| !id.is_empty()) else {
                continue;
            };
            if positions.contains_key(id) {
                tracing::debug!(id, position, "duplicate message id, keeping first");
                continue;
            }
            positions.insert(MessageId::new(id), position);
        }
        Self { positions, len }
    }

    /// Position of the message with this id, if it was enumerated.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Number of enumerated messages, including those without an id.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_enumeration_order() {
        let index = IdentityIndex::build([Some("m0"), Some("m1"), Some("m2")]);
        assert_eq!(index.position("m0"), Some(0));
        assert_eq!(index.position("m2"), Some(2));
        assert_eq!(index.position("nope"), None);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_missing_ids_keep_their_slot() {
        let index = IdentityIndex::build([Some("a"), None, Some(""), Some("b")]);
        assert_eq!(index.position("a"), Some(0));
        assert_eq!(index.position("b"), Some(3));
        assert!(!index.contains(""));
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let index = IdentityIndex::build([Some("x"), Some("y"), Some("x")]);
        assert_eq!(index.position("x"), Some(0));
    }

    #[test]
    fn test_empty() {
        let index = IdentityIndex::build(std::iter::empty::<Option<&str>>());
        assert!(index.is_empty());
    }
}
