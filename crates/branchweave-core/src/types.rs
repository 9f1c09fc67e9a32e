//! Core branch types: message ids, range pairs, roles and role assignments.
//!
//! These types are framework-agnostic. Only `RangePair` is ever persisted;
//! roles are recomputed from scratch on every marking pass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Stable identifier of a rendered conversation turn.
pub type MessageId = SmolStr;

/// A user-declared branch range between two messages.
///
/// Stored independently of any enumeration, so either endpoint may be absent
/// from the page at marking time (a dangling pair).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangePair {
    pub start_id: MessageId,
    pub end_id: MessageId,
}

impl RangePair {
    /// Create a new pair.
    pub fn new(start_id: impl Into<MessageId>, end_id: impl Into<MessageId>) -> Self {
        Self {
            start_id: start_id.into(),
            end_id: end_id.into(),
        }
    }

    /// Check if the given id is one of this pair's endpoints.
    pub fn has_endpoint(&self, id: &str) -> bool {
        self.start_id == id || self.end_id == id
    }
}

/// Role of a message within a branch range.
///
/// A message outside every range has no role (`None` where an `Option<Role>`
/// is used).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Start,
    Mid,
    End,
}

impl Role {
    /// Attribute value written to the page for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Start => "start",
            Role::Mid => "mid",
            Role::End => "end",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Role::Start),
            "mid" => Ok(Role::Mid),
            "end" => Ok(Role::End),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Roles for one enumeration, indexed by position.
///
/// Derived and ephemeral: the same enumeration and pairs always produce the
/// same assignment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    roles: Vec<Option<Role>>,
}

impl RoleAssignment {
    /// Create an assignment with `len` unmarked positions.
    pub fn unmarked(len: usize) -> Self {
        Self {
            roles: vec![None; len],
        }
    }

    /// Number of positions covered (marked or not).
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Role at a position, `None` if unmarked or out of range.
    pub fn role_at(&self, position: usize) -> Option<Role> {
        self.roles.get(position).copied().flatten()
    }

    /// Overwrite the role at a position. Out-of-range positions are ignored.
    pub(crate) fn set(&mut self, position: usize, role: Role) {
        if let Some(slot) = self.roles.get_mut(position) {
            *slot = Some(role);
        }
    }

    /// Number of positions carrying a role.
    pub fn tagged_count(&self) -> usize {
        self.roles.iter().filter(|r| r.is_some()).count()
    }

    /// Positions tagged `start`, in enumeration order.
    pub fn starts(&self) -> Vec<usize> {
        self.roles
            .iter()
            .enumerate()
            .filter_map(|(i, r)| (*r == Some(Role::Start)).then_some(i))
            .collect()
    }

    /// Iterate roles in position order.
    pub fn iter(&self) -> impl Iterator<Item = Option<Role>> + '_ {
        self.roles.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [Role::Start, Role::Mid, Role::End] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert_eq!(
            "pending".parse::<Role>(),
            Err(UnknownRole("pending".to_string()))
        );
    }

    #[test]
    fn test_pair_json_uses_stored_field_names() {
        let pair = RangePair::new("a", "b");
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, r#"{"startId":"a","endId":"b"}"#);

        let parsed: Vec<RangePair> =
            serde_json::from_str(r#"[{"startId":"x","endId":"y"}]"#).unwrap();
        assert_eq!(parsed, vec![RangePair::new("x", "y")]);
    }

    #[test]
    fn test_assignment_helpers() {
        let mut roles = RoleAssignment::unmarked(4);
        roles.set(1, Role::Start);
        roles.set(2, Role::Mid);
        roles.set(3, Role::Start);
        roles.set(9, Role::End); // ignored

        assert_eq!(roles.len(), 4);
        assert_eq!(roles.tagged_count(), 3);
        assert_eq!(roles.starts(), vec![1, 3]);
        assert_eq!(roles.role_at(0), None);
        assert_eq!(roles.role_at(9), None);
    }
}
