//! Platform abstraction traits for marking passes.
//!
//! These traits define the interface between the marking logic and the
//! page it runs on (browser DOM, test fixtures, etc.). The same marker and
//! pass code works against any implementation.

use crate::types::{MessageId, Role};

/// Produces the ordered message handles for the current page.
///
/// Implementations are stateless with respect to previous passes: every
/// call enumerates from scratch and handles are never cached.
pub trait MessageSource {
    /// Handle to one rendered conversation turn.
    type Handle: RoleTagging;

    /// Enumerate messages in render order (oldest first).
    ///
    /// Returns an empty vec, never fails, when nothing is rendered yet.
    fn enumerate_messages(&self) -> Vec<Self::Handle>;

    /// Stable identifier of a handle, `None` if it has none.
    fn identity_of(&self, handle: &Self::Handle) -> Option<MessageId>;
}

/// Role tag storage on a message handle.
///
/// This is the only role state UI code may read back. The browser stores
/// it as the `data-wb-role` attribute.
pub trait RoleTagging {
    /// Current role tag, if any.
    fn role(&self) -> Option<Role>;

    /// Overwrite the role tag.
    fn set_role(&mut self, role: Role);

    /// Remove any role tag.
    fn clear_role(&mut self);
}
