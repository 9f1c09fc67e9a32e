//! DOM message source and role tagging.
//!
//! Messages are found with the active site's selector table and tagged with
//! `data-wb-role`. The pending start gets its own `data-wb-pending`
//! attribute so the role vocabulary stays `start | mid | end`.

use branchweave_core::{BranchError, MessageId, MessageSource, Role, RoleTagging, SiteKind};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

/// Attribute holding a message's role.
pub const ROLE_ATTR: &str = "data-wb-role";
/// Attribute marking the pending start message.
pub const PENDING_ATTR: &str = "data-wb-pending";
/// Attribute marking elements that already carry injected controls.
pub const INJECTED_ATTR: &str = "data-wb-injected";

/// A rendered conversation turn.
#[derive(Clone, Debug, PartialEq)]
pub struct DomMessage(Element);

impl DomMessage {
    pub fn new(element: Element) -> Self {
        Self(element)
    }

    pub fn element(&self) -> &Element {
        &self.0
    }

    /// Whether controls were already injected into this message.
    pub fn is_injected(&self) -> bool {
        self.0.has_attribute(INJECTED_ATTR)
    }

    /// Toggle the pending-start marker.
    pub fn set_pending(&self, pending: bool) {
        let result = if pending {
            self.0.set_attribute(PENDING_ATTR, "1")
        } else {
            self.0.remove_attribute(PENDING_ATTR)
        };
        if let Err(e) = result {
            tracing::warn!("Failed to update pending marker: {:?}", e);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.0.has_attribute(PENDING_ATTR)
    }
}

impl RoleTagging for DomMessage {
    fn role(&self) -> Option<Role> {
        self.0.get_attribute(ROLE_ATTR)?.parse().ok()
    }

    fn set_role(&mut self, role: Role) {
        if let Err(e) = self.0.set_attribute(ROLE_ATTR, role.as_str()) {
            tracing::warn!("Failed to set role attribute: {:?}", e);
        }
    }

    fn clear_role(&mut self) {
        if let Err(e) = self.0.remove_attribute(ROLE_ATTR) {
            tracing::warn!("Failed to clear role attribute: {:?}", e);
        }
    }
}

/// Enumerates messages in a document using a site's selector table.
#[derive(Clone, Debug)]
pub struct DomMessageSource {
    site: SiteKind,
    document: Document,
}

impl DomMessageSource {
    /// Create a source over the current window's document.
    pub fn new(site: SiteKind) -> Result<Self, BranchError> {
        let window = web_sys::window().ok_or(BranchError::NoWindow)?;
        let document = window.document().ok_or(BranchError::NoDocument)?;
        Ok(Self::with_document(site, document))
    }

    /// Create a source over a specific document.
    pub fn with_document(site: SiteKind, document: Document) -> Self {
        Self { site, document }
    }

    pub fn site(&self) -> SiteKind {
        self.site
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl MessageSource for DomMessageSource {
    type Handle = DomMessage;

    fn enumerate_messages(&self) -> Vec<DomMessage> {
        for query in self.site.selectors().message_queries {
            let node_list = match self.document.query_selector_all(query) {
                Ok(list) => list,
                Err(e) => {
                    tracing::warn!(query, "Message query failed: {:?}", e);
                    continue;
                }
            };
            if node_list.length() == 0 {
                continue;
            }

            return (0..node_list.length())
                .filter_map(|i| node_list.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .map(DomMessage::new)
                .collect();
        }
        Vec::new()
    }

    fn identity_of(&self, handle: &DomMessage) -> Option<MessageId> {
        handle
            .0
            .get_attribute(self.site.selectors().id_attribute)
            .filter(|id| !id.is_empty())
            .map(MessageId::from)
    }
}
