//! Site adapters: per-platform selector tables.
//!
//! Each supported chat site renders turns differently. The selector tables
//! here describe where messages live and how to read their ids; the browser
//! crate does the actual querying. The active site is resolved once from the
//! page host at startup.

use serde::{Deserialize, Serialize};

/// Supported chat platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    #[default]
    ChatGpt,
    Claude,
    Grok,
}

/// CSS selectors for one chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteSelectors {
    /// Message queries tried in order; the first non-empty match wins.
    pub message_queries: &'static [&'static str],
    /// Attribute carrying the stable message id.
    pub id_attribute: &'static str,
    /// Code blocks inside a message.
    pub code_block: &'static str,
    /// Where to put the branch controls inside a message, if the site has a
    /// dedicated action bar.
    pub action_area: Option<&'static str>,
}

static CHATGPT: SiteSelectors = SiteSelectors {
    message_queries: &["article", "main div[group=\"conversations\"]"],
    id_attribute: "data-turn-id",
    code_block: "pre",
    action_area: Some(".flex.items-center.justify-between"),
};

static CLAUDE: SiteSelectors = SiteSelectors {
    message_queries: &["div.claude-message"],
    id_attribute: "data-message-id",
    code_block: "pre",
    action_area: Some(".claude-actions"),
};

// Grok renders turns as divs with ids like "response-<uuid>".
static GROK: SiteSelectors = SiteSelectors {
    message_queries: &["main div[id^=\"response-\"]", "main [id^=\"response-\"]"],
    id_attribute: "id",
    code_block: "pre",
    action_area: None,
};

impl SiteKind {
    /// All supported sites.
    pub const ALL: [SiteKind; 3] = [SiteKind::ChatGpt, SiteKind::Claude, SiteKind::Grok];

    /// Resolve the site for a page host. Unknown hosts fall back to ChatGPT.
    pub fn from_host(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        if host.contains("claude") {
            SiteKind::Claude
        } else if host.contains("grok") || host == "x.ai" || host.ends_with(".x.ai") {
            SiteKind::Grok
        } else {
            SiteKind::ChatGpt
        }
    }

    pub fn selectors(&self) -> &'static SiteSelectors {
        match self {
            SiteKind::ChatGpt => &CHATGPT,
            SiteKind::Claude => &CLAUDE,
            SiteKind::Grok => &GROK,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SiteKind::ChatGpt => "chatgpt",
            SiteKind::Claude => "claude",
            SiteKind::Grok => "grok",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_registry() {
        assert_eq!(SiteKind::from_host("claude.ai"), SiteKind::Claude);
        assert_eq!(SiteKind::from_host("grok.com"), SiteKind::Grok);
        assert_eq!(SiteKind::from_host("x.ai"), SiteKind::Grok);
        assert_eq!(SiteKind::from_host("chat.x.ai"), SiteKind::Grok);
        assert_eq!(SiteKind::from_host("chatgpt.com"), SiteKind::ChatGpt);
        assert_eq!(SiteKind::from_host("CLAUDE.AI"), SiteKind::Claude);
        // "box.ai" is not x.ai
        assert_eq!(SiteKind::from_host("box.ai"), SiteKind::ChatGpt);
        assert_eq!(SiteKind::from_host(""), SiteKind::ChatGpt);
    }

    #[test]
    fn test_every_site_has_queries_and_id() {
        for site in SiteKind::ALL {
            let sel = site.selectors();
            assert!(!sel.message_queries.is_empty(), "{}", site.name());
            assert!(!sel.id_attribute.is_empty(), "{}", site.name());
        }
    }

    #[test]
    fn test_site_ids() {
        assert_eq!(SiteKind::Claude.selectors().id_attribute, "data-message-id");
        assert_eq!(SiteKind::ChatGpt.selectors().id_attribute, "data-turn-id");
        assert_eq!(SiteKind::Grok.selectors().id_attribute, "id");
        assert!(SiteKind::Grok.selectors().action_area.is_none());
    }
}
