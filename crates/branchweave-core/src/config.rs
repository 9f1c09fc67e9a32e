use serde::{Deserialize, Serialize};

use crate::adapter::SiteKind;

/// Runtime configuration for the page integration.
///
/// Every field has a default, so a partial (or absent) config object from
/// the extension host is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BranchConfig {
    /// LocalStorage key holding the pair list.
    pub storage_key: String,
    /// Quiet period after the last page mutation before re-marking.
    pub settle_delay_ms: u32,
    /// Hover time before a message expands.
    pub hover_delay_ms: u32,
    /// How long a rejection notice stays on screen.
    pub notice_ms: u32,
    /// Refuse to start a branch on a message that is already an endpoint.
    pub exclusive_endpoints: bool,
    /// Force a site adapter instead of detecting it from the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteKind>,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            storage_key: "wb_pairs".to_owned(),
            settle_delay_ms: 500,
            hover_delay_ms: 350,
            notice_ms: 2500,
            exclusive_endpoints: false,
            site: None,
        }
    }
}

impl BranchConfig {
    /// Site to use for `host`, honouring the override.
    pub fn site_for_host(&self, host: &str) -> SiteKind {
        self.site.unwrap_or_else(|| SiteKind::from_host(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: BranchConfig =
            serde_json::from_str(r#"{"settleDelayMs": 200, "site": "claude"}"#).unwrap();
        assert_eq!(config.settle_delay_ms, 200);
        assert_eq!(config.storage_key, "wb_pairs");
        assert_eq!(config.hover_delay_ms, 350);
        assert_eq!(config.site, Some(SiteKind::Claude));
    }

    #[test]
    fn test_site_override() {
        let config = BranchConfig::default();
        assert_eq!(config.site_for_host("claude.ai"), SiteKind::Claude);

        let forced = BranchConfig {
            site: Some(SiteKind::Grok),
            ..Default::default()
        };
        assert_eq!(forced.site_for_host("claude.ai"), SiteKind::Grok);
    }
}
