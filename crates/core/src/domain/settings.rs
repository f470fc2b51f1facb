// Sync settings (shared by the job service and the network index)

use serde::Deserialize;

use super::error::{DomainError, Result};
use super::job::DEFAULT_AUTHOR_ID;
use super::tenant::TenantId;

/// Settings for job lookup and the network-wide index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Document kind of job documents in the source tenant
    pub job_kind: String,

    /// Raw titles replaced by the synthesized "Job #<id>" label
    pub placeholder_titles: Vec<String>,

    /// Author attributed to pushed content when the job has none
    pub default_author: i64,

    /// Option key prefix of the "sources per portal" lists
    pub sources_option_prefix: String,

    /// Option key prefix of the "portals per source" lists
    pub portals_option_prefix: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            job_kind: "sync_job".to_string(),
            placeholder_titles: vec!["Auto Draft".to_string()],
            default_author: DEFAULT_AUTHOR_ID,
            sources_option_prefix: "portalsync_sources_".to_string(),
            portals_option_prefix: "portalsync_portals_".to_string(),
        }
    }
}

impl SyncSettings {
    /// Option key holding the source ids registered for a portal
    pub fn sources_key(&self, portal: TenantId) -> String {
        format!("{}{}", self.sources_option_prefix, portal)
    }

    /// Option key holding the portal ids registered for a source
    pub fn portals_key(&self, source: TenantId) -> String {
        format!("{}{}", self.portals_option_prefix, source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.job_kind.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "job kind cannot be empty".to_string(),
            ));
        }
        if self.default_author <= 0 {
            return Err(DomainError::ValidationError(format!(
                "default author must be positive, got {}",
                self.default_author
            )));
        }
        if self.sources_option_prefix == self.portals_option_prefix {
            return Err(DomainError::ValidationError(
                "sources and portals option prefixes must differ".to_string(),
            ));
        }
        Ok(())
    }
}
