// Network Index - bidirectional portal <-> source registry
//
// Two network-wide lists per relationship: the sources registered for a
// portal and the portals registered for a source. Both are ordered sets:
// first insertion order is kept and ids never repeat.

use crate::domain::{SyncSettings, TenantId};
use crate::error::Result;
use crate::port::NetworkOptionStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexAction {
    Add,
    Delete,
}

impl std::fmt::Display for IndexAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexAction::Add => write!(f, "add"),
            IndexAction::Delete => write!(f, "delete"),
        }
    }
}

pub struct NetworkIndex {
    options: Arc<dyn NetworkOptionStore>,
    settings: Arc<SyncSettings>,
}

impl NetworkIndex {
    pub fn new(options: Arc<dyn NetworkOptionStore>, settings: Arc<SyncSettings>) -> Self {
        Self { options, settings }
    }

    /// Add or remove the (portal, source) pair in both lists
    ///
    /// Both lists are written back even when nothing changed.
    pub async fn update(
        &self,
        action: IndexAction,
        portal: TenantId,
        source: TenantId,
    ) -> Result<()> {
        let sources_key = self.settings.sources_key(portal);
        let portals_key = self.settings.portals_key(source);

        let mut sources = self.load(&sources_key).await?;
        let mut portals = self.load(&portals_key).await?;

        match action {
            IndexAction::Add => {
                insert_once(&mut sources, source);
                insert_once(&mut portals, portal);
            }
            IndexAction::Delete => {
                sources.retain(|id| *id != source);
                portals.retain(|id| *id != portal);
            }
        }

        self.options
            .set_option(&sources_key, serde_json::to_value(&sources)?)
            .await?;
        self.options
            .set_option(&portals_key, serde_json::to_value(&portals)?)
            .await?;

        info!(%action, portal, source, "Network index updated");
        Ok(())
    }

    /// Sources registered for a portal, in registration order
    pub async fn sources_of(&self, portal: TenantId) -> Result<Vec<TenantId>> {
        self.load(&self.settings.sources_key(portal)).await
    }

    /// Portals registered for a source, in registration order
    pub async fn portals_of(&self, source: TenantId) -> Result<Vec<TenantId>> {
        self.load(&self.settings.portals_key(source)).await
    }

    async fn load(&self, key: &str) -> Result<Vec<TenantId>> {
        match self.options.get_option(key).await? {
            None | Some(Value::Null) => {
                debug!(key, "Index list not found, starting empty");
                Ok(Vec::new())
            }
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }
}

fn insert_once(ids: &mut Vec<TenantId>, id: TenantId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}
