// Application Layer - Use Cases and Business Logic

pub mod network_index;
pub mod sync_job;
pub mod tenant_guard;

#[cfg(test)]
pub(crate) mod testing;

use crate::port::{DocumentStore, LinkBuilder, NetworkOptionStore, TenantDirectory};
use std::sync::Arc;

// Re-exports
pub use network_index::{IndexAction, NetworkIndex};
pub use sync_job::{SyncJob, SyncJobService};
pub use tenant_guard::TenantContextGuard;

/// Collaborators a sync job talks to
#[derive(Clone)]
pub struct SyncPorts {
    pub tenants: Arc<dyn TenantDirectory>,
    pub documents: Arc<dyn DocumentStore>,
    pub options: Arc<dyn NetworkOptionStore>,
    pub links: Arc<dyn LinkBuilder>,
}

impl SyncPorts {
    /// Wire all four ports from one adapter implementing every one of them
    pub fn from_adapter<A>(adapter: Arc<A>) -> Self
    where
        A: TenantDirectory + DocumentStore + NetworkOptionStore + LinkBuilder + 'static,
    {
        Self {
            tenants: adapter.clone(),
            documents: adapter.clone(),
            options: adapter.clone(),
            links: adapter,
        }
    }
}
