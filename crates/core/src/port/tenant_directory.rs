// Tenant Directory Port (Interface)

use crate::domain::{TenantId, TenantRecord};
use crate::error::Result;
use async_trait::async_trait;

/// Tenant lookup and the network's "active tenant" context
///
/// Only one tenant context is active at a time. `switch_back` undoes the
/// most recent `switch_to`.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Resolve a tenant record (`AppError::TenantNotFound` when absent)
    async fn resolve(&self, id: TenantId) -> Result<TenantRecord>;

    /// Currently active tenant
    async fn current_tenant_id(&self) -> Result<TenantId>;

    /// Make `id` the active tenant
    async fn switch_to(&self, id: TenantId) -> Result<()>;

    /// Return to the tenant active before the last `switch_to`
    async fn switch_back(&self) -> Result<()>;
}
