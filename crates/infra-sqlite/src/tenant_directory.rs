// SQLite TenantDirectory Implementation

use crate::network::{map_sqlx_error, SqliteNetwork, TenantRow};
use async_trait::async_trait;
use portalsync_core::domain::{TenantId, TenantRecord};
use portalsync_core::error::{AppError, Result};
use portalsync_core::port::TenantDirectory;
use tracing::debug;

#[async_trait]
impl TenantDirectory for SqliteNetwork {
    async fn resolve(&self, id: TenantId) -> Result<TenantRecord> {
        sqlx::query_as::<_, TenantRow>("SELECT id, domain FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(TenantRow::into_record)
            .ok_or(AppError::TenantNotFound(id))
    }

    async fn current_tenant_id(&self) -> Result<TenantId> {
        self.active()
    }

    async fn switch_to(&self, id: TenantId) -> Result<()> {
        // Refuse to enter a tenant that does not exist
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        if exists.is_none() {
            return Err(AppError::TenantNotFound(id));
        }

        self.push_context(id)?;
        debug!(tenant = id, "Entered tenant context");
        Ok(())
    }

    async fn switch_back(&self) -> Result<()> {
        let left = self.pop_context()?;
        debug!(tenant = left, "Left tenant context");
        Ok(())
    }
}
