// Tenant context guard
//
// Every cross-tenant access runs between `ensure(target)` and `restore()`.
// Only one level of nesting exists (home -> source -> home), so the guard
// compares against the recorded home tenant instead of counting depth.

use crate::domain::TenantId;
use crate::error::Result;
use crate::port::TenantDirectory;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct TenantContextGuard {
    directory: Arc<dyn TenantDirectory>,
    home: TenantId,
}

impl TenantContextGuard {
    /// Record the currently active tenant as home
    pub async fn new(directory: Arc<dyn TenantDirectory>) -> Result<Self> {
        let home = directory.current_tenant_id().await?;
        Ok(Self { directory, home })
    }

    pub fn home(&self) -> TenantId {
        self.home
    }

    /// Switch into `target` unless it is already active
    pub async fn ensure(&self, target: TenantId) -> Result<()> {
        let current = self.directory.current_tenant_id().await?;
        if current != target {
            debug!(from = current, to = target, "Switching tenant context");
            self.directory.switch_to(target).await?;
        }
        Ok(())
    }

    /// Switch back to home unless it is already active
    pub async fn restore(&self) -> Result<()> {
        let current = self.directory.current_tenant_id().await?;
        if current != self.home {
            debug!(from = current, to = self.home, "Restoring tenant context");
            self.directory.switch_back().await?;
        }
        Ok(())
    }

    /// Restore home, then hand back the outcome of the scoped work
    ///
    /// A failed restore after failed work is logged; the work's error wins.
    pub async fn restore_after<T>(&self, outcome: Result<T>) -> Result<T> {
        match (self.restore().await, outcome) {
            (Ok(()), outcome) => outcome,
            (Err(restore_err), Ok(_)) => Err(restore_err),
            (Err(restore_err), Err(work_err)) => {
                warn!(error = %restore_err, home = self.home, "Failed to restore tenant context");
                Err(work_err)
            }
        }
    }
}
