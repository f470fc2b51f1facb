// SQLite LinkBuilder Implementation
//
// Links point at the admin screens of the active tenant's domain.

use crate::network::SqliteNetwork;
use async_trait::async_trait;
use portalsync_core::domain::DocumentId;
use portalsync_core::error::Result;
use portalsync_core::port::{LinkBuilder, TenantDirectory};

impl SqliteNetwork {
    async fn admin_base(&self) -> Result<String> {
        let tenant = self.resolve(self.active()?).await?;
        Ok(format!("{}://{}/admin", self.admin_scheme(), tenant.domain))
    }
}

#[async_trait]
impl LinkBuilder for SqliteNetwork {
    async fn edit_link(&self, document: DocumentId) -> Result<String> {
        Ok(format!("{}/jobs/{}/edit", self.admin_base().await?, document))
    }

    async fn delete_link(&self, document: DocumentId) -> Result<String> {
        Ok(format!("{}/jobs/{}/delete", self.admin_base().await?, document))
    }
}
