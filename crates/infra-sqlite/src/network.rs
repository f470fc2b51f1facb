// SQLite-backed multi-tenant network
//
// One pool holds every tenant's rows; scoping happens through the tenant
// context stack. `switch_to` pushes, `switch_back` pops, and an empty stack
// means the home tenant is active.

use portalsync_core::domain::{DocumentId, TenantId, TenantRecord, TermRecord};
use portalsync_core::error::{AppError, Result};
use sqlx::SqlitePool;
use std::sync::Mutex;
use tracing::{debug, info};

// Helper to convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Database(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "787" => AppError::Database(format!(
                        "Foreign key constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            }
            None => AppError::Database(format!("Database error: {}", db_err.message())),
        },
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// SQLite row representation of a tenant
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TenantRow {
    pub id: i64,
    pub domain: String,
}

impl TenantRow {
    pub fn into_record(self) -> TenantRecord {
        TenantRecord::new(self.id, self.domain)
    }
}

/// SQLite row representation of a term
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TermRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub taxonomy: String,
}

impl TermRow {
    pub fn into_record(self) -> TermRecord {
        TermRecord::new(self.id, self.name, self.slug, self.taxonomy)
    }
}

/// Every sync port over one SQLite database
pub struct SqliteNetwork {
    pub(crate) pool: SqlitePool,
    home: TenantId,
    context: Mutex<Vec<TenantId>>,
    admin_scheme: String,
}

impl SqliteNetwork {
    /// # Arguments
    /// * `pool` - Migrated pool
    /// * `home` - Tenant active when no switch is in effect
    pub fn new(pool: SqlitePool, home: TenantId) -> Self {
        Self {
            pool,
            home,
            context: Mutex::new(Vec::new()),
            admin_scheme: "https".to_string(),
        }
    }

    /// URL scheme of generated admin links (default: https)
    pub fn with_admin_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.admin_scheme = scheme.into();
        self
    }

    pub(crate) fn admin_scheme(&self) -> &str {
        &self.admin_scheme
    }

    /// Currently active tenant
    pub(crate) fn active(&self) -> Result<TenantId> {
        let stack = self
            .context
            .lock()
            .map_err(|_| AppError::Context("tenant context lock poisoned".to_string()))?;
        Ok(stack.last().copied().unwrap_or(self.home))
    }

    pub(crate) fn push_context(&self, id: TenantId) -> Result<()> {
        let mut stack = self
            .context
            .lock()
            .map_err(|_| AppError::Context("tenant context lock poisoned".to_string()))?;
        stack.push(id);
        Ok(())
    }

    pub(crate) fn pop_context(&self) -> Result<TenantId> {
        let mut stack = self
            .context
            .lock()
            .map_err(|_| AppError::Context("tenant context lock poisoned".to_string()))?;
        stack
            .pop()
            .ok_or_else(|| AppError::Context("no tenant context to restore".to_string()))
    }

    // ========== Network administration ==========

    /// Add a tenant to the network
    pub async fn register_tenant(&self, domain: &str) -> Result<TenantRecord> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(AppError::Validation("tenant domain cannot be empty".to_string()));
        }

        let id = sqlx::query("INSERT INTO tenants (domain, created_at) VALUES (?, ?)")
            .bind(domain)
            .bind(chrono::Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .last_insert_rowid();

        info!(tenant = id, domain, "Tenant registered");
        Ok(TenantRecord::new(id, domain))
    }

    pub async fn list_tenants(&self) -> Result<Vec<TenantRecord>> {
        let rows = sqlx::query_as::<_, TenantRow>("SELECT id, domain FROM tenants ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TenantRow::into_record).collect())
    }

    /// Create a document in `tenant`, independent of the active context
    pub async fn create_document(
        &self,
        tenant: TenantId,
        kind: &str,
        title: &str,
    ) -> Result<DocumentId> {
        let id = sqlx::query(
            "INSERT INTO documents (tenant_id, kind, title, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(tenant)
        .bind(kind)
        .bind(title)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .last_insert_rowid();

        debug!(tenant, document = id, kind, "Document created");
        Ok(id)
    }

    /// Attach a term (created on first use) to a document of `tenant`
    pub async fn assign_term(
        &self,
        tenant: TenantId,
        document: DocumentId,
        taxonomy: &str,
        name: &str,
        slug: &str,
    ) -> Result<TermRecord> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            "INSERT INTO terms (tenant_id, taxonomy, name, slug) VALUES (?, ?, ?, ?)
             ON CONFLICT(tenant_id, taxonomy, slug) DO NOTHING",
        )
        .bind(tenant)
        .bind(taxonomy)
        .bind(name)
        .bind(slug)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let term = sqlx::query_as::<_, TermRow>(
            "SELECT id, name, slug, taxonomy FROM terms
             WHERE tenant_id = ? AND taxonomy = ? AND slug = ?",
        )
        .bind(tenant)
        .bind(taxonomy)
        .bind(slug)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query(
            "INSERT OR IGNORE INTO document_terms (document_id, term_id, position)
             SELECT ?, ?, COUNT(*) FROM document_terms WHERE document_id = ?",
        )
        .bind(document)
        .bind(term.id)
        .bind(document)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(term.into_record())
    }
}
