// SQLite DocumentStore Implementation
//
// Every query is restricted to documents of the active tenant.

use crate::network::{map_sqlx_error, SqliteNetwork, TermRow};
use async_trait::async_trait;
use portalsync_core::domain::{DocumentId, JobDocument, MetaFilter, MetaKey, TermRecord};
use portalsync_core::error::{AppError, Result};
use portalsync_core::port::DocumentStore;
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    title: String,
}

#[async_trait]
impl DocumentStore for SqliteNetwork {
    async fn find_one(&self, kind: &str, filter: &MetaFilter) -> Result<Option<JobDocument>> {
        let tenant = self.active()?;

        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT d.id, d.title
            FROM documents d
            JOIN document_meta m ON m.document_id = d.id
            WHERE d.tenant_id = ? AND d.kind = ? AND m.meta_key = ? AND m.meta_value = ?
            ORDER BY d.created_at DESC, d.id DESC
            LIMIT 1
            "#,
        )
        .bind(tenant)
        .bind(kind)
        .bind(filter.key.as_str())
        .bind(filter.value.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|r| JobDocument {
            id: r.id,
            title: r.title,
        }))
    }

    async fn get_meta(&self, document: DocumentId, key: MetaKey) -> Result<Option<Value>> {
        let tenant = self.active()?;

        let raw: Option<String> = sqlx::query_scalar(
            r#"
            SELECT m.meta_value
            FROM document_meta m
            JOIN documents d ON d.id = m.document_id
            WHERE m.document_id = ? AND m.meta_key = ? AND d.tenant_id = ?
            "#,
        )
        .bind(document)
        .bind(key.as_str())
        .bind(tenant)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_meta(&self, document: DocumentId, key: MetaKey, value: Value) -> Result<()> {
        let tenant = self.active()?;

        // Upsert only when the document belongs to the active tenant
        let result = sqlx::query(
            r#"
            INSERT INTO document_meta (document_id, meta_key, meta_value)
            SELECT id, ?, ? FROM documents WHERE id = ? AND tenant_id = ?
            ON CONFLICT(document_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value
            "#,
        )
        .bind(key.as_str())
        .bind(value.to_string())
        .bind(document)
        .bind(tenant)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            debug!(tenant, document, %key, "Metadata write matched no document");
            return Err(AppError::NotFound(format!(
                "document {} in tenant {}",
                document, tenant
            )));
        }
        Ok(())
    }

    async fn delete_document(&self, document: DocumentId) -> Result<()> {
        let tenant = self.active()?;

        // Metadata and term links cascade
        let result = sqlx::query("DELETE FROM documents WHERE id = ? AND tenant_id = ?")
            .bind(document)
            .bind(tenant)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!(
            tenant,
            document,
            deleted = result.rows_affected(),
            "Document delete executed"
        );
        Ok(())
    }

    async fn get_terms(
        &self,
        document: DocumentId,
        taxonomies: &[String],
    ) -> Result<Vec<TermRecord>> {
        if taxonomies.is_empty() {
            return Ok(Vec::new());
        }
        let tenant = self.active()?;

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT t.id, t.name, t.slug, t.taxonomy \
             FROM document_terms dt \
             JOIN terms t ON t.id = dt.term_id \
             JOIN documents d ON d.id = dt.document_id \
             WHERE dt.document_id = ",
        );
        query.push_bind(document);
        query.push(" AND d.tenant_id = ");
        query.push_bind(tenant);
        query.push(" AND t.taxonomy IN (");
        let mut separated = query.separated(", ");
        for taxonomy in taxonomies {
            separated.push_bind(taxonomy.clone());
        }
        separated.push_unseparated(") ORDER BY dt.position, t.id");

        let rows = query
            .build_query_as::<TermRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TermRow::into_record).collect())
    }
}
