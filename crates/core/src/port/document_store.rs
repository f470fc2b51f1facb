// Scoped Document Store Port (Interface)

use crate::domain::{DocumentId, JobDocument, MetaFilter, MetaKey, TermRecord};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Document, metadata and term storage of the currently active tenant
///
/// Every call is scoped to the tenant made active through
/// [`TenantDirectory`](super::TenantDirectory).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Most recent document of `kind` matching `filter`
    async fn find_one(&self, kind: &str, filter: &MetaFilter) -> Result<Option<JobDocument>>;

    /// Read a scoped metadata value
    async fn get_meta(&self, document: DocumentId, key: MetaKey) -> Result<Option<Value>>;

    /// Write (insert or replace) a scoped metadata value
    async fn set_meta(&self, document: DocumentId, key: MetaKey, value: Value) -> Result<()>;

    /// Delete a document with its metadata; absent documents are not an error
    async fn delete_document(&self, document: DocumentId) -> Result<()>;

    /// Terms assigned to a document, restricted to `taxonomies`
    async fn get_terms(&self, document: DocumentId, taxonomies: &[String])
        -> Result<Vec<TermRecord>>;
}
