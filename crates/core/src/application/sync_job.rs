// Sync Job - one portal <-> source link and its persisted configuration
//
// Job state lives in a document of the source tenant. Every read or write of
// that document runs inside the source tenant's context and returns home
// before the call completes.

use super::network_index::{IndexAction, NetworkIndex};
use super::tenant_guard::TenantContextGuard;
use super::SyncPorts;
use crate::domain::job::{decode_id, decode_names};
use crate::domain::{
    composite_id, display_title, group_terms, is_valid_tenant_id, DocumentId, MetaFilter, MetaKey,
    SyncJobFields, SyncSettings, TenantId, TenantRecord, TermGroups, TermRecord,
};
use crate::error::{AppError, Result};
use crate::port::append_query_param;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sync job entity
///
/// Built with [`SyncJob::load`]. Invalid tenant ids yield an unresolved job
/// whose fields all stay at their defaults; check [`SyncJob::is_resolved`].
pub struct SyncJob {
    ports: SyncPorts,
    settings: Arc<SyncSettings>,
    guard: Option<TenantContextGuard>,
    fields: SyncJobFields,
}

impl SyncJob {
    /// Look up the job linking `portal` and `source`
    ///
    /// # Arguments
    /// * `ports` - Tenant directory, document store, option store, link builder
    /// * `settings` - Job kind, placeholder titles, default author
    /// * `portal` - Tenant receiving synced content
    /// * `source` - Tenant whose content is synced out
    ///
    /// A missing job document is not an error: the job keeps default fields
    /// and a degenerate composite id `"<source>_"`.
    pub async fn load(
        ports: SyncPorts,
        settings: Arc<SyncSettings>,
        portal: TenantId,
        source: TenantId,
    ) -> Result<Self> {
        let mut job = Self {
            fields: SyncJobFields {
                author_id: settings.default_author,
                ..SyncJobFields::default()
            },
            ports,
            settings,
            guard: None,
        };

        if !is_valid_tenant_id(portal) || !is_valid_tenant_id(source) {
            warn!(portal, source, "Invalid tenant ids, sync job left unresolved");
            return Ok(job);
        }

        let portal_record = job.ports.tenants.resolve(portal).await?;
        let source_record = job.ports.tenants.resolve(source).await?;

        let guard = TenantContextGuard::new(job.ports.tenants.clone()).await?;
        guard.ensure(source_record.id).await?;
        let hydrated = job.hydrate(portal_record.id).await;
        guard.restore_after(hydrated).await?;

        job.fields.composite_id = Some(composite_id(source_record.id, job.fields.document_id));
        job.fields.portal = Some(portal_record);
        job.fields.source = Some(source_record);
        job.guard = Some(guard);

        debug!(
            portal,
            source,
            document_id = ?job.fields.document_id,
            "Sync job loaded"
        );
        Ok(job)
    }

    /// Read the job document of the active (source) tenant into `fields`
    async fn hydrate(&mut self, portal: TenantId) -> Result<()> {
        let filter = MetaFilter::new(MetaKey::Portal, portal);
        let Some(document) = self
            .ports
            .documents
            .find_one(&self.settings.job_kind, &filter)
            .await?
        else {
            debug!(portal, "No job document found");
            return Ok(());
        };

        let documents = &self.ports.documents;
        let post_types = decode_names(
            MetaKey::PostTypes,
            documents.get_meta(document.id, MetaKey::PostTypes).await?,
        )?;
        let taxonomies = decode_names(
            MetaKey::Taxonomies,
            documents.get_meta(document.id, MetaKey::Taxonomies).await?,
        )?;
        let author = decode_id(
            MetaKey::Author,
            documents.get_meta(document.id, MetaKey::Author).await?,
        )?;
        let terms = documents.get_terms(document.id, &taxonomies).await?;

        self.fields.title = display_title(
            &document.title,
            document.id,
            &self.settings.placeholder_titles,
        );
        self.fields.document_id = Some(document.id);
        self.fields.author_id = author.unwrap_or(self.settings.default_author);
        self.fields.terms = group_terms(
            terms
                .into_iter()
                .filter(|term| taxonomies.contains(&term.taxonomy)),
        );
        self.fields.post_types = post_types;
        self.fields.taxonomies = taxonomies;
        Ok(())
    }

    // ========== Accessors ==========

    /// Both tenants were valid and resolved
    pub fn is_resolved(&self) -> bool {
        self.fields.portal.is_some() && self.fields.source.is_some()
    }

    pub fn fields(&self) -> &SyncJobFields {
        &self.fields
    }

    pub fn portal(&self) -> Option<&TenantRecord> {
        self.fields.portal.as_ref()
    }

    pub fn source(&self) -> Option<&TenantRecord> {
        self.fields.source.as_ref()
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        self.fields.document_id
    }

    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn author_id(&self) -> i64 {
        self.fields.author_id
    }

    pub fn post_types(&self) -> &[String] {
        &self.fields.post_types
    }

    pub fn taxonomies(&self) -> &[String] {
        &self.fields.taxonomies
    }

    pub fn terms(&self) -> &TermGroups {
        &self.fields.terms
    }

    pub fn terms_for(&self, taxonomy: &str) -> &[TermRecord] {
        self.fields
            .terms
            .get(taxonomy)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of terms across all taxonomies
    pub fn term_count(&self) -> usize {
        self.fields.terms.values().map(Vec::len).sum()
    }

    /// `<source>_<document>`, computed once at load
    pub fn composite_id(&self) -> Option<&str> {
        self.fields.composite_id.as_deref()
    }

    // ========== Mutators ==========
    //
    // Each setter returns `Ok(false)` when there is nothing to write to: an
    // unresolved job or one without a backing document. Memory is left as is.

    pub async fn set_post_types(&mut self, post_types: Vec<String>) -> Result<bool> {
        let value = serde_json::to_value(&post_types)?;
        let document = self.fields.document_id;
        self.persist(document, MetaKey::PostTypes, value, move |fields| {
            fields.post_types = post_types;
        })
        .await
    }

    pub async fn set_taxonomies(&mut self, taxonomies: Vec<String>) -> Result<bool> {
        let value = serde_json::to_value(&taxonomies)?;
        let document = self.fields.document_id;
        self.persist(document, MetaKey::Taxonomies, value, move |fields| {
            fields.taxonomies = taxonomies;
        })
        .await
    }

    /// Set the author attributed to pushed content
    ///
    /// Returns `Ok(false)` without switching context or writing anything when
    /// `author` is not a positive id.
    pub async fn set_author(&mut self, author: i64) -> Result<bool> {
        if author <= 0 {
            debug!(author, "Ignoring invalid author id");
            return Ok(false);
        }

        let document = self.fields.document_id;
        self.persist(document, MetaKey::Author, Value::from(author), move |fields| {
            fields.author_id = author;
        })
        .await
    }

    /// [`set_author`](Self::set_author) for untyped input
    pub async fn set_author_raw(&mut self, raw: &str) -> Result<bool> {
        match raw.trim().parse::<i64>() {
            Ok(author) => self.set_author(author).await,
            Err(_) => {
                debug!(raw, "Ignoring non-numeric author id");
                Ok(false)
            }
        }
    }

    /// Attach a source-tenant document as this job's backing document
    ///
    /// Tags the document with the portal id. A document outside the source
    /// tenant is `AppError::NotFound`. The composite id is not re-derived.
    pub async fn set_document_id(&mut self, document: DocumentId) -> Result<bool> {
        let Some(portal) = self.fields.portal.as_ref().map(|p| p.id) else {
            debug!(document, "Cannot attach a document to an unresolved sync job");
            return Ok(false);
        };
        self.persist(
            Some(document),
            MetaKey::Portal,
            Value::from(portal),
            move |fields| {
                fields.document_id = Some(document);
            },
        )
        .await
    }

    /// Write one metadata key inside the source context, then mirror it in memory
    ///
    /// The in-memory field only changes once the store accepted the write.
    async fn persist<F>(
        &mut self,
        document: Option<DocumentId>,
        key: MetaKey,
        value: Value,
        apply: F,
    ) -> Result<bool>
    where
        F: FnOnce(&mut SyncJobFields) + Send,
    {
        let source = self.fields.source.as_ref().map(|s| s.id);
        let (Some(guard), Some(source), Some(document)) = (self.guard.as_ref(), source, document)
        else {
            debug!(%key, "No job document to write, nothing changed");
            return Ok(false);
        };

        guard.ensure(source).await?;
        let written = self.ports.documents.set_meta(document, key, value).await;
        if written.is_ok() {
            apply(&mut self.fields);
            debug!(source, document, %key, "Job metadata written");
        }
        guard.restore_after(written).await?;
        Ok(true)
    }

    // ========== Links ==========

    /// Admin edit link carrying the portal id as `portal=<id>`
    pub async fn edit_link(&self) -> Result<Option<String>> {
        let Some(url) = self.link(true).await? else {
            return Ok(None);
        };
        let portal = self.fields.portal.as_ref().map(|p| p.id).unwrap_or_default();
        append_query_param(&url, "portal", &portal.to_string()).map(Some)
    }

    pub async fn delete_link(&self) -> Result<Option<String>> {
        self.link(false).await
    }

    async fn link(&self, edit: bool) -> Result<Option<String>> {
        let source = self.fields.source.as_ref().map(|s| s.id);
        let (Some(guard), Some(source), Some(document)) =
            (self.guard.as_ref(), source, self.fields.document_id)
        else {
            return Ok(None);
        };

        guard.ensure(source).await?;
        let url = if edit {
            self.ports.links.edit_link(document).await
        } else {
            self.ports.links.delete_link(document).await
        };
        guard.restore_after(url).await.map(Some)
    }

    // ========== Lifecycle ==========

    /// Register the (portal, source) pair in the network index
    pub async fn register(&self) -> Result<()> {
        let (Some(portal), Some(source)) =
            (self.fields.portal.as_ref(), self.fields.source.as_ref())
        else {
            warn!("Cannot register an unresolved sync job");
            return Ok(());
        };

        self.index()
            .update(IndexAction::Add, portal.id, source.id)
            .await?;
        info!(portal = portal.id, source = source.id, "Sync job registered");
        Ok(())
    }

    /// Delete the job document and deregister the pair from the network index
    ///
    /// Deleting an already missing document is not distinguished from success.
    pub async fn delete(&mut self) -> Result<()> {
        let (Some(guard), Some(portal), Some(source)) = (
            self.guard.as_ref(),
            self.fields.portal.as_ref().map(|p| p.id),
            self.fields.source.as_ref().map(|s| s.id),
        ) else {
            warn!("Cannot delete an unresolved sync job");
            return Ok(());
        };

        if let Some(document) = self.fields.document_id {
            guard.ensure(source).await?;
            let deleted = self.ports.documents.delete_document(document).await;
            guard.restore_after(deleted).await?;
        }

        self.index()
            .update(IndexAction::Delete, portal, source)
            .await?;

        info!(
            portal,
            source,
            document_id = ?self.fields.document_id,
            "Sync job deleted"
        );
        self.fields.document_id = None;
        Ok(())
    }

    fn index(&self) -> NetworkIndex {
        NetworkIndex::new(self.ports.options.clone(), self.settings.clone())
    }
}

/// Entry point for loading sync jobs
pub struct SyncJobService {
    ports: SyncPorts,
    settings: Arc<SyncSettings>,
}

impl SyncJobService {
    pub fn new(ports: SyncPorts, settings: SyncSettings) -> Self {
        Self {
            ports,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn index(&self) -> NetworkIndex {
        NetworkIndex::new(self.ports.options.clone(), self.settings.clone())
    }

    /// Load the job linking `portal` and `source`
    pub async fn load(&self, portal: TenantId, source: TenantId) -> Result<SyncJob> {
        SyncJob::load(self.ports.clone(), self.settings.clone(), portal, source).await
    }

    /// Jobs for every source registered with `portal`, in index order
    pub async fn jobs_for_portal(&self, portal: TenantId) -> Result<Vec<SyncJob>> {
        let sources = self.index().sources_of(portal).await?;
        self.load_pairs(sources.into_iter().map(|source| (portal, source)))
            .await
    }

    /// Jobs for every portal registered with `source`, in index order
    pub async fn jobs_for_source(&self, source: TenantId) -> Result<Vec<SyncJob>> {
        let portals = self.index().portals_of(source).await?;
        self.load_pairs(portals.into_iter().map(|portal| (portal, source)))
            .await
    }

    /// Load each pair, skipping pairs whose tenant left the network
    async fn load_pairs<I>(&self, pairs: I) -> Result<Vec<SyncJob>>
    where
        I: IntoIterator<Item = (TenantId, TenantId)>,
    {
        let mut jobs = Vec::new();
        for (portal, source) in pairs {
            match self.load(portal, source).await {
                Ok(job) => jobs.push(job),
                Err(AppError::TenantNotFound(missing)) => {
                    warn!(portal, source, missing, "Skipping indexed job of a removed tenant");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(jobs)
    }
}
