// In-memory network used by application tests

use crate::domain::{
    DocumentId, JobDocument, MetaFilter, MetaKey, TenantId, TenantRecord, TermRecord,
};
use crate::error::{AppError, Result};
use crate::port::{DocumentStore, LinkBuilder, NetworkOptionStore, TenantDirectory};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

const HOME_TENANT: TenantId = 1;

struct StoredDocument {
    id: DocumentId,
    tenant: TenantId,
    kind: String,
    title: String,
    meta: HashMap<MetaKey, Value>,
    terms: Vec<TermRecord>,
}

#[derive(Default)]
struct State {
    tenants: HashMap<TenantId, TenantRecord>,
    stack: Vec<TenantId>,
    documents: Vec<StoredDocument>,
    options: HashMap<String, Value>,
    switches: usize,
    meta_writes: usize,
    fail_meta_writes: bool,
    fail_reads: bool,
}

impl State {
    fn active(&self) -> TenantId {
        self.stack.last().copied().unwrap_or(HOME_TENANT)
    }

    fn document_mut(&mut self, id: DocumentId) -> Option<&mut StoredDocument> {
        let tenant = self.active();
        self.documents
            .iter_mut()
            .find(|d| d.id == id && d.tenant == tenant)
    }
}

/// Every port over shared in-memory state; tenant 1 is home
pub(crate) struct InMemoryNetwork {
    state: Mutex<State>,
}

impl InMemoryNetwork {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    pub fn add_tenant(&self, id: TenantId, domain: &str) {
        let mut state = self.state.lock().unwrap();
        state.tenants.insert(id, TenantRecord::new(id, domain));
    }

    pub fn add_document(&self, tenant: TenantId, id: DocumentId, kind: &str, title: &str) {
        let mut state = self.state.lock().unwrap();
        state.documents.push(StoredDocument {
            id,
            tenant,
            kind: kind.to_string(),
            title: title.to_string(),
            meta: HashMap::new(),
            terms: Vec::new(),
        });
    }

    pub fn put_meta(&self, tenant: TenantId, id: DocumentId, key: MetaKey, value: Value) {
        let mut state = self.state.lock().unwrap();
        if let Some(doc) = state
            .documents
            .iter_mut()
            .find(|d| d.id == id && d.tenant == tenant)
        {
            doc.meta.insert(key, value);
        }
    }

    pub fn put_term(&self, tenant: TenantId, id: DocumentId, term: TermRecord) {
        let mut state = self.state.lock().unwrap();
        if let Some(doc) = state
            .documents
            .iter_mut()
            .find(|d| d.id == id && d.tenant == tenant)
        {
            doc.terms.push(term);
        }
    }

    pub fn meta(&self, tenant: TenantId, id: DocumentId, key: MetaKey) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state
            .documents
            .iter()
            .find(|d| d.id == id && d.tenant == tenant)
            .and_then(|d| d.meta.get(&key).cloned())
    }

    pub fn has_document(&self, tenant: TenantId, id: DocumentId) -> bool {
        let state = self.state.lock().unwrap();
        state
            .documents
            .iter()
            .any(|d| d.id == id && d.tenant == tenant)
    }

    pub fn option(&self, key: &str) -> Option<Value> {
        self.state.lock().unwrap().options.get(key).cloned()
    }

    pub fn active_tenant(&self) -> TenantId {
        self.state.lock().unwrap().active()
    }

    pub fn depth(&self) -> usize {
        self.state.lock().unwrap().stack.len()
    }

    pub fn switch_count(&self) -> usize {
        self.state.lock().unwrap().switches
    }

    pub fn meta_writes(&self) -> usize {
        self.state.lock().unwrap().meta_writes
    }

    pub fn fail_meta_writes(&self) {
        self.state.lock().unwrap().fail_meta_writes = true;
    }

    pub fn fail_reads(&self) {
        self.state.lock().unwrap().fail_reads = true;
    }

    pub fn remove_document(&self, tenant: TenantId, id: DocumentId) {
        let mut state = self.state.lock().unwrap();
        state
            .documents
            .retain(|d| !(d.id == id && d.tenant == tenant));
    }
}

#[async_trait]
impl TenantDirectory for InMemoryNetwork {
    async fn resolve(&self, id: TenantId) -> Result<TenantRecord> {
        let state = self.state.lock().unwrap();
        state
            .tenants
            .get(&id)
            .cloned()
            .ok_or(AppError::TenantNotFound(id))
    }

    async fn current_tenant_id(&self) -> Result<TenantId> {
        Ok(self.state.lock().unwrap().active())
    }

    async fn switch_to(&self, id: TenantId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.tenants.contains_key(&id) {
            return Err(AppError::TenantNotFound(id));
        }
        state.stack.push(id);
        state.switches += 1;
        Ok(())
    }

    async fn switch_back(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| AppError::Context("no tenant context to restore".to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryNetwork {
    async fn find_one(&self, kind: &str, filter: &MetaFilter) -> Result<Option<JobDocument>> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(AppError::Database("document lookup rejected".to_string()));
        }
        let tenant = state.active();
        Ok(state
            .documents
            .iter()
            .rev()
            .find(|d| {
                d.tenant == tenant
                    && d.kind == kind
                    && d.meta.get(&filter.key) == Some(&filter.value)
            })
            .map(|d| JobDocument {
                id: d.id,
                title: d.title.clone(),
            }))
    }

    async fn get_meta(&self, document: DocumentId, key: MetaKey) -> Result<Option<Value>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(AppError::Database("metadata read rejected".to_string()));
        }
        Ok(state
            .document_mut(document)
            .and_then(|d| d.meta.get(&key).cloned()))
    }

    async fn set_meta(&self, document: DocumentId, key: MetaKey, value: Value) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_meta_writes {
            return Err(AppError::Database("metadata write rejected".to_string()));
        }
        state.meta_writes += 1;
        let tenant = state.active();
        let doc = state.document_mut(document).ok_or_else(|| {
            AppError::NotFound(format!("document {} in tenant {}", document, tenant))
        })?;
        doc.meta.insert(key, value);
        Ok(())
    }

    async fn delete_document(&self, document: DocumentId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let tenant = state.active();
        state
            .documents
            .retain(|d| !(d.id == document && d.tenant == tenant));
        Ok(())
    }

    async fn get_terms(
        &self,
        document: DocumentId,
        taxonomies: &[String],
    ) -> Result<Vec<TermRecord>> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .document_mut(document)
            .map(|d| {
                d.terms
                    .iter()
                    .filter(|t| taxonomies.contains(&t.taxonomy))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl NetworkOptionStore for InMemoryNetwork {
    async fn get_option(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.state.lock().unwrap().options.get(key).cloned())
    }

    async fn set_option(&self, key: &str, value: Value) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .options
            .insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl LinkBuilder for InMemoryNetwork {
    async fn edit_link(&self, document: DocumentId) -> Result<String> {
        let state = self.state.lock().unwrap();
        let tenant = state.active();
        let domain = state
            .tenants
            .get(&tenant)
            .map(|t| t.domain.clone())
            .ok_or(AppError::TenantNotFound(tenant))?;
        Ok(format!("https://{}/admin/jobs/{}/edit", domain, document))
    }

    async fn delete_link(&self, document: DocumentId) -> Result<String> {
        let state = self.state.lock().unwrap();
        let tenant = state.active();
        let domain = state
            .tenants
            .get(&tenant)
            .map(|t| t.domain.clone())
            .ok_or(AppError::TenantNotFound(tenant))?;
        Ok(format!("https://{}/admin/jobs/{}/delete", domain, document))
    }
}
