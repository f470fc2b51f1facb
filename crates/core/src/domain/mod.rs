// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod settings;
pub mod tenant;
pub mod term;

// Re-exports
pub use error::DomainError;
pub use job::{
    composite_id, display_title, DocumentId, JobDocument, MetaFilter, MetaKey, SyncJobFields,
    DEFAULT_AUTHOR_ID,
};
pub use settings::SyncSettings;
pub use tenant::{is_valid_tenant_id, parse_tenant_id, TenantId, TenantRecord};
pub use term::{group_terms, TermGroups, TermRecord};
