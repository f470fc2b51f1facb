// Port Layer - Interfaces for external collaborators

pub mod document_store;
pub mod link_builder;
pub mod option_store;
pub mod tenant_directory;

// Re-exports
pub use document_store::DocumentStore;
pub use link_builder::{append_query_param, LinkBuilder};
pub use option_store::NetworkOptionStore;
pub use tenant_directory::TenantDirectory;
