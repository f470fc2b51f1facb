// Portal Sync Infrastructure - SQLite Adapter
// Implements: TenantDirectory, DocumentStore, NetworkOptionStore, LinkBuilder

mod connection;
mod document_store;
mod link_builder;
mod migration;
mod network;
mod option_store;
mod tenant_directory;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use network::SqliteNetwork;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
