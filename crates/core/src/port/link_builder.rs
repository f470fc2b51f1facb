// Link Builder Port (Interface)

use crate::domain::DocumentId;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use url::Url;

/// Admin URL construction for documents of the currently active tenant
#[async_trait]
pub trait LinkBuilder: Send + Sync {
    async fn edit_link(&self, document: DocumentId) -> Result<String>;

    async fn delete_link(&self, document: DocumentId) -> Result<String>;
}

/// Append `key=value` to the query string of an absolute URL
pub fn append_query_param(url: &str, key: &str, value: &str) -> Result<String> {
    let mut parsed = Url::parse(url)
        .map_err(|e| AppError::Validation(format!("invalid url '{}': {}", url, e)))?;
    parsed.query_pairs_mut().append_pair(key, value);
    Ok(parsed.into())
}
