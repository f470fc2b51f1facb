// Network Option Store Port (Interface)

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Network-wide key/value options, visible from every tenant context
#[async_trait]
pub trait NetworkOptionStore: Send + Sync {
    async fn get_option(&self, key: &str) -> Result<Option<Value>>;

    async fn set_option(&self, key: &str, value: Value) -> Result<()>;
}
