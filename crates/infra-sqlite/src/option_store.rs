// SQLite NetworkOptionStore Implementation

use crate::network::{map_sqlx_error, SqliteNetwork};
use async_trait::async_trait;
use portalsync_core::error::Result;
use portalsync_core::port::NetworkOptionStore;
use serde_json::Value;

#[async_trait]
impl NetworkOptionStore for SqliteNetwork {
    async fn get_option(&self, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT option_value FROM network_options WHERE option_key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_option(&self, key: &str, value: Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO network_options (option_key, option_value) VALUES (?, ?)
            ON CONFLICT(option_key) DO UPDATE SET option_value = excluded.option_value
            "#,
        )
        .bind(key)
        .bind(value.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
