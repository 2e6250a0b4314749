use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::error::Result;

/// durable string key -> string value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// key-value storage backed by the `kv_store` table.
pub struct SqliteStore {
    db: Pool<Sqlite>,
}

impl SqliteStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<(String,)> = sqlx::query_as(
            r#"
                SELECT
                    value
                FROM kv_store
                WHERE key = $1;
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .inspect_err(
            |e| tracing::error!(err = ?e, key = %key, "an error occurred when reading from kv store"),
        )?;

        Ok(value.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
                INSERT INTO
                    kv_store (key, value)
                VALUES
                    ($1, $2)
                ON CONFLICT (key)
                DO UPDATE SET
                    value = excluded.value;
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .inspect_err(
            |e| tracing::error!(err = ?e, key = %key, "an error occurred when writing to kv store"),
        )?;

        Ok(())
    }
}
