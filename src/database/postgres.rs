use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::time::Duration;
use tracing::info;

use super::{DocumentStore, StoreError};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection  TEXT        NOT NULL,
        id          TEXT        NOT NULL,
        body        JSONB       NOT NULL,
        seq         BIGSERIAL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (collection, id)
    )
"#;

/// Documents kept as JSONB rows in a single `documents` table
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        info!("Document table ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn insert(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO NOTHING",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(document))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(Json(body),)| body))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let rows: Vec<(Json<Value>,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = $1 ORDER BY seq")
                .bind(collection)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(Json(body),)| body).collect())
    }

    async fn replace(&self, collection: &str, id: &str, document: Value) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .bind(Json(document))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
