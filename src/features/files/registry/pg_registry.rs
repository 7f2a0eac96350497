use async_trait::async_trait;
use serde_json::json;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;

use super::file_registry::{registry_key, FileRegistry};
use crate::core::error::Result;
use crate::features::files::models::StoredFile;

/// Registry backed by the `file_registry` key/value table. Each owner's
/// list is one JSONB array; writes lock the row for the whole
/// read-modify-write.
pub struct PgFileRegistry {
    pool: PgPool,
}

impl PgFileRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRegistry for PgFileRegistry {
    async fn list(&self, owner_id: &str) -> Result<Vec<StoredFile>> {
        let row: Option<(Json<Vec<StoredFile>>,)> =
            sqlx::query_as("SELECT value FROM file_registry WHERE key = $1")
                .bind(registry_key(owner_id))
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(Json(files),)| files).unwrap_or_default())
    }

    async fn append(&self, owner_id: &str, file: StoredFile) -> Result<()> {
        let key = registry_key(owner_id);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO file_registry (key, value) VALUES ($1, '[]'::jsonb) \
             ON CONFLICT (key) DO NOTHING",
        )
        .bind(&key)
        .execute(&mut *tx)
        .await?;

        let (Json(mut files),): (Json<Vec<StoredFile>>,) =
            sqlx::query_as("SELECT value FROM file_registry WHERE key = $1 FOR UPDATE")
                .bind(&key)
                .fetch_one(&mut *tx)
                .await?;

        files.push(file);

        sqlx::query("UPDATE file_registry SET value = $2, updated_at = NOW() WHERE key = $1")
            .bind(&key)
            .bind(Json(&files))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Registry '{}' now holds {} files", key, files.len());
        Ok(())
    }

    async fn remove(&self, owner_id: &str, file_id: &str) -> Result<Option<StoredFile>> {
        let key = registry_key(owner_id);
        let mut tx = self.pool.begin().await?;

        let row: Option<(Json<Vec<StoredFile>>,)> =
            sqlx::query_as("SELECT value FROM file_registry WHERE key = $1 FOR UPDATE")
                .bind(&key)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((Json(mut files),)) = row else {
            return Ok(None);
        };

        let Some(index) = files.iter().position(|f| f.id == file_id) else {
            return Ok(None);
        };
        let removed = files.remove(index);

        sqlx::query("UPDATE file_registry SET value = $2, updated_at = NOW() WHERE key = $1")
            .bind(&key)
            .bind(Json(&files))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(removed))
    }

    async fn find(&self, file_id: &str) -> Result<Option<StoredFile>> {
        let row: Option<(Json<StoredFile>,)> = sqlx::query_as(
            "SELECT elem FROM file_registry, jsonb_array_elements(value) AS elem \
             WHERE value @> $1 AND elem->>'id' = $2 \
             LIMIT 1",
        )
        .bind(Json(json!([{ "id": file_id }])))
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(file),)| file))
    }
}
