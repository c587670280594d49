//! SQLite-backed item store.

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::domain::models::{Item, StoredItem};
use crate::repository::ItemStore;

pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn list_identifiers(&self) -> Result<HashSet<i64>> {
        let rows = sqlx::query("SELECT id FROM items")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list item identifiers")?;

        Ok(rows.into_iter().map(|row| row.get::<i64, _>("id")).collect())
    }

    async fn get_by_identifier(&self, id: i64) -> Result<Option<StoredItem>> {
        let row = sqlx::query("SELECT id, url, state FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch stored item")?;

        Ok(row.map(|row| StoredItem {
            id: row.get("id"),
            url: row.get("url"),
            state: row.get("state"),
        }))
    }

    async fn upsert(&self, item: &Item) -> Result<()> {
        let url = item
            .url()
            .context("item payload carries no canonical URL")?;
        let record = serde_json::to_string(&item.to_record())
            .context("Failed to serialize item record")?;

        sqlx::query(
            r#"
            INSERT INTO items (id, url, state, record, synced_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                url = excluded.url,
                state = excluded.state,
                record = excluded.record,
                synced_at = excluded.synced_at
            "#,
        )
        .bind(item.id())
        .bind(url)
        .bind(item.state())
        .bind(&record)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to upsert item")?;

        Ok(())
    }
}
