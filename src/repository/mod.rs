use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{Item, StoredItem};

pub mod sqlite;

pub use sqlite::SqliteItemStore;

/// Persistence gateway for item documents, keyed by the source-assigned
/// identifier (not an internal storage key).
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Project the identifiers of every stored item.
    async fn list_identifiers(&self) -> Result<HashSet<i64>>;

    /// URL and lifecycle state of one stored item, if present.
    async fn get_by_identifier(&self, id: i64) -> Result<Option<StoredItem>>;

    /// Insert-or-replace the full record for an item.
    async fn upsert(&self, item: &Item) -> Result<()>;
}
