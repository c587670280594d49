//! Shared fixtures for unit tests.

use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::domain::models::Item;

/// In-memory store with migrations applied. Single connection so every
/// query sees the same memory database.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory sqlite");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("failed to run migrations");
    pool
}

/// Minimal live item whose payload carries only what the engine reads.
pub fn live_item(id: i64, url: &str) -> Item {
    item_with_state(id, url, "live")
}

pub fn item_with_state(id: i64, url: &str, state: &str) -> Item {
    let base = json!({
        "id": id,
        "state": state,
        "updates_count": 0,
        "comments_count": 0,
        "urls": {
            "web": {
                "project": url,
                "updates": format!("{url}/updates")
            }
        }
    });
    Item::from_base(base.as_object().unwrap().clone()).unwrap()
}

/// HTML-escape a JSON document the way the source embeds it.
pub fn escape_payload(payload: &Value) -> String {
    payload
        .to_string()
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// An item page whose inline script carries the given payload.
pub fn item_page_html(payload: &Value) -> String {
    format!(
        r#"<html><head><script type="text/javascript">
  window.current_user = null;
  window.current_project = "{}";
</script></head><body><h1>item</h1></body></html>"#,
        escape_payload(payload)
    )
}
