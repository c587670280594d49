use anyhow::{Context, Result};
use rquest::Client;
use rquest_util::Emulation;
use std::time::Duration;

use crate::error::SyncError;

/// Factory for the browser-impersonating HTTP client every fetch goes
/// through.
pub fn create_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .emulation(Emulation::Firefox136)
        .build()
        .context("Failed to build impersonated rquest client")
}

/// Blocking-request-response page fetcher shared by every component that
/// touches the source site. Returns raw markup; parsing stays synchronous
/// on the caller's side.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: create_client()?,
        })
    }

    /// Fetch one page. Any transport error or non-2xx status is a
    /// `SyncError::Fetch`; the caller decides whether that skips an item
    /// or ends a walk.
    pub async fn fetch(&self, url: &str) -> Result<String, SyncError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::fetch(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::fetch(format!("GET {url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| SyncError::fetch(format!("reading body of {url}: {e}")))
    }
}
