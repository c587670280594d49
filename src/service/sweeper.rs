//! Listing sweep: page-by-page traversal of the catalog listing.
//!
//! Pages are fetched strictly in order; the items of one page are
//! assembled through a bounded worker pool before the next page is
//! requested, so the processed-item ceiling keeps page-order semantics.
//! An item that fails to assemble is logged and skipped, never aborting
//! the sweep.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use url::Url;

use crate::config::Config;
use crate::domain::models::Item;
use crate::error::SyncError;
use crate::extractor::listing::{extract_item_refs, ItemRef};
use crate::service::http::PageFetcher;
use crate::service::walker::page_url;
use crate::service::CancelFlag;
use crate::service::assembler::ItemAssembler;

/// Consumer of successfully assembled items. Errors out of the sink are
/// store-level failures and abort the sweep.
#[async_trait]
pub trait ItemSink: Send + Sync {
    async fn accept(&self, item: Item) -> anyhow::Result<()>;
}

/// Why the sweep stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A listing page yielded zero item references.
    Exhausted,
    /// The configured processed-item ceiling was reached.
    ItemCeiling,
    /// The cancel flag was raised at a page boundary.
    Cancelled,
    /// A listing page could not be fetched; the sweep ends early.
    ListingFetchFailed,
}

#[derive(Debug)]
pub struct SweepOutcome {
    pub pages: usize,
    pub dispatched: usize,
    pub assembled: usize,
    pub skipped: usize,
    pub reason: StopReason,
}

pub struct ListingSweeper {
    fetcher: Arc<PageFetcher>,
    assembler: Arc<ItemAssembler>,
    listing_base: String,
    site_base: Url,
    max_items: usize,
    concurrency: usize,
    cancel: CancelFlag,
}

impl ListingSweeper {
    pub fn new(
        fetcher: Arc<PageFetcher>,
        assembler: Arc<ItemAssembler>,
        config: &Config,
        cancel: CancelFlag,
    ) -> Result<Self, SyncError> {
        let site_base = Url::parse(&config.site_base)
            .map_err(|e| SyncError::InvalidUrl(format!("{}: {e}", config.site_base)))?;
        Ok(Self {
            fetcher,
            assembler,
            listing_base: config.listing_base.clone(),
            site_base,
            max_items: config.max_items,
            concurrency: config.concurrency.max(1),
            cancel,
        })
    }

    /// Run one full sweep, feeding every assembled item to `sink`.
    pub async fn sweep(&self, sink: &dyn ItemSink) -> anyhow::Result<SweepOutcome> {
        let mut page = 1usize;
        let mut pages = 0usize;
        let mut dispatched = 0usize;
        let mut assembled = 0usize;
        let mut skipped = 0usize;

        let reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let url = page_url(&self.listing_base, page);
            tracing::info!("sweeping listing page {page}: {url}");
            let body = match self.fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("listing page {page} unavailable, ending sweep: {e}");
                    break StopReason::ListingFetchFailed;
                }
            };
            pages += 1;

            let refs = extract_item_refs(&body, &self.site_base);
            if refs.is_empty() {
                break StopReason::Exhausted;
            }

            let quota = self.max_items - dispatched;
            let batch: Vec<ItemRef> = refs.into_iter().take(quota).collect();

            // `None` marks a reference whose dispatch was suppressed by a
            // cancel raised while the batch was in flight.
            let results: Vec<(ItemRef, Option<Result<Item, SyncError>>)> = stream::iter(batch)
                .map(|item_ref| {
                    let assembler = Arc::clone(&self.assembler);
                    let cancel = self.cancel.clone();
                    async move {
                        if cancel.is_cancelled() {
                            return (item_ref, None);
                        }
                        tracing::info!("assembling item {}: {}", item_ref.id, item_ref.url);
                        let result = assembler.assemble(&item_ref.url).await;
                        (item_ref, Some(result))
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            for (item_ref, result) in results {
                let Some(result) = result else { continue };
                dispatched += 1;
                match result {
                    Ok(item) => {
                        if self.cancel.is_cancelled() {
                            break;
                        }
                        sink.accept(item).await?;
                        assembled += 1;
                    }
                    Err(e) => {
                        tracing::warn!("skipping item {}: {e}", item_ref.id);
                        skipped += 1;
                    }
                }
            }

            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if dispatched >= self.max_items {
                break StopReason::ItemCeiling;
            }
            page += 1;
        };

        Ok(SweepOutcome {
            pages,
            dispatched,
            assembled,
            skipped,
            reason,
        })
    }
}
