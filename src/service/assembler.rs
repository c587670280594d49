//! Item assembly: one URL in, one fully populated item out.
//!
//! Pure over fetched pages: no side effects beyond network reads, so
//! assembling the same unchanged item twice yields structurally equal
//! records. The base payload is mandatory (no partial items); the
//! auxiliary walks tolerate partial data.

use std::sync::Arc;

use crate::domain::models::{DiscussionEntry, Item, SentimentHistogram};
use crate::error::SyncError;
use crate::extractor::item_page::{
    extract_activity_entries, extract_description, extract_discussion_entries, extract_faq_count,
    extract_older_link, extract_risks, REMOVED_PLACEHOLDER,
};
use crate::extractor::payload::extract_payload;
use crate::service::enrichment::Enricher;
use crate::service::http::PageFetcher;
use crate::service::walker::{walk_cursor, walk_numbered};

pub struct ItemAssembler {
    fetcher: Arc<PageFetcher>,
    enricher: Enricher,
}

impl ItemAssembler {
    pub fn new(fetcher: Arc<PageFetcher>, enricher: Enricher) -> Self {
        Self { fetcher, enricher }
    }

    /// Assemble the item published at `url`. Fails as a whole when the
    /// item page or its embedded payload cannot be read; activity and
    /// discussion walks may contribute partial data without failing the
    /// item.
    pub async fn assemble(&self, url: &str) -> Result<Item, SyncError> {
        self.assemble_inner(url)
            .await
            .map_err(|e| SyncError::assembly(url, e))
    }

    async fn assemble_inner(&self, url: &str) -> Result<Item, SyncError> {
        let body = self.fetcher.fetch(url).await?;
        let base = extract_payload(&body)?
            .ok_or_else(|| SyncError::extraction("no embedded payload on item page"))?;
        let mut item = Item::from_base(base)?;
        let canonical = item
            .url()
            .ok_or_else(|| SyncError::extraction("payload carries no canonical URL"))?
            .to_string();

        // Description, risks and FAQ count live on a separate page.
        let description_page = self.fetcher.fetch(&format!("{canonical}/description")).await?;
        item.description = extract_description(&description_page);
        item.risks = extract_risks(&description_page);
        item.faq_count = extract_faq_count(&description_page);

        // The count indicators only decide whether to walk at all; the
        // walks themselves terminate on the empty/linkless page.
        if item.updates_count() > 0 {
            let updates_base = item
                .updates_url()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{canonical}/updates"));
            let walk = walk_numbered(&self.fetcher, &updates_base, extract_activity_entries).await;
            if !walk.complete {
                tracing::warn!(
                    "partial activity log for item {}: kept {} entries",
                    item.id(),
                    walk.records.len()
                );
            }
            item.updates = Some(walk.records);
        } else {
            item.updates = Some(Vec::new());
        }

        if item.comments_count() > 0 {
            let walk = walk_cursor(
                &self.fetcher,
                &format!("{canonical}/comments"),
                |page| self.discussion_page(page),
                extract_older_link,
            )
            .await;
            if !walk.complete {
                tracing::warn!(
                    "partial discussion thread for item {}: kept {} entries",
                    item.id(),
                    walk.records.len()
                );
            }
            item.sentiment_histogram = sum_histograms(&walk.records);
            item.comments = Some(walk.records);
        } else {
            item.comments = Some(Vec::new());
        }

        Ok(item)
    }

    /// Extract one discussion page: drop removed placeholders, annotate
    /// the retained entries.
    fn discussion_page(&self, page: &str) -> Vec<DiscussionEntry> {
        extract_discussion_entries(page)
            .into_iter()
            .filter(|raw| raw.body != REMOVED_PLACEHOLDER)
            .map(|raw| {
                let mut entry = DiscussionEntry::new(raw.body, raw.creator, raw.superbacker);
                self.enricher.annotate(&mut entry);
                entry
            })
            .collect()
    }
}

/// Vector sum of the per-entry histograms that have a value; `None` when
/// no entry carries one.
fn sum_histograms(entries: &[DiscussionEntry]) -> Option<SentimentHistogram> {
    let mut total = SentimentHistogram::default();
    let mut any = false;
    for entry in entries {
        if let Some(histogram) = &entry.sentiment {
            total.merge(histogram);
            any = true;
        }
    }
    any.then_some(total)
}
