//! Top-level sync run: wires the store, fetcher, assembler, sweeper and
//! reconciler together and runs the two phases in order.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::repository::{ItemStore, SqliteItemStore};
use crate::service::assembler::ItemAssembler;
use crate::service::enrichment::Enricher;
use crate::service::http::PageFetcher;
use crate::service::reconciler::Reconciler;
use crate::service::sweeper::{ListingSweeper, StopReason};
use crate::service::CancelFlag;

/// Counters of one completed sync run.
#[derive(Debug)]
pub struct SyncReport {
    pub pages: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub stragglers: usize,
    pub refreshed: usize,
    pub stop_reason: StopReason,
}

/// Run one full sync: sweep the listing, reconcile against the store,
/// then re-check the still-live stragglers unless disabled or cancelled.
pub async fn run_sync(
    config: &Config,
    pool: SqlitePool,
    enricher: Enricher,
    cancel: CancelFlag,
) -> anyhow::Result<SyncReport> {
    let store: Arc<dyn ItemStore> = Arc::new(SqliteItemStore::new(pool));
    let fetcher = Arc::new(PageFetcher::new()?);
    let assembler = Arc::new(ItemAssembler::new(Arc::clone(&fetcher), enricher));
    let sweeper = ListingSweeper::new(
        Arc::clone(&fetcher),
        Arc::clone(&assembler),
        config,
        cancel.clone(),
    )?;

    let reconciler = Reconciler::load(store).await?;
    let sweep = sweeper.sweep(&reconciler).await?;
    tracing::info!(
        "sweep done: {} pages, {} assembled, {} skipped ({:?})",
        sweep.pages,
        sweep.assembled,
        sweep.skipped,
        sweep.reason
    );

    let recheck = if config.recheck_stragglers && !cancel.is_cancelled() {
        reconciler.recheck_stragglers(&assembler, &cancel).await?
    } else {
        Default::default()
    };

    Ok(SyncReport {
        pages: sweep.pages,
        inserted: reconciler.inserted(),
        updated: reconciler.updated(),
        skipped: sweep.skipped + recheck.skipped,
        stragglers: recheck.stragglers,
        refreshed: recheck.refreshed,
        stop_reason: sweep.reason,
    })
}
