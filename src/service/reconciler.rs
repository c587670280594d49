//! Two-phase reconciliation of the sweep against the store.
//!
//! Phase one runs inline with the sweep: every assembled item is
//! upserted and its identifier is removed from the working set of
//! previously stored identifiers. Phase two walks the leftover set (the
//! stragglers, items the listing no longer shows) and re-checks the ones
//! whose stored state is still live. Nothing is ever deleted.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::models::{Item, STATE_LIVE};
use crate::repository::ItemStore;
use crate::service::assembler::ItemAssembler;
use crate::service::sweeper::ItemSink;
use crate::service::CancelFlag;

#[derive(Debug, Default)]
pub struct RecheckOutcome {
    pub stragglers: usize,
    pub refreshed: usize,
    pub skipped: usize,
}

pub struct Reconciler {
    store: Arc<dyn ItemStore>,
    /// Identifiers stored before the sweep and not yet seen by it.
    working: Mutex<HashSet<i64>>,
    inserted: AtomicUsize,
    updated: AtomicUsize,
}

impl Reconciler {
    /// Snapshot the stored identifiers. A store failure here is fatal:
    /// without the snapshot phase two cannot tell stragglers apart.
    pub async fn load(store: Arc<dyn ItemStore>) -> anyhow::Result<Self> {
        let known = store
            .list_identifiers()
            .await
            .context("Failed to snapshot stored identifiers")?;
        tracing::info!("reconciling against {} stored items", known.len());
        Ok(Self {
            store,
            working: Mutex::new(known),
            inserted: AtomicUsize::new(0),
            updated: AtomicUsize::new(0),
        })
    }

    pub fn inserted(&self) -> usize {
        self.inserted.load(Ordering::Relaxed)
    }

    pub fn updated(&self) -> usize {
        self.updated.load(Ordering::Relaxed)
    }

    /// Phase two: re-assemble the still-live stragglers from their stored
    /// URLs. Store reads stay fatal; assembly failures skip the item just
    /// like they do during the sweep.
    pub async fn recheck_stragglers(
        &self,
        assembler: &ItemAssembler,
        cancel: &CancelFlag,
    ) -> anyhow::Result<RecheckOutcome> {
        let leftover: Vec<i64> = {
            let working = self.working.lock().await;
            working.iter().copied().collect()
        };

        let mut outcome = RecheckOutcome {
            stragglers: leftover.len(),
            ..RecheckOutcome::default()
        };
        tracing::info!("re-checking {} stragglers", leftover.len());

        for id in leftover {
            if cancel.is_cancelled() {
                break;
            }
            let Some(stored) = self
                .store
                .get_by_identifier(id)
                .await
                .context("Failed to read straggler")?
            else {
                continue;
            };
            if stored.state != STATE_LIVE {
                continue;
            }

            match assembler.assemble(&stored.url).await {
                Ok(item) => {
                    self.store.upsert(&item).await?;
                    tracing::info!("refreshed straggler {id} (state now {})", item.state());
                    outcome.refreshed += 1;
                }
                Err(e) => {
                    tracing::warn!("skipping straggler {id}: {e}");
                    outcome.skipped += 1;
                }
            }
        }

        Ok(outcome)
    }
}

#[async_trait]
impl ItemSink for Reconciler {
    async fn accept(&self, item: Item) -> anyhow::Result<()> {
        let is_new = !self.working.lock().await.remove(&item.id());
        if is_new {
            tracing::info!("inserting item {}", item.id());
            self.inserted.fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::info!("updating item {}", item.id());
            self.updated.fetch_add(1, Ordering::Relaxed);
        }
        self.store.upsert(&item).await
    }
}
