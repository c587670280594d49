use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod assembler;
pub mod engine;
pub mod enrichment;
pub mod http;
pub mod reconciler;
pub mod sweeper;
pub mod walker;

pub use engine::{run_sync, SyncReport};

/// Cooperative shutdown flag, checked at page and item boundaries so a
/// cancelled run never leaves a half-written item behind.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
