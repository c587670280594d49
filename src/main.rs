use std::path::Path;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crowdsync::config::Config;
use crowdsync::db::init_db;
use crowdsync::service::enrichment::Enricher;
use crowdsync::service::{run_sync, CancelFlag};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "crowdsync.toml".to_string());
    let config = Config::load(Path::new(&config_path));

    let pool = init_db(&config.database_url).await?;

    let cancel = CancelFlag::default();
    let ctrl_c_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("shutdown requested, finishing the current items");
            ctrl_c_flag.cancel();
        }
    });

    // No detector or classifier ships with the binary; real ones plug in
    // behind the enrichment traits.
    let enricher = Enricher::configure(&config.enrichment, None, None);
    let report = run_sync(&config, pool, enricher, cancel).await?;

    tracing::info!(
        "sync finished ({:?}): {} pages, {} inserted, {} updated, {} refreshed stragglers (of {}), {} skipped",
        report.stop_reason,
        report.pages,
        report.inserted,
        report.updated,
        report.refreshed,
        report.stragglers,
        report.skipped
    );

    Ok(())
}
