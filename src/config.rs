//! Runtime configuration.
//!
//! Loaded from a TOML file; every field has a default so a missing or
//! unreadable file degrades to the built-in values with a warning rather
//! than aborting the run.

use std::path::Path;

use serde::Deserialize;

/// Default ceiling on items processed in one sweep.
const DEFAULT_MAX_ITEMS: usize = 10_000;

/// Default worker pool size for item assemblies within one listing page.
const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite connection string for the document store.
    pub database_url: String,
    /// Catalog listing URL without the page parameter.
    pub listing_base: String,
    /// Site root used to resolve relative item links.
    pub site_base: String,
    /// Stop dispatching item assemblies once this many items were processed.
    pub max_items: usize,
    /// Bounded worker pool size for assemblies within a single listing page.
    pub concurrency: usize,
    /// Re-check known items that dropped off the listing but are still live.
    pub recheck_stragglers: bool,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    /// Annotation passes to run per discussion entry, in order.
    pub annotators: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://crowdsync.db?mode=rwc".to_string(),
            listing_base: "https://www.kickstarter.com/discover/advanced?sort=newest".to_string(),
            site_base: "https://www.kickstarter.com".to_string(),
            max_items: DEFAULT_MAX_ITEMS,
            concurrency: DEFAULT_CONCURRENCY,
            recheck_stragglers: true,
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            annotators: vec!["language".to_string(), "sentiment".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when the
    /// file is missing or malformed.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("invalid config at {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "could not read config at {}: {e}, using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }
}
