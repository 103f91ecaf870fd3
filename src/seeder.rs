//! Drives each catalog item through search, download, write and upsert.

use tracing::{error, info, warn};

use crate::catalog::{Catalog, CatalogItem};
use crate::db::ResourceStore;
use crate::db::entities::resources::UpsertOutcome;
use crate::error::SeederError;
use crate::fetch::{Fetcher, infer_extension};
use crate::persist::{AcquiredAsset, PersistedFile, UploadDir};
use crate::search::{Candidate, SearchFilters, SearchProvider};

/// How a single item went.
#[derive(Debug)]
pub enum ItemOutcome {
    /// A file was written and the record points at it.
    Seeded {
        /// The new thumbnail.
        file: PersistedFile,
        /// Whether the record was created or updated.
        upsert: UpsertOutcome,
    },
    /// Search came back empty or every candidate failed to download.
    NotFound,
    /// Something errored along the way.
    Failed(String),
}

/// Tally for a whole run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    /// Items with a fresh thumbnail.
    pub seeded: usize,
    /// Items where nothing could be acquired.
    pub not_found: usize,
    /// Items that errored.
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Seeded { .. } => self.seeded += 1,
            ItemOutcome::NotFound => self.not_found += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Everything needed to seed items, borrowed for the length of a run.
pub struct Seeder<'a> {
    provider: &'a dyn SearchProvider,
    fetcher: &'a Fetcher,
    uploads: &'a UploadDir,
    store: &'a ResourceStore,
    filters: SearchFilters,
    max_attempts: u32,
}

impl<'a> Seeder<'a> {
    /// Wires the pieces together.
    pub fn new(
        provider: &'a dyn SearchProvider,
        fetcher: &'a Fetcher,
        uploads: &'a UploadDir,
        store: &'a ResourceStore,
        filters: SearchFilters,
        max_attempts: u32,
    ) -> Self {
        Self {
            provider,
            fetcher,
            uploads,
            store,
            filters,
            max_attempts,
        }
    }

    /// Seeds every item in catalog order. One item failing never stops the run.
    pub async fn run(&self, catalog: &Catalog) -> RunSummary {
        let mut summary = RunSummary::default();
        for item in catalog.items() {
            let outcome = self.seed_item(item).await;
            summary.record(&outcome);
        }
        info!(
            "Done! seeded={} not_found={} failed={}",
            summary.seeded, summary.not_found, summary.failed
        );
        summary
    }

    /// Runs one item through the pipeline and logs how it went.
    pub async fn seed_item(&self, item: &CatalogItem) -> ItemOutcome {
        info!("Searching {} for: {}", self.provider.name(), item.name);
        let outcome = match self.acquire(item).await {
            Ok(Some(file)) => match self.store.upsert(item, &file.public_path).await {
                Ok(upsert) => ItemOutcome::Seeded { file, upsert },
                Err(err) => ItemOutcome::Failed(err.to_string()),
            },
            Ok(None) => ItemOutcome::NotFound,
            Err(err) => ItemOutcome::Failed(err.to_string()),
        };

        match &outcome {
            ItemOutcome::Seeded { .. } => info!("Seeded {}", item.name),
            ItemOutcome::NotFound => warn!("No files found for {}", item.name),
            ItemOutcome::Failed(reason) => error!("Error on {}: {reason}", item.name),
        }
        outcome
    }

    /// Search, then persist the first candidate that works.
    async fn acquire(&self, item: &CatalogItem) -> Result<Option<PersistedFile>, SeederError> {
        let candidates = self.provider.search(&item.query, &self.filters).await?;
        for candidate in candidates.into_iter().take(self.filters.max_results) {
            match candidate {
                Candidate::Remote(url) => {
                    info!("Downloading: {url}");
                    let Some(bytes) = self.fetcher.fetch(&url, self.max_attempts).await else {
                        warn!(
                            "Giving up on {url} after {} attempt(s)",
                            self.max_attempts
                        );
                        continue;
                    };
                    let asset = AcquiredAsset {
                        extension: infer_extension(&url).to_string(),
                        source: url,
                        bytes,
                    };
                    return self.uploads.write(&asset).await.map(Some);
                }
                Candidate::Staged(path) => {
                    return self.uploads.copy_staged(&path).await.map(Some);
                }
            }
        }
        Ok(None)
    }
}
