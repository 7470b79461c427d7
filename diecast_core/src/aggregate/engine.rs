//! Aggregation engine.
//!
//! Every adapter's `fetch` runs as its own tokio task. Results are consumed in
//! completion order, so listings from fast sources land first in the merged
//! set, while the call still waits for every task before returning.

use super::{AggregateOutcome, SourceReport};
use crate::config::{AggregatorConfig, DEFAULT_SOURCE_TIMEOUT_SECS};
use crate::error::SearchError;
use crate::listing::{Listing, Query};
use crate::AdapterRegistry;
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorSettings {
    /// Outer bound on one adapter's whole fetch.
    pub source_timeout: Duration,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(DEFAULT_SOURCE_TIMEOUT_SECS),
        }
    }
}

impl From<&AggregatorConfig> for AggregatorSettings {
    fn from(config: &AggregatorConfig) -> Self {
        Self {
            source_timeout: Duration::from_secs(config.source_timeout_secs),
        }
    }
}

/// Fans a query out to every registered adapter and merges the results.
#[derive(Clone)]
pub struct Aggregator {
    registry: AdapterRegistry,
    settings: AggregatorSettings,
}

impl Aggregator {
    pub fn new(registry: AdapterRegistry, settings: AggregatorSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn settings(&self) -> AggregatorSettings {
        self.settings
    }

    /// Run one aggregation.
    ///
    /// Fails with `InvalidInput` for a blank query (no adapter is invoked),
    /// `NoResults` when every adapter came back empty, and `Internal` when an
    /// adapter task panicked.
    pub async fn aggregate(&self, raw_query: &str) -> Result<AggregateOutcome, SearchError> {
        let query = Query::parse(raw_query)?;
        let started_at = Utc::now();
        let start = Instant::now();
        info!(query = %query, sources = self.registry.len(), "aggregation started");

        let mut pending: FuturesUnordered<_> = self
            .registry
            .adapters()
            .iter()
            .map(|adapter| {
                let adapter = Arc::clone(adapter);
                let source = adapter.source();
                let query = query.clone();
                let limit = self.settings.source_timeout;

                let task = tokio::spawn(async move {
                    let unit_start = Instant::now();
                    let fetched = timeout(limit, adapter.fetch(&query)).await;
                    let duration_ms = unit_start.elapsed().as_millis() as u64;
                    let (listings, timed_out) = match fetched {
                        Ok(listings) => (listings, false),
                        Err(_) => {
                            warn!(
                                source = source.id(),
                                timeout_secs = limit.as_secs(),
                                "source exceeded its time budget, contributing no listings"
                            );
                            (Vec::new(), true)
                        }
                    };
                    let report = SourceReport {
                        source,
                        count: listings.len(),
                        duration_ms,
                        timed_out,
                    };
                    (report, listings)
                });

                async move { (source, task.await) }
            })
            .collect();

        let mut outcome = AggregateOutcome::new(query.as_str(), started_at);
        let mut failures = Vec::new();

        while let Some((source, joined)) = pending.next().await {
            if outcome.first_completion_ms.is_none() {
                let elapsed = start.elapsed().as_millis() as u64;
                outcome.first_completion_ms = Some(elapsed);
                info!(source = source.id(), elapsed_ms = elapsed, "first source completed");
            }

            match joined {
                Ok((report, listings)) => outcome.add_source(report, listings),
                Err(e) => {
                    error!(source = source.id(), error = %e, "source task did not complete");
                    failures.push(format!("{}: {}", source.id(), e));
                }
            }
        }

        outcome.duration_ms = start.elapsed().as_millis() as u64;

        if !failures.is_empty() {
            return Err(SearchError::Internal(failures.join("; ")));
        }
        if outcome.is_empty() {
            info!(
                query = %query,
                duration_ms = outcome.duration_ms,
                "aggregation finished with no results"
            );
            return Err(SearchError::NoResults);
        }

        info!(
            query = %query,
            total = outcome.total(),
            sources = outcome.sources.len(),
            duration_ms = outcome.duration_ms,
            "aggregation finished"
        );
        Ok(outcome)
    }

    /// Like [`aggregate`](Self::aggregate), returning only the listings.
    pub async fn search(&self, raw_query: &str) -> Result<Vec<Listing>, SearchError> {
        self.aggregate(raw_query).await.map(|outcome| outcome.listings)
    }
}
