// src/lib.rs
pub mod adapters;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod listing;
pub mod oauth;
pub mod relevance;
pub mod render;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use crate::aggregate::{AggregateOutcome, Aggregator, AggregatorSettings, SourceReport};
pub use crate::config::DiecastConfig;
pub use crate::error::{AdapterError, ConfigError, SearchError};
pub use crate::listing::{Listing, Query, Source, PRICE_NOT_FOUND};
pub use crate::relevance::{is_relevant, DEFAULT_RELEVANCE_THRESHOLD};

use crate::render::PageRenderer;

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which source this adapter produces listings for.
    fn source(&self) -> Source;

    /// Short human-readable description.
    fn description(&self) -> &'static str;

    /// Adapter-specific search. May fail; callers should use [`fetch`](Self::fetch).
    async fn search(&self, query: &Query) -> Result<Vec<Listing>, AdapterError>;

    /// Search with failures contained.
    ///
    /// Any [`AdapterError`] is logged with the adapter's identity and turned
    /// into an empty contribution. This is the only entry point the
    /// aggregator uses.
    async fn fetch(&self, query: &Query) -> Vec<Listing> {
        let source = self.source();
        let start = Instant::now();
        match self.search(query).await {
            Ok(listings) => {
                info!(
                    source = source.id(),
                    count = listings.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "source completed"
                );
                listings
            }
            Err(e) => {
                warn!(
                    source = source.id(),
                    code = e.code_str(),
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "source failed, contributing no listings"
                );
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Ordered set of adapters an [`Aggregator`] fans out to.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: impl SourceAdapter + 'static) {
        self.register_arc(Arc::new(adapter));
    }

    pub fn register_arc(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn get(&self, source: Source) -> Option<&Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.source() == source)
    }

    pub fn list_sources(&self) -> Vec<SourceInfo> {
        self.adapters
            .iter()
            .map(|a| SourceInfo {
                id: a.source().id().to_string(),
                name: a.source().label().to_string(),
                description: a.description().to_string(),
            })
            .collect()
    }

    /// Keep only the adapters for `sources`.
    pub fn retain_sources(&mut self, sources: &[Source]) {
        self.adapters.retain(|a| sources.contains(&a.source()));
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Build a registry with every adapter that is compiled in and enabled in
/// the config. Scraping adapters share `renderer`.
#[allow(unused_variables)]
pub fn build_registry(
    config: &DiecastConfig,
    renderer: Arc<dyn PageRenderer>,
) -> Result<AdapterRegistry, AdapterError> {
    #[allow(unused_mut)]
    let mut registry = AdapterRegistry::new();

    #[cfg(feature = "stmdiecast")]
    {
        if config.stmdiecast.enabled {
            registry.register(adapters::stmdiecast::StmDiecastAdapter::new(
                config.stmdiecast.clone(),
                Arc::clone(&renderer),
            ));
        }
    }

    #[cfg(feature = "livecarmodel")]
    {
        if config.livecarmodel.enabled {
            registry.register(adapters::livecarmodel::LiveCarModelAdapter::new(
                config.livecarmodel.clone(),
                Arc::clone(&renderer),
            ));
        }
    }

    #[cfg(feature = "replicarz")]
    {
        if config.replicarz.enabled {
            registry.register(adapters::replicarz::ReplicarzAdapter::new(
                config.replicarz.clone(),
                Arc::clone(&renderer),
            ));
        }
    }

    #[cfg(feature = "ebay")]
    {
        if config.ebay.enabled {
            if !config.ebay.has_credentials() {
                warn!("eBay credentials not configured; the eBay source will return no listings");
            }
            registry.register(adapters::ebay::EbayAdapter::from_config(&config.ebay)?);
        }
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Source, Result<Vec<Listing>, ()>);

    #[async_trait]
    impl SourceAdapter for Fixed {
        fn source(&self) -> Source {
            self.0
        }
        fn description(&self) -> &'static str {
            "fixed"
        }
        async fn search(&self, _query: &Query) -> Result<Vec<Listing>, AdapterError> {
            self.1
                .clone()
                .map_err(|_| AdapterError::Browser("selector mismatch".into()))
        }
    }

    fn listing(source: Source) -> Listing {
        Listing::new(source, "Porsche 911", None, "https://example.com/911", None).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_degrades_errors_to_empty() {
        let query = Query::parse("porsche 911").unwrap();
        let ok = Fixed(Source::Replicarz, Ok(vec![listing(Source::Replicarz)]));
        let failing = Fixed(Source::StmDiecast, Err(()));
        assert_eq!(ok.fetch(&query).await.len(), 1);
        assert!(failing.fetch(&query).await.is_empty());
    }

    #[test]
    fn test_registry_lists_sources_in_order() {
        let mut registry = AdapterRegistry::new();
        registry.register(Fixed(Source::Ebay, Ok(vec![])));
        registry.register(Fixed(Source::StmDiecast, Ok(vec![])));

        let sources = registry.list_sources();
        assert_eq!(registry.len(), 2);
        assert_eq!(sources[0].id, "ebay");
        assert_eq!(sources[0].name, "eBay");
        assert_eq!(sources[1].id, "stmdiecast");
        assert!(registry.get(Source::Ebay).is_some());
        assert!(registry.get(Source::Replicarz).is_none());

        registry.retain_sources(&[Source::StmDiecast]);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(Source::Ebay).is_none());
    }

    #[test]
    fn test_build_registry_respects_enabled_flags() {
        let mut config = DiecastConfig::default();
        config.livecarmodel.enabled = false;
        config.ebay.enabled = false;
        let renderer = render::build_renderer(&config.render).unwrap();

        let registry = build_registry(&config, renderer).unwrap();
        let ids: Vec<String> = registry.list_sources().into_iter().map(|s| s.id).collect();
        assert!(!ids.contains(&"livecarmodel".to_string()));
        assert!(!ids.contains(&"ebay".to_string()));
        #[cfg(feature = "stmdiecast")]
        assert!(ids.contains(&"stmdiecast".to_string()));
    }
}
