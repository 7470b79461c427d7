//! Concrete source adapters.
//!
//! Three shops are scraped from rendered search pages, each with its own
//! pagination shape; eBay is queried through the Browse API. Every adapter is
//! behind its own cargo feature.

pub mod html;

#[cfg(feature = "ebay")]
pub mod ebay;
#[cfg(feature = "livecarmodel")]
pub mod livecarmodel;
#[cfg(feature = "replicarz")]
pub mod replicarz;
#[cfg(feature = "stmdiecast")]
pub mod stmdiecast;

use crate::error::AdapterError;
use crate::listing::{Listing, Query, Source};
use crate::relevance::is_relevant;
use tracing::debug;
use url::Url;

/// Raw fields lifted from one product card, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedItem {
    pub title: String,
    pub price: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
}

/// One parsed result page.
#[derive(Debug, Clone, Default)]
pub struct ScrapedPage {
    /// Product cards present on the page, whether or not they had a title.
    pub card_count: usize,
    pub items: Vec<ScrapedItem>,
}

impl ScrapedPage {
    pub fn is_empty(&self) -> bool {
        self.card_count == 0
    }
}

/// Parse a shop's configured base URL.
pub(crate) fn parse_base_url(source: Source, base_url: &str) -> Result<Url, AdapterError> {
    Url::parse(base_url).map_err(|e| {
        AdapterError::Config(format!(
            "{} base_url {:?} is invalid: {}",
            source.id(),
            base_url,
            e
        ))
    })
}

/// Apply the relevance gate and normalize scraped cards into listings.
///
/// Links and images are resolved against `base`. Cards without a usable
/// title or link are dropped.
pub(crate) fn into_listings(
    source: Source,
    items: Vec<ScrapedItem>,
    base: &Url,
    query: &Query,
    threshold: u8,
) -> Vec<Listing> {
    items
        .into_iter()
        .filter_map(|item| {
            if !is_relevant(&item.title, query.as_str(), threshold) {
                debug!(source = source.id(), title = %item.title, "dropping irrelevant item");
                return None;
            }
            let link = item
                .link
                .as_deref()
                .and_then(|href| html::absolute_url(base, href))?;
            let image = item
                .image
                .as_deref()
                .and_then(|src| html::absolute_url(base, src));
            Listing::new(source, &item.title, item.price, link, image)
        })
        .collect()
}
