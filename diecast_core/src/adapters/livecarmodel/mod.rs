use crate::adapters::html::{self, attr_of, image_of, text_of};
use crate::adapters::{into_listings, parse_base_url, ScrapedItem, ScrapedPage};
use crate::config::ShopConfig;
use crate::error::AdapterError;
use crate::listing::{Listing, Query, Source};
use crate::render::{PageRenderer, RenderRequest};
use crate::SourceAdapter;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const CARD_CSS: &str = "li.product";

static CARD: Lazy<Selector> = Lazy::new(|| html::selector(CARD_CSS));
static TITLE: Lazy<Selector> = Lazy::new(|| html::selector("h4.card-title"));
static LINK: Lazy<Selector> = Lazy::new(|| html::selector("a.image-link.desktop"));
static PRICE: Lazy<Selector> = Lazy::new(|| html::selector("[data-product-price-without-tax]"));
static IMAGE: Lazy<Selector> = Lazy::new(|| html::selector("img.card-image"));
static PAGINATION: Lazy<Selector> = Lazy::new(|| html::selector("a.pagination-link[href]"));

/// LiveCarModel (BigCommerce storefront). The first search page lists links
/// to the remaining pages, which are then rendered concurrently.
pub struct LiveCarModelAdapter {
    config: ShopConfig,
    renderer: Arc<dyn PageRenderer>,
}

impl LiveCarModelAdapter {
    pub fn new(config: ShopConfig, renderer: Arc<dyn PageRenderer>) -> Self {
        Self { config, renderer }
    }

    fn search_url(&self, query: &Query) -> String {
        format!(
            "{}/search.php?search_query={}&section=product",
            self.config.base_url.trim_end_matches('/'),
            query.encoded()
        )
    }

    fn request(&self, url: String) -> RenderRequest {
        RenderRequest::new(url)
            .wait_for(CARD_CSS)
            .settle(self.config.settle())
    }

    /// Render and parse one discovered page. Failures yield an empty page.
    async fn fetch_page(&self, url: String) -> ScrapedPage {
        match self.renderer.render(&self.request(url.clone())).await {
            Ok(page_html) => {
                let page = parse_page(&page_html);
                debug!(source = self.source().id(), url = %url, cards = page.card_count, "page scraped");
                page
            }
            Err(e) => {
                warn!(source = self.source().id(), url = %url, error = %e, "page failed, skipping");
                ScrapedPage::default()
            }
        }
    }
}

/// Extract product cards from one search page.
///
/// Cards need both a title and a product link to be kept.
pub fn parse_page(page_html: &str) -> ScrapedPage {
    let document = Html::parse_document(page_html);
    parse_document(&document)
}

fn parse_document(document: &Html) -> ScrapedPage {
    let mut page = ScrapedPage::default();
    for card in document.select(&CARD) {
        page.card_count += 1;
        let (Some(title), Some(link)) = (text_of(card, &TITLE), attr_of(card, &LINK, "href"))
        else {
            continue;
        };
        page.items.push(ScrapedItem {
            title,
            price: text_of(card, &PRICE),
            link: Some(link),
            image: image_of(card, &IMAGE),
        });
    }
    page
}

/// Collect the other result pages linked from the pagination bar.
///
/// Links are resolved against `base`, deduplicated and ordered by their
/// `page` number. Page 1 (or a link without a page number) is the page
/// already loaded and is skipped. At most `limit` URLs are returned.
pub fn discover_pages(document: &Html, base: &Url, limit: usize) -> Vec<String> {
    let pages: BTreeMap<u32, String> = document
        .select(&PAGINATION)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains("/search.php"))
        .filter_map(|href| html::absolute_url(base, href))
        .filter_map(|url| page_number(&url).map(|n| (n, url)))
        .filter(|(n, _)| *n > 1)
        .collect();
    pages.into_values().take(limit).collect()
}

fn page_number(url: &str) -> Option<u32> {
    Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

#[async_trait]
impl SourceAdapter for LiveCarModelAdapter {
    fn source(&self) -> Source {
        Source::LiveCarModel
    }

    fn description(&self) -> &'static str {
        "LiveCarModel shop search, pagination links fetched in parallel"
    }

    async fn search(&self, query: &Query) -> Result<Vec<Listing>, AdapterError> {
        let base = parse_base_url(self.source(), &self.config.base_url)?;
        let first_url = self.search_url(query);

        let first_html = self.renderer.render(&self.request(first_url)).await?;
        let (first_page, other_urls) = {
            let document = Html::parse_document(&first_html);
            let limit = self.config.max_pages.saturating_sub(1) as usize;
            (
                parse_document(&document),
                discover_pages(&document, &base, limit),
            )
        };
        debug!(
            source = self.source().id(),
            cards = first_page.card_count,
            extra_pages = other_urls.len(),
            "first page scraped"
        );

        let others =
            futures::future::join_all(other_urls.into_iter().map(|url| self.fetch_page(url)))
                .await;

        let threshold = self.config.relevance_threshold;
        let listings = std::iter::once(first_page)
            .chain(others)
            .flat_map(|page| into_listings(self.source(), page.items, &base, query, threshold))
            .collect();
        Ok(listings)
    }
}
