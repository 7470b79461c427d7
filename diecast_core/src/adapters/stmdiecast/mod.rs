use crate::adapters::html::{self, image_of, text_of};
use crate::adapters::{into_listings, parse_base_url, ScrapedItem, ScrapedPage};
use crate::config::ShopConfig;
use crate::error::AdapterError;
use crate::listing::{Listing, Query, Source};
use crate::render::{PageRenderer, RenderRequest};
use crate::SourceAdapter;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, warn};

const CARD_CSS: &str = "li.grid__item";

static CARD: Lazy<Selector> = Lazy::new(|| html::selector(CARD_CSS));
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| html::selector("h3.card__heading a"));
static PRICE: Lazy<Selector> = Lazy::new(|| html::selector(".price-item--last"));
static IMAGE: Lazy<Selector> = Lazy::new(|| html::selector("img"));

/// STMDiecast (Shopify storefront). Numbered result pages, walked until one
/// comes back without product cards.
pub struct StmDiecastAdapter {
    config: ShopConfig,
    renderer: Arc<dyn PageRenderer>,
}

impl StmDiecastAdapter {
    pub fn new(config: ShopConfig, renderer: Arc<dyn PageRenderer>) -> Self {
        Self { config, renderer }
    }

    fn page_url(&self, query: &Query, page: u32) -> String {
        format!(
            "{}/search?&options%5Bprefix%5D=last&page={}&q={}",
            self.config.base_url.trim_end_matches('/'),
            page,
            query.encoded()
        )
    }
}

/// Extract product cards from one search page.
pub fn parse_page(page_html: &str) -> ScrapedPage {
    let document = Html::parse_document(page_html);
    let mut page = ScrapedPage::default();

    for card in document.select(&CARD) {
        page.card_count += 1;
        let Some(title) = text_of(card, &TITLE_LINK) else {
            continue;
        };
        page.items.push(ScrapedItem {
            title,
            price: text_of(card, &PRICE),
            link: html::attr_of(card, &TITLE_LINK, "href"),
            image: image_of(card, &IMAGE),
        });
    }

    page
}

#[async_trait]
impl SourceAdapter for StmDiecastAdapter {
    fn source(&self) -> Source {
        Source::StmDiecast
    }

    fn description(&self) -> &'static str {
        "STMDiecast shop search, numbered pages until an empty page"
    }

    async fn search(&self, query: &Query) -> Result<Vec<Listing>, AdapterError> {
        let base = parse_base_url(self.source(), &self.config.base_url)?;
        let mut listings = Vec::new();

        for page_num in 1..=self.config.max_pages {
            if page_num > 1 && !self.config.page_delay().is_zero() {
                tokio::time::sleep(self.config.page_delay()).await;
            }

            let request = RenderRequest::new(self.page_url(query, page_num))
                .wait_for(CARD_CSS)
                .settle(self.config.settle());
            let page_html = match self.renderer.render(&request).await {
                Ok(page_html) => page_html,
                Err(e) => {
                    warn!(
                        source = self.source().id(),
                        page = page_num,
                        error = %e,
                        "page failed to load, stopping pagination"
                    );
                    break;
                }
            };

            let page = parse_page(&page_html);
            if page.is_empty() {
                debug!(source = self.source().id(), page = page_num, "no products, stopping");
                break;
            }

            let found = into_listings(
                self.source(),
                page.items,
                &base,
                query,
                self.config.relevance_threshold,
            );
            debug!(
                source = self.source().id(),
                page = page_num,
                cards = page.card_count,
                relevant = found.len(),
                "page scraped"
            );
            listings.extend(found);
        }

        Ok(listings)
    }
}
