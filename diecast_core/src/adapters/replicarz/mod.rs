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
use std::sync::Arc;
use tracing::debug;

const CARD_CSS: &str = ".product-item";

static CARD: Lazy<Selector> = Lazy::new(|| html::selector(CARD_CSS));
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| html::selector("a.product-item__title"));
static PRICE: Lazy<Selector> = Lazy::new(|| html::selector(".price"));
static IMAGE: Lazy<Selector> = Lazy::new(|| html::selector("img"));

/// Replicarz. A single search page, no pagination.
pub struct ReplicarzAdapter {
    config: ShopConfig,
    renderer: Arc<dyn PageRenderer>,
}

impl ReplicarzAdapter {
    pub fn new(config: ShopConfig, renderer: Arc<dyn PageRenderer>) -> Self {
        Self { config, renderer }
    }

    fn search_url(&self, query: &Query) -> String {
        format!(
            "{}/search?q={}&type=product",
            self.config.base_url.trim_end_matches('/'),
            query.encoded()
        )
    }
}

pub fn parse_page(page_html: &str) -> ScrapedPage {
    let document = Html::parse_document(page_html);
    let mut page = ScrapedPage::default();
    for card in document.select(&CARD) {
        page.card_count += 1;
        if let Some(title) = text_of(card, &TITLE_LINK) {
            page.items.push(ScrapedItem {
                title,
                price: text_of(card, &PRICE),
                link: attr_of(card, &TITLE_LINK, "href"),
                image: image_of(card, &IMAGE),
            });
        }
    }
    page
}

#[async_trait]
impl SourceAdapter for ReplicarzAdapter {
    fn source(&self) -> Source {
        Source::Replicarz
    }

    fn description(&self) -> &'static str {
        "Replicarz shop search, first results page only"
    }

    async fn search(&self, query: &Query) -> Result<Vec<Listing>, AdapterError> {
        let base = parse_base_url(self.source(), &self.config.base_url)?;
        let request = RenderRequest::new(self.search_url(query))
            .wait_for(CARD_CSS)
            .settle(self.config.settle());
        let page = parse_page(&self.renderer.render(&request).await?);
        debug!(source = self.source().id(), cards = page.card_count, "page scraped");

        Ok(into_listings(
            self.source(),
            page.items,
            &base,
            query,
            self.config.relevance_threshold,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::FixtureRenderer;

    const PAGE: &str = r#"
        <html><body>
          <div class="product-list">
            <div class="product-item">
              <a href="/products/acme-1-18-porsche-911-carrera-rsr" class="product-item__image-wrapper">
                <img src="//www.replicarz.com/cdn/shop/products/rsr_600x.jpg" alt="">
              </a>
              <a href="/products/acme-1-18-porsche-911-carrera-rsr" class="product-item__title">
                1/18 ACME Porsche 911 Carrera RSR 2.8
              </a>
              <div class="product-item__price-list"><span class="price">$159.95</span></div>
            </div>
            <div class="product-item">
              <a href="/products/display-base" class="product-item__title">Display Base for 1/18</a>
              <div class="product-item__price-list"><span class="price">$24.95</span></div>
            </div>
          </div>
          <nav class="pagination"><a href="/search?page=2&q=porsche+911">2</a></nav>
        </body></html>"#;

    #[tokio::test]
    async fn test_single_page_search() {
        let url = "https://www.replicarz.com/search?q=porsche%20911&type=product";
        let renderer = Arc::new(FixtureRenderer::new().page(url, PAGE));
        let adapter = ReplicarzAdapter::new(ShopConfig::replicarz(), renderer.clone());
        let query = Query::parse("porsche 911").unwrap();

        let listings = adapter.search(&query).await.unwrap();

        assert_eq!(renderer.requested_urls(), vec![url.to_string()]);
        assert_eq!(listings.len(), 1);
        let rsr = &listings[0];
        assert_eq!(rsr.title, "1/18 ACME Porsche 911 Carrera RSR 2.8");
        assert_eq!(rsr.price, "$159.95");
        assert_eq!(
            rsr.link,
            "https://www.replicarz.com/products/acme-1-18-porsche-911-carrera-rsr"
        );
        assert_eq!(
            rsr.image.as_deref(),
            Some("https://www.replicarz.com/cdn/shop/products/rsr_600x.jpg")
        );
        assert_eq!(rsr.source, Source::Replicarz);
    }

    #[test]
    fn test_missing_image_is_none() {
        let page = parse_page(PAGE);
        assert_eq!(page.card_count, 2);
        assert_eq!(page.items[1].image, None);
    }
}
