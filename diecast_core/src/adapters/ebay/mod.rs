pub mod types;

use crate::config::EbayConfig;
use crate::error::AdapterError;
use crate::listing::{Listing, Query, Source};
use crate::oauth::{ClientCredentials, ClientCredentialsProvider, TokenProvider};
use crate::SourceAdapter;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use types::SearchPagedCollection;

const MARKETPLACE_HEADER: &str = "X-EBAY-C-MARKETPLACE-ID";

/// eBay Browse API item search.
///
/// Results are trusted as returned: eBay ranks and filters server-side, so
/// no relevance gate is applied.
pub struct EbayAdapter {
    client: reqwest::Client,
    api_base: String,
    marketplace_id: String,
    limit: u32,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl EbayAdapter {
    /// Build from config, exchanging client credentials for tokens when both
    /// are present. Without them every search fails with
    /// [`AdapterError::MissingCredentials`].
    pub fn from_config(config: &EbayConfig) -> Result<Self, AdapterError> {
        let client = Self::build_client(config)?;
        let tokens = match (&config.client_id, &config.client_secret) {
            (Some(client_id), Some(client_secret)) if config.has_credentials() => {
                let credentials = ClientCredentials {
                    token_url: config.token_url.clone(),
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                    scope: config.scope.clone(),
                };
                Some(Arc::new(ClientCredentialsProvider::new(client.clone(), credentials))
                    as Arc<dyn TokenProvider>)
            }
            _ => None,
        };
        Ok(Self::with_parts(client, config, tokens))
    }

    /// Build with an explicit token source.
    pub fn with_token_provider(
        config: &EbayConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, AdapterError> {
        let client = Self::build_client(config)?;
        Ok(Self::with_parts(client, config, Some(tokens)))
    }

    fn build_client(config: &EbayConfig) -> Result<reqwest::Client, AdapterError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()?)
    }

    fn with_parts(
        client: reqwest::Client,
        config: &EbayConfig,
        tokens: Option<Arc<dyn TokenProvider>>,
    ) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            marketplace_id: config.marketplace_id.clone(),
            limit: config.limit,
            tokens,
        }
    }

    fn search_url(&self, query: &Query) -> String {
        format!(
            "{}/buy/browse/v1/item_summary/search?q={}&limit={}",
            self.api_base,
            query.encoded(),
            self.limit
        )
    }
}

/// Map a Browse API search response body to listings.
///
/// Items without a title or a web URL are skipped; a missing price becomes
/// the "Price not found" sentinel.
pub fn parse_item_summaries(body: &str) -> Result<Vec<Listing>, AdapterError> {
    let collection: SearchPagedCollection = serde_json::from_str(body)?;
    debug!(
        total = collection.total.unwrap_or_default(),
        returned = collection.item_summaries.len(),
        "eBay search response"
    );
    Ok(collection
        .item_summaries
        .into_iter()
        .filter_map(|item| {
            let title = item.title?;
            let link = item.item_web_url?;
            let price = item.price.and_then(|p| p.display());
            let image = item.image.and_then(|i| i.image_url);
            Listing::new(Source::Ebay, title, price, link, image)
        })
        .collect())
}

#[async_trait]
impl SourceAdapter for EbayAdapter {
    fn source(&self) -> Source {
        Source::Ebay
    }

    fn description(&self) -> &'static str {
        "eBay Browse API item search"
    }

    async fn search(&self, query: &Query) -> Result<Vec<Listing>, AdapterError> {
        let tokens = self.tokens.as_ref().ok_or_else(|| {
            AdapterError::MissingCredentials(
                "set EBAY_CLIENT_ID and EBAY_CLIENT_SECRET or [ebay] client_id/client_secret"
                    .to_string(),
            )
        })?;
        let token = tokens.access_token().await?;

        let response = self
            .client
            .get(self.search_url(query))
            .bearer_auth(token)
            .header(MARKETPLACE_HEADER, &self.marketplace_id)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AdapterError::Upstream {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        parse_item_summaries(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::StaticToken;
    use axum::extract::Query as QueryParams;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn sample_response() -> Value {
        json!({
            "href": "https://api.ebay.com/buy/browse/v1/item_summary/search?q=porsche%20911&limit=50",
            "total": 3,
            "itemSummaries": [
                {
                    "itemId": "v1|1|0",
                    "title": "Minichamps 1:18 Porsche 911 Turbo S",
                    "price": {"value": "84.99", "currency": "USD"},
                    "itemWebUrl": "https://www.ebay.com/itm/1",
                    "image": {"imageUrl": "https://i.ebayimg.com/images/g/1/s-l225.jpg"}
                },
                {
                    "itemId": "v1|2|0",
                    "title": "Porsche 911 GT3 RS 1/43",
                    "itemWebUrl": "https://www.ebay.com/itm/2"
                },
                {
                    "itemId": "v1|3|0",
                    "title": "Listing without a link"
                }
            ]
        })
    }

    fn config(api_base: &str) -> EbayConfig {
        EbayConfig {
            api_base: api_base.to_string(),
            token_url: format!("{}/identity/v1/oauth2/token", api_base),
            ..EbayConfig::default()
        }
    }

    #[test]
    fn test_parse_item_summaries() {
        let listings = parse_item_summaries(&sample_response().to_string()).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price, "USD 84.99");
        assert_eq!(
            listings[0].image.as_deref(),
            Some("https://i.ebayimg.com/images/g/1/s-l225.jpg")
        );
        assert_eq!(listings[1].price, crate::PRICE_NOT_FOUND);
        assert_eq!(listings[1].image, None);
        assert!(listings.iter().all(|l| l.source == Source::Ebay));
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert!(parse_item_summaries(r#"{"total": 0}"#).unwrap().is_empty());
        let err = parse_item_summaries("<html>oops</html>").unwrap_err();
        assert!(matches!(err, AdapterError::Parse(_)));
    }

    #[tokio::test]
    async fn test_search_sends_bearer_and_marketplace() {
        let router = Router::new().route(
            "/buy/browse/v1/item_summary/search",
            get(
                |headers: AxumHeaders, QueryParams(params): QueryParams<HashMap<String, String>>| async move {
                    let authorized = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        == Some("Bearer test-token");
                    let marketplace = headers
                        .get(MARKETPLACE_HEADER)
                        .and_then(|v| v.to_str().ok())
                        == Some("EBAY_US");
                    if !authorized || !marketplace {
                        return (StatusCode::UNAUTHORIZED, Json(json!({"errors": []})));
                    }
                    assert_eq!(params.get("q").map(String::as_str), Some("porsche 911"));
                    assert_eq!(params.get("limit").map(String::as_str), Some("50"));
                    (StatusCode::OK, Json(sample_response()))
                },
            ),
        );
        let base = spawn_stub(router).await;
        let adapter = EbayAdapter::with_token_provider(
            &config(&base),
            Arc::new(StaticToken("test-token".into())),
        )
        .unwrap();
        let query = Query::parse("porsche 911").unwrap();

        let listings = adapter.search(&query).await.unwrap();
        assert_eq!(listings.len(), 2);
    }

    #[tokio::test]
    async fn test_token_failure_degrades_to_empty() {
        let router = Router::new().route(
            "/identity/v1/oauth2/token",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid_client") }),
        );
        let base = spawn_stub(router).await;
        let mut config = config(&base);
        config.client_id = Some("id".into());
        config.client_secret = Some("secret".into());
        let adapter = EbayAdapter::from_config(&config).unwrap();
        let query = Query::parse("porsche 911").unwrap();

        let err = adapter.search(&query).await.unwrap_err();
        assert_eq!(err.code_str(), "auth_failed");
        assert!(adapter.fetch(&query).await.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let router = Router::new().route(
            "/buy/browse/v1/item_summary/search",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "maintenance") }),
        );
        let base = spawn_stub(router).await;
        let adapter =
            EbayAdapter::with_token_provider(&config(&base), Arc::new(StaticToken("t".into())))
                .unwrap();
        let query = Query::parse("porsche 911").unwrap();

        match adapter.search(&query).await.unwrap_err() {
            AdapterError::Upstream { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let adapter = EbayAdapter::from_config(&EbayConfig::default()).unwrap();
        let query = Query::parse("porsche 911").unwrap();
        let err = adapter.search(&query).await.unwrap_err();
        assert!(matches!(err, AdapterError::MissingCredentials(_)));
    }
}
