use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use diecast_core::{
    AdapterError, AdapterRegistry, Aggregator, AggregatorSettings, Listing, Query, Source,
    SourceAdapter,
};
use diecast_server::{create_router, AppState};
use serde_json::Value;
use tower::ServiceExt;

struct FakeAdapter {
    source: Source,
    listings: Vec<Listing>,
}

#[async_trait]
impl SourceAdapter for FakeAdapter {
    fn source(&self) -> Source {
        self.source
    }

    fn description(&self) -> &'static str {
        "fake source"
    }

    async fn search(&self, _query: &Query) -> Result<Vec<Listing>, AdapterError> {
        Ok(self.listings.clone())
    }
}

struct FailingAdapter;

#[async_trait]
impl SourceAdapter for FailingAdapter {
    fn source(&self) -> Source {
        Source::Ebay
    }

    fn description(&self) -> &'static str {
        "always fails"
    }

    async fn search(&self, _query: &Query) -> Result<Vec<Listing>, AdapterError> {
        Err(AdapterError::Authentication("token exchange failed (401)".into()))
    }
}

struct PanickingAdapter;

#[async_trait]
impl SourceAdapter for PanickingAdapter {
    fn source(&self) -> Source {
        Source::LiveCarModel
    }

    fn description(&self) -> &'static str {
        "panics"
    }

    async fn search(&self, _query: &Query) -> Result<Vec<Listing>, AdapterError> {
        panic!("boom");
    }
}

fn porsche_listings() -> Vec<Listing> {
    ["rsr", "turbo", "gt3"]
        .iter()
        .map(|slug| {
            Listing::new(
                Source::StmDiecast,
                format!("Porsche 911 {}", slug.to_uppercase()),
                None,
                format!("https://www.stmdiecast.com/products/{}", slug),
                None,
            )
            .unwrap()
        })
        .collect()
}

fn app(registry: AdapterRegistry) -> axum::Router {
    create_router(AppState::new(Aggregator::new(
        registry,
        AggregatorSettings::default(),
    )))
}

fn porsche_app() -> axum::Router {
    let mut registry = AdapterRegistry::new();
    registry.register(FakeAdapter {
        source: Source::StmDiecast,
        listings: porsche_listings(),
    });
    registry.register(FakeAdapter {
        source: Source::Replicarz,
        listings: vec![],
    });
    registry.register(FailingAdapter);
    app(registry)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_missing_query_is_400() {
    for uri in ["/search", "/search?q=", "/search?q=%20%20"] {
        let (status, body) = get(porsche_app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, serde_json::json!({"error": "Missing query"}));
    }
}

#[tokio::test]
async fn test_search_returns_listing_array() {
    let (status, body) = get(porsche_app(), "/search?q=porsche%20911").await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 3);
    for item in items {
        let mut keys: Vec<&str> = item.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["image", "link", "price", "source", "title"]);
        assert_eq!(item["source"], "STMDiecast");
        assert_eq!(item["price"], "Price not found");
        assert!(item["image"].is_null());
    }
}

#[tokio::test]
async fn test_no_results_is_404() {
    let mut registry = AdapterRegistry::new();
    registry.register(FakeAdapter {
        source: Source::Replicarz,
        listings: vec![],
    });
    registry.register(FailingAdapter);

    let (status, body) = get(app(registry), "/search?q=xyzzynonexistentmodel").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, serde_json::json!({"error": "No results found"}));
}

#[tokio::test]
async fn test_isolation_violation_is_500() {
    let mut registry = AdapterRegistry::new();
    registry.register(PanickingAdapter);

    let (status, body) = get(app(registry), "/search?q=porsche").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn test_health_and_sources() {
    let (status, body) = get(porsche_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": "ok", "sources": 3}));

    let (status, body) = get(porsche_app(), "/sources").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["stmdiecast", "replicarz", "ebay"]);
    assert_eq!(body[2]["name"], "eBay");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let response = porsche_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
