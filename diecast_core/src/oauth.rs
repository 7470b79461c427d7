use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::AdapterError;

/// Tokens are refreshed this long before the server-side expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, AdapterError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

pub async fn client_credentials_token(
    client: &reqwest::Client,
    credentials: &ClientCredentials,
) -> Result<OAuthToken, AdapterError> {
    let body = [
        ("grant_type", "client_credentials"),
        ("scope", credentials.scope.as_str()),
    ];
    let resp = client
        .post(&credentials.token_url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&body)
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(AdapterError::Authentication(format!(
            "token exchange failed ({}): {}",
            status.as_u16(),
            text
        )));
    }
    let token = resp
        .json::<OAuthToken>()
        .await
        .map_err(|e| AdapterError::Authentication(format!("invalid token response: {}", e)))?;
    if token.access_token.is_empty() {
        return Err(AdapterError::Authentication(
            "token response has an empty access_token".to_string(),
        ));
    }
    Ok(token)
}

struct CachedToken {
    value: String,
    refresh_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.refresh_at.map_or(true, |at| Instant::now() < at)
    }
}

/// Client-credentials grant with an in-memory token cache.
pub struct ClientCredentialsProvider {
    client: reqwest::Client,
    credentials: ClientCredentials,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentialsProvider {
    pub fn new(client: reqwest::Client, credentials: ClientCredentials) -> Self {
        Self {
            client,
            credentials,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn access_token(&self) -> Result<String, AdapterError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        debug!(token_url = %self.credentials.token_url, "requesting client-credentials token");
        let token = client_credentials_token(&self.client, &self.credentials).await?;
        let refresh_at = token
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN));
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at,
        });
        Ok(token.access_token)
    }
}

/// A pre-issued token.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, AdapterError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/token", addr)
    }

    fn credentials(token_url: String) -> ClientCredentials {
        ClientCredentials {
            token_url,
            client_id: "id".into(),
            client_secret: "secret".into(),
            scope: "https://api.ebay.com/oauth/api_scope".into(),
        }
    }

    #[tokio::test]
    async fn test_token_is_cached() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/token",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"access_token": "abc", "expires_in": 7200, "token_type": "Application Access Token"}))
                }
            }),
        );
        let url = spawn_stub(router).await;
        let provider = ClientCredentialsProvider::new(reqwest::Client::new(), credentials(url));

        assert_eq!(provider.access_token().await.unwrap(), "abc");
        assert_eq!(provider.access_token().await.unwrap(), "abc");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_200_is_authentication_error() {
        let router = Router::new().route(
            "/token",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid_client") }),
        );
        let url = spawn_stub(router).await;
        let provider = ClientCredentialsProvider::new(reqwest::Client::new(), credentials(url));

        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, AdapterError::Authentication(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticToken("preissued".into());
        assert_eq!(provider.access_token().await.unwrap(), "preissued");
    }
}
