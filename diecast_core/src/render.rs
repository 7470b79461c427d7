//! Page rendering for the scraping adapters.
//!
//! Shop search pages are fetched through a [`PageRenderer`], which returns the
//! final HTML of a page. The WebDriver renderer drives a headless Chrome
//! through a shared chromedriver endpoint; the HTTP renderer is a plain GET
//! for shops that render server-side (and for tests).

use crate::config::RenderConfig;
use crate::error::AdapterError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One page to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub url: String,
    /// CSS selector that signals the page has finished loading its results.
    pub ready_selector: Option<String>,
    /// Extra wait after readiness before reading the page.
    pub settle: Duration,
}

impl RenderRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ready_selector: None,
            settle: Duration::ZERO,
        }
    }

    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.ready_selector = Some(selector.into());
        self
    }

    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render `request.url` and return the page HTML.
    ///
    /// Implementations must bound every network wait by a timeout.
    async fn render(&self, request: &RenderRequest) -> Result<String, AdapterError>;
}

/// Pick the renderer described by the config.
pub fn build_renderer(config: &RenderConfig) -> Result<Arc<dyn PageRenderer>, AdapterError> {
    match config.webdriver_url.as_deref() {
        #[cfg(feature = "webdriver")]
        Some(url) => Ok(Arc::new(WebDriverRenderer::new(url, config))),
        #[cfg(not(feature = "webdriver"))]
        Some(url) => {
            warn!(
                webdriver_url = url,
                "webdriver feature not enabled, falling back to plain HTTP rendering"
            );
            Ok(Arc::new(HttpRenderer::new(config)?))
        }
        None => Ok(Arc::new(HttpRenderer::new(config)?)),
    }
}

// ============================================================================
// HttpRenderer
// ============================================================================

pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self, AdapterError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(config.navigation_timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .cookie_store(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<String, AdapterError> {
        debug!(url = %request.url, "fetching page over HTTP");
        let response = self.client.get(&request.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Upstream {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }
        let html = response.text().await?;
        if !request.settle.is_zero() {
            tokio::time::sleep(request.settle).await;
        }
        Ok(html)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

// ============================================================================
// WebDriverRenderer
// ============================================================================

#[cfg(feature = "webdriver")]
pub use webdriver::WebDriverRenderer;

#[cfg(feature = "webdriver")]
mod webdriver {
    use super::*;
    use thirtyfour::prelude::*;
    use thirtyfour::ChromeCapabilities;

    const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

    /// Renders pages in headless Chrome through a WebDriver endpoint.
    ///
    /// The chromedriver process is shared; every render gets its own browser
    /// session, so concurrent renders never share navigation state.
    pub struct WebDriverRenderer {
        server_url: String,
        navigation_timeout: Duration,
        ready_timeout: Duration,
        user_agent: String,
    }

    impl WebDriverRenderer {
        pub fn new(server_url: &str, config: &RenderConfig) -> Self {
            Self {
                server_url: server_url.to_string(),
                navigation_timeout: config.navigation_timeout(),
                ready_timeout: config.ready_timeout(),
                user_agent: config.user_agent.clone(),
            }
        }

        fn capabilities(&self) -> Result<ChromeCapabilities, AdapterError> {
            let mut caps = DesiredCapabilities::chrome();
            caps.set_headless()?;
            caps.set_no_sandbox()?;
            caps.set_disable_dev_shm_usage()?;
            caps.add_chrome_arg("--disable-blink-features=AutomationControlled")?;
            caps.add_chrome_arg("--window-size=1920,1080")?;
            caps.add_chrome_arg(&format!("--user-agent={}", self.user_agent))?;
            Ok(caps)
        }

        async fn load(
            &self,
            driver: &WebDriver,
            request: &RenderRequest,
        ) -> Result<String, AdapterError> {
            tokio::time::timeout(self.navigation_timeout, driver.goto(&request.url))
                .await
                .map_err(|_| {
                    AdapterError::Timeout(format!(
                        "navigation to {} exceeded {}s",
                        request.url,
                        self.navigation_timeout.as_secs()
                    ))
                })??;

            if let Some(selector) = request.ready_selector.as_deref() {
                let ready = driver
                    .query(By::Css(selector))
                    .wait(self.ready_timeout, READY_POLL_INTERVAL)
                    .first()
                    .await;
                if ready.is_err() {
                    // Usually an empty results page; read it as is.
                    debug!(url = %request.url, selector, "ready selector not found before timeout");
                }
            }

            if !request.settle.is_zero() {
                tokio::time::sleep(request.settle).await;
            }

            Ok(driver.source().await?)
        }
    }

    #[async_trait]
    impl PageRenderer for WebDriverRenderer {
        async fn render(&self, request: &RenderRequest) -> Result<String, AdapterError> {
            debug!(url = %request.url, "rendering page with WebDriver");
            let caps = self.capabilities()?;
            let driver = tokio::time::timeout(
                self.navigation_timeout,
                WebDriver::new(&self.server_url, caps),
            )
            .await
            .map_err(|_| {
                AdapterError::Timeout(format!(
                    "WebDriver session at {} did not start",
                    self.server_url
                ))
            })??;

            let result = self.load(&driver, request).await;

            if let Err(e) = driver.quit().await {
                warn!(error = %e, "failed to close WebDriver session");
            }
            result
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_request_builder() {
        let request = RenderRequest::new("https://example.com/search?q=x")
            .wait_for("li.product")
            .settle(Duration::from_millis(500));
        assert_eq!(request.ready_selector.as_deref(), Some("li.product"));
        assert_eq!(request.settle, Duration::from_millis(500));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn test_build_renderer_without_webdriver_url() {
        let config = RenderConfig::default();
        assert!(build_renderer(&config).is_ok());
    }
}
