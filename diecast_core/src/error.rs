// src/error.rs

/// Outcome-level errors surfaced by the aggregator to its callers.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No results found")]
    NoResults,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchError {
    pub fn code_str(&self) -> &'static str {
        match self {
            SearchError::InvalidInput(_) => "invalid_input",
            SearchError::NoResults => "no_results",
            SearchError::Internal(_) => "internal_error",
        }
    }
}

/// Failures inside a single source adapter.
///
/// These never leave the adapter boundary: `SourceAdapter::fetch` logs them
/// and degrades to an empty contribution.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Upstream returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AdapterError {
    pub fn code_str(&self) -> &'static str {
        match self {
            AdapterError::Http(_) => "upstream_error",
            AdapterError::Browser(_) => "browser_error",
            AdapterError::Authentication(_) => "auth_failed",
            AdapterError::Upstream { .. } => "upstream_error",
            AdapterError::Parse(_) => "parse_error",
            AdapterError::Timeout(_) => "timeout",
            AdapterError::MissingCredentials(_) => "missing_credentials",
            AdapterError::Config(_) => "config_error",
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            AdapterError::Timeout(_) => true,
            AdapterError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Parse(err.to_string())
    }
}

#[cfg(feature = "webdriver")]
impl From<thirtyfour::error::WebDriverError> for AdapterError {
    fn from(err: thirtyfour::error::WebDriverError) -> Self {
        AdapterError::Browser(err.to_string())
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
