use thiserror::Error;

/// Failures of the header source. The engine never retries these.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url '{0}': {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("unsupported scheme '{0}' (only http and https are analyzed)")]
    UnsupportedScheme(String),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("nothing to publish: request has no files")]
    Empty,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("required rule '{0}' has no canonical fix")]
    MissingFix(String),

    #[error("duplicate rule name '{0}'")]
    DuplicateRule(String),
}
