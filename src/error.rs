// error.rs
// Error types for talking to the catalog service

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: reqwest::StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. } | FetchError::Status { url, .. } | FetchError::Decode { url, .. } => url,
        }
    }
}
