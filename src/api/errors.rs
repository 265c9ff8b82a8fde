//! Error types for the upstream HTTP client.

/// Failure of a single remote call. No retries happen at this layer.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest_middleware::Error,
    },
    #[error("{url} responded with status {status}")]
    BadStatus { url: String, status: u16 },
    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

impl FetchError {
    /// The URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. } | Self::BadStatus { url, .. } | Self::Decode { url, .. } => {
                url
            }
        }
    }
}
