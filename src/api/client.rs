//! HTTP client for the upstream artist API.

use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::api::json::decode_with_context;
use crate::api::middleware::RequestLogger;
use crate::api::models::{
    ApiIndex, DateRecord, Indexed, LocationRecord, RawArtist, RelationRecord,
};
use crate::api::FetchError;

/// Everything the loader needs from upstream. Implemented by [`GroupieClient`];
/// tests substitute in-memory sources.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Fetch the root document listing the four resource URLs.
    async fn api_index(&self) -> Result<ApiIndex, FetchError>;

    async fn artists(&self, url: &str) -> Result<Vec<RawArtist>, FetchError>;

    /// Per-artist resources, addressed by the URLs carried on [`RawArtist`].
    async fn locations(&self, url: &str) -> Result<LocationRecord, FetchError>;
    async fn dates(&self, url: &str) -> Result<DateRecord, FetchError>;
    async fn relations(&self, url: &str) -> Result<RelationRecord, FetchError>;

    /// Bulk resources, addressed by the URLs of the [`ApiIndex`].
    async fn location_index(&self, url: &str) -> Result<Vec<LocationRecord>, FetchError>;
    async fn date_index(&self, url: &str) -> Result<Vec<DateRecord>, FetchError>;
    async fn relation_index(&self, url: &str) -> Result<Vec<RelationRecord>, FetchError>;
}

/// Build a reqwest client with the shared timeout and logging middleware.
pub fn build_http_client(
    timeout: Duration,
    user_agent: &str,
) -> anyhow::Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .context("Failed to build HTTP client")?;
    Ok(ClientBuilder::new(client).with(RequestLogger).build())
}

/// GET `url`, require 200, and decode the body as JSON into `T`.
pub async fn get_json<T: DeserializeOwned>(
    http: &ClientWithMiddleware,
    url: &str,
) -> Result<T, FetchError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Network {
            url: url.to_owned(),
            source,
        })?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(FetchError::BadStatus {
            url: url.to_owned(),
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::Network {
            url: url.to_owned(),
            source: e.into(),
        })?;

    decode_with_context(&body).map_err(|source| FetchError::Decode {
        url: url.to_owned(),
        source,
    })
}

/// Client for the artist API rooted at `base_url`.
pub struct GroupieClient {
    http: ClientWithMiddleware,
    base_url: String,
}

impl GroupieClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let user_agent = concat!("groupie-tracker/", env!("CARGO_PKG_VERSION"));
        Ok(Self {
            http: build_http_client(timeout, user_agent)?,
            base_url: base_url.into(),
        })
    }

    pub async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        get_json(&self.http, url).await
    }
}

#[async_trait]
impl UpstreamSource for GroupieClient {
    async fn api_index(&self) -> Result<ApiIndex, FetchError> {
        self.fetch(&self.base_url).await
    }

    async fn artists(&self, url: &str) -> Result<Vec<RawArtist>, FetchError> {
        self.fetch(url).await
    }

    async fn locations(&self, url: &str) -> Result<LocationRecord, FetchError> {
        self.fetch(url).await
    }

    async fn dates(&self, url: &str) -> Result<DateRecord, FetchError> {
        self.fetch(url).await
    }

    async fn relations(&self, url: &str) -> Result<RelationRecord, FetchError> {
        self.fetch(url).await
    }

    async fn location_index(&self, url: &str) -> Result<Vec<LocationRecord>, FetchError> {
        Ok(self.fetch::<Indexed<LocationRecord>>(url).await?.index)
    }

    async fn date_index(&self, url: &str) -> Result<Vec<DateRecord>, FetchError> {
        Ok(self.fetch::<Indexed<DateRecord>>(url).await?.index)
    }

    async fn relation_index(&self, url: &str) -> Result<Vec<RelationRecord>, FetchError> {
        Ok(self.fetch::<Indexed<RelationRecord>>(url).await?.index)
    }
}
