// catalog/client.rs
// Access to the remote catalog service

use super::models::*;
use crate::config::{ClientSettings, Endpoints, PROFILE_HEADER};
use crate::error::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_schemas(&self) -> Result<Vec<SchemaId>, FetchError>;
    /// Fetches the API document of one profile.
    async fn fetch_spec(&self, profile: &str) -> Result<ApiSpecification, FetchError>;
    async fn fetch_metadata(&self) -> Result<Vec<MetadataRecord>, FetchError>;
}

/// Fetches the metadata catalog and orders it by schema name.
pub async fn load_catalog(source: &dyn CatalogSource) -> Result<Vec<MetadataRecord>, FetchError> {
    let mut records = source.fetch_metadata().await?;
    sort_catalog(&mut records);
    Ok(records)
}

pub fn sort_catalog(records: &mut [MetadataRecord]) {
    records.sort_by(|a, b| a.schema_name.cmp(&b.schema_name));
}

// ------------------- HTTP -------------------
pub struct HttpCatalog {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpCatalog {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoints: settings.endpoints.clone(),
        })
    }

    async fn get_text(&self, url: &Url, profile: Option<&str>) -> Result<String, FetchError> {
        let mut request = self.client.get(url.clone());
        if let Some(profile) = profile {
            request = request.header(PROFILE_HEADER, profile);
        }
        tracing::debug!(%url, ?profile, "GET");
        let response = request.send().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url, profile: Option<&str>) -> Result<T, FetchError> {
        let body = self.get_text(url, profile).await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_schemas(&self) -> Result<Vec<SchemaId>, FetchError> {
        self.get_json(&self.endpoints.schemas, None).await
    }

    async fn fetch_spec(&self, profile: &str) -> Result<ApiSpecification, FetchError> {
        self.get_json(&self.endpoints.spec, Some(profile)).await
    }

    async fn fetch_metadata(&self) -> Result<Vec<MetadataRecord>, FetchError> {
        let records: Vec<MetadataRecord> = self.get_json(&self.endpoints.metadata, None).await?;
        tracing::info!(count = records.len(), "metadata catalog received");
        Ok(records)
    }
}
