//! Country polygon documents.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::config::{http_client, GeometryConfig};
use crate::error::{FetchError, IngestionError, Result};

/// Provider of a GeoJSON FeatureCollection of countries.
#[async_trait]
pub trait GeometrySource: Send + Sync {
    async fn load(&self) -> Result<String>;

    fn describe(&self) -> String;
}

/// Pick the local file when configured, the remote document otherwise.
pub fn from_config(config: &GeometryConfig) -> Result<Box<dyn GeometrySource>> {
    Ok(match &config.local_path {
        Some(path) => Box::new(LocalGeometryFile::new(path.clone())),
        None => Box::new(HttpGeometry::new(config)?),
    })
}

pub struct HttpGeometry {
    client: Client,
    url: String,
}

impl HttpGeometry {
    pub fn new(config: &GeometryConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout)?,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl GeometrySource for HttpGeometry {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> Result<String> {
        let text = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(&self.url, e))?
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&self.url, e))?;

        info!(bytes = text.len(), "Downloaded country geometry");
        Ok(text)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub struct LocalGeometryFile {
    path: PathBuf,
}

impl LocalGeometryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl GeometrySource for LocalGeometryFile {
    async fn load(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| IngestionError::FileRead {
                path: self.path.clone(),
                source,
            })
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
