//! Client data sources
//!
//! Exactly one strategy resolves a [`ClientId`] into metrics, chosen once
//! from the configured [`DataMode`].

use super::config::{DataMode, GatewayConfig};
use super::dataset::DatasetCache;
use super::error::GatewayError;
use super::metrics::{ClientId, MetricsRecord};
use super::remote::{RemoteClientFetcher, RemoteFetchError};
use std::sync::Arc;

/// Strategy for identifier lookups
#[derive(Clone)]
pub enum ClientSource {
    /// `DATA_MODE=NONE`: identifier lookups are refused
    Disabled,
    /// `DATA_MODE=CSV`: lookups against the cached dataset
    Dataset(Arc<DatasetCache>),
    /// `DATA_MODE=REMOTE`: lookups against the client-data service
    Remote(RemoteClientFetcher),
}

impl ClientSource {
    /// Build the source selected by configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self, RemoteFetchError> {
        Ok(match config.data_mode {
            DataMode::None => ClientSource::Disabled,
            DataMode::Csv => ClientSource::Dataset(Arc::new(DatasetCache::new(&config.dataset_path))),
            DataMode::Remote => ClientSource::Remote(RemoteClientFetcher::new(config.remote.clone())?),
        })
    }

    pub fn mode(&self) -> DataMode {
        match self {
            ClientSource::Disabled => DataMode::None,
            ClientSource::Dataset(_) => DataMode::Csv,
            ClientSource::Remote(_) => DataMode::Remote,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, ClientSource::Disabled)
    }

    /// Resolve an identifier into a normalized metrics record
    pub async fn resolve(&self, id: &ClientId) -> Result<MetricsRecord, GatewayError> {
        match self {
            ClientSource::Disabled => Err(GatewayError::FeatureDisabled),
            ClientSource::Dataset(cache) => cache.lookup(id).await?.ok_or(GatewayError::NotFound),
            ClientSource::Remote(fetcher) => Ok(fetcher.fetch(id).await?),
        }
    }
}

impl std::fmt::Debug for ClientSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientSource::Disabled => f.write_str("ClientSource::Disabled"),
            ClientSource::Dataset(cache) => f.debug_tuple("ClientSource::Dataset").field(cache).finish(),
            ClientSource::Remote(fetcher) => f
                .debug_tuple("ClientSource::Remote")
                .field(&fetcher.config().base_url)
                .finish(),
        }
    }
}
