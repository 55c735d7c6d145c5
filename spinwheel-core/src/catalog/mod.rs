// src/catalog/mod.rs

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use spinwheel_common::models::VoucherOffer;
use spinwheel_common::traits::repository_traits::CatalogSource;

use crate::Error;

/// Fixed offer list, already fetched by the host.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    offers: Vec<VoucherOffer>,
}

impl StaticCatalog {
    pub fn new(offers: Vec<VoucherOffer>) -> Self {
        Self { offers }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_offers(&self) -> Result<Vec<VoucherOffer>, Error> {
        Ok(self.offers.clone())
    }
}

/// JSON file holding an array of offers, as exported by the catalog API.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn fetch_offers(&self) -> Result<Vec<VoucherOffer>, Error> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Catalog(format!("cannot read catalog {}: {}", self.path.display(), e))
        })?;
        let offers: Vec<VoucherOffer> = serde_json::from_str(&raw)?;
        debug!("Loaded {} offer(s) from {}", offers.len(), self.path.display());
        Ok(offers)
    }
}
