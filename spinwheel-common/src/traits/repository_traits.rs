use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::models::{DrawRecord, VoucherOffer};

/// Durable key-value storage for draw records, keyed by user id.
///
/// A `put` for one user must never become visible under another user id,
/// and a new `put` replaces the previous record for that user.
#[async_trait]
pub trait DrawRecordRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<DrawRecord>, Error>;

    async fn put(
        &self,
        user_id: &str,
        drawn_at: DateTime<Utc>,
        offer: &VoucherOffer,
    ) -> Result<(), Error>;
}

/// Source of the raw offer catalog. Order of the returned list is significant.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_offers(&self) -> Result<Vec<VoucherOffer>, Error>;
}
