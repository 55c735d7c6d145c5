// src/repositories/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use spinwheel_common::models::{DrawRecord, VoucherOffer};
use spinwheel_common::traits::repository_traits::DrawRecordRepository;

use crate::Error;

/// Non-durable draw records. Lives as long as the process.
#[derive(Default)]
pub struct InMemoryDrawRecordRepository {
    records: DashMap<String, DrawRecord>,
}

impl InMemoryDrawRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl DrawRecordRepository for InMemoryDrawRecordRepository {
    async fn get(&self, user_id: &str) -> Result<Option<DrawRecord>, Error> {
        Ok(self.records.get(user_id).map(|r| r.value().clone()))
    }

    async fn put(
        &self,
        user_id: &str,
        drawn_at: DateTime<Utc>,
        offer: &VoucherOffer,
    ) -> Result<(), Error> {
        self.records.insert(
            user_id.to_string(),
            DrawRecord {
                user_id: user_id.to_string(),
                drawn_at,
                offer: offer.clone(),
            },
        );
        Ok(())
    }
}
