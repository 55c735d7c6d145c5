// src/repositories/sqlite/draw_records.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use spinwheel_common::models::{DrawRecord, VoucherOffer};
use spinwheel_common::traits::repository_traits::DrawRecordRepository;

use crate::Error;

pub struct SqliteDrawRecordRepository {
    pool: Pool<Sqlite>,
}

impl SqliteDrawRecordRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DrawRecordRepository for SqliteDrawRecordRepository {
    async fn get(&self, user_id: &str) -> Result<Option<DrawRecord>, Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id, drawn_at_ms, offer
            FROM draw_records
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let drawn_at_ms: i64 = r.try_get("drawn_at_ms")?;
        let drawn_at = DateTime::<Utc>::from_timestamp_millis(drawn_at_ms).ok_or_else(|| {
            Error::Store(format!("draw record for '{user_id}' has invalid timestamp {drawn_at_ms}"))
        })?;
        let offer_json: String = r.try_get("offer")?;
        let offer: VoucherOffer = serde_json::from_str(&offer_json)?;

        Ok(Some(DrawRecord {
            user_id: r.try_get("user_id")?,
            drawn_at,
            offer,
        }))
    }

    async fn put(
        &self,
        user_id: &str,
        drawn_at: DateTime<Utc>,
        offer: &VoucherOffer,
    ) -> Result<(), Error> {
        let offer_json = serde_json::to_string(offer)?;
        sqlx::query(
            r#"
            INSERT INTO draw_records (user_id, drawn_at_ms, offer)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE
            SET drawn_at_ms = excluded.drawn_at_ms,
                offer = excluded.offer
            "#,
        )
        .bind(user_id)
        .bind(drawn_at.timestamp_millis())
        .bind(offer_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
