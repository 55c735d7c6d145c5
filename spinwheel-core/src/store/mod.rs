// src/store/mod.rs
//
// Per-user durable draw history with lazy, awaited initialization and
// graceful degradation to "never drawn" when the backend is unusable.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, SubsecRound, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use spinwheel_common::models::{DrawRecord, VoucherOffer};
use spinwheel_common::traits::repository_traits::DrawRecordRepository;

use crate::db::Database;
use crate::repositories::{InMemoryDrawRecordRepository, SqliteDrawRecordRepository};
use crate::Error;

type Backend = Arc<dyn DrawRecordRepository>;

pub struct PersistentDrawStore {
    database_url: Option<String>,
    backend: OnceCell<Backend>,
    degraded: AtomicBool,
}

impl PersistentDrawStore {
    /// Backend is opened on first use. `None` keeps history in memory only.
    pub fn new(database_url: Option<String>) -> Self {
        Self {
            database_url,
            backend: OnceCell::new(),
            degraded: AtomicBool::new(false),
        }
    }

    /// Wrap an already-open repository.
    pub fn with_repository(repo: Arc<dyn DrawRecordRepository>) -> Self {
        Self {
            database_url: None,
            backend: OnceCell::from(repo),
            degraded: AtomicBool::new(false),
        }
    }

    /// Resolves once the backend is open and migrated. All callers share one open attempt.
    pub async fn ready(&self) -> &Backend {
        self.backend.get_or_init(|| self.open_backend()).await
    }

    async fn open_backend(&self) -> Backend {
        let Some(url) = self.database_url.as_deref() else {
            info!("No draw store database configured; draw history is kept in memory only.");
            return Arc::new(InMemoryDrawRecordRepository::new());
        };

        match open_sqlite(url).await {
            Ok(repo) => Arc::new(repo),
            Err(e) => {
                error!(
                    "Draw store unavailable at '{}': {}. Treating every user as never drawn.",
                    url, e
                );
                self.degraded.store(true, Ordering::SeqCst);
                Arc::new(InMemoryDrawRecordRepository::new())
            }
        }
    }

    /// True when the configured backend failed to open and the memory fallback is in use.
    pub async fn is_degraded(&self) -> bool {
        self.ready().await;
        self.degraded.load(Ordering::SeqCst)
    }

    /// Last draw for `user_id`. Read failures are logged and read as "never drawn".
    pub async fn get(&self, user_id: &str) -> Option<DrawRecord> {
        let backend = self.ready().await;
        match backend.get(user_id).await {
            Ok(Some(record)) if record.user_id == user_id => Some(record),
            Ok(Some(record)) => {
                warn!(
                    "Draw store returned a record for '{}' when asked for '{}'; ignoring it.",
                    record.user_id, user_id
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Draw store read failed for user '{}': {}. Treating as never drawn.", user_id, e);
                None
            }
        }
    }

    /// Replace the record for `user_id`. Completes only once the backend acknowledged the write.
    ///
    /// `drawn_at` is stored at millisecond precision on every backend; the
    /// returned record carries the stored value.
    pub async fn put(
        &self,
        user_id: &str,
        drawn_at: DateTime<Utc>,
        offer: &VoucherOffer,
    ) -> Result<DrawRecord, Error> {
        let drawn_at = drawn_at.trunc_subsecs(3);
        let backend = self.ready().await;
        backend.put(user_id, drawn_at, offer).await.map_err(|e| {
            error!("Draw store write failed for user '{}': {}", user_id, e);
            e
        })?;
        debug!("Stored draw of offer '{}' for user '{}'", offer.id, user_id);
        Ok(DrawRecord {
            user_id: user_id.to_string(),
            drawn_at,
            offer: offer.clone(),
        })
    }
}

async fn open_sqlite(url: &str) -> Result<SqliteDrawRecordRepository, Error> {
    let db = Database::new(url).await?;
    db.migrate().await?;
    Ok(SqliteDrawRecordRepository::new(db.pool().clone()))
}
