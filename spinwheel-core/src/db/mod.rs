// spinwheel-core/src/db/mod.rs

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::Error;

pub const MEMORY_URL: &str = ":memory:";

/// SQLite pool backing the durable draw store.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if needed) the database at `database_url`.
    ///
    /// `":memory:"` gives a private in-memory database on a single pinned
    /// connection, since every SQLite memory connection is its own database.
    pub async fn new(database_url: &str) -> Result<Self, Error> {
        let pool = if database_url == MEMORY_URL {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            let path = Path::new(database_url);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        info!("Connected to SQLite draw store at {}", database_url);
        Ok(Self { pool })
    }

    /// Run migrations in the workspace `migrations/` folder.
    pub async fn migrate(&self) -> Result<(), Error> {
        info!("Applying draw store migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Draw store migrations applied.");
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close all connections. Used to simulate a restart in tests and on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
