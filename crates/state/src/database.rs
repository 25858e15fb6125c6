//! Shared pool wiring for the `SQLite` collaborators

use crate::{
    create_pool, run_migrations, SqliteSignaturePartsExtractor, SqliteSigningStateRecorder,
    SqliteTrustStore,
};
use pkgsig_errors::Error;
use pkgsig_events::EventSender;
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// An opened and migrated signing database.
#[derive(Clone)]
pub struct SigningDatabase {
    pool: Pool<Sqlite>,
    tx: Option<EventSender>,
}

impl SigningDatabase {
    /// Open (creating if needed) the database at `db_path` and migrate it
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created, the
    /// connection fails, or a migration fails.
    pub async fn open(db_path: &Path) -> Result<Self, Error> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| Error::io_with_path(&e, parent))?;
            }
        }

        let pool = create_pool(db_path).await?;
        run_migrations(&pool).await?;
        tracing::debug!(path = %db_path.display(), "signing database ready");

        Ok(Self { pool, tx: None })
    }

    #[must_use]
    pub fn with_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool, tx: None }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    #[must_use]
    pub fn trust_store(&self) -> SqliteTrustStore {
        let store = SqliteTrustStore::new(self.pool.clone());
        match &self.tx {
            Some(tx) => store.with_event_sender(tx.clone()),
            None => store,
        }
    }

    #[must_use]
    pub fn recorder(&self) -> SqliteSigningStateRecorder {
        let recorder = SqliteSigningStateRecorder::new(self.pool.clone());
        match &self.tx {
            Some(tx) => recorder.with_event_sender(tx.clone()),
            None => recorder,
        }
    }

    #[must_use]
    pub fn extractor(&self) -> SqliteSignaturePartsExtractor {
        let extractor = SqliteSignaturePartsExtractor::new(self.pool.clone());
        match &self.tx {
            Some(tx) => extractor.with_event_sender(tx.clone()),
            None => extractor,
        }
    }
}
