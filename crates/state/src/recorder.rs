//! `SQLite`-backed signing state recorder

use crate::models::SigningStateRow;
use crate::queries;
use async_trait::async_trait;
use pkgsig_errors::{Error, StateError};
use pkgsig_events::{AppEvent, EventEmitter, EventSender, StateEvent};
use pkgsig_types::{PackageKey, SigningClassification};
use pkgsig_validation::SigningStateRecorder;
use sqlx::{Pool, Sqlite};

/// Keeps one signing classification per package key; later writes replace
/// earlier ones.
#[derive(Clone)]
pub struct SqliteSigningStateRecorder {
    pool: Pool<Sqlite>,
    tx: Option<EventSender>,
}

impl SqliteSigningStateRecorder {
    #[must_use]
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool, tx: None }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Look up the recorded state of a package
    ///
    /// # Errors
    ///
    /// Returns [`StateError::SigningStateNotFound`] if nothing was recorded.
    pub async fn get(&self, package_key: PackageKey) -> Result<SigningStateRow, Error> {
        let mut tx = self.pool.begin().await?;
        let row = queries::get_signing_state(&mut tx, package_key).await?;
        tx.commit().await?;

        row.ok_or_else(|| StateError::SigningStateNotFound { package_key }.into())
    }
}

#[async_trait]
impl SigningStateRecorder for SqliteSigningStateRecorder {
    async fn set_signing_state(
        &self,
        package_key: PackageKey,
        package_id: &str,
        package_version: &str,
        classification: SigningClassification,
    ) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        queries::upsert_signing_state(
            &mut tx,
            package_key,
            package_id,
            package_version,
            classification,
        )
        .await?;
        tx.commit().await?;

        self.emit(AppEvent::State(StateEvent::SigningStateRecorded {
            package_key,
            classification,
        }));
        Ok(())
    }
}

impl EventEmitter for SqliteSigningStateRecorder {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}
