//! Persists signature metadata of accepted packages

use crate::models::SignaturePartRow;
use crate::queries;
use async_trait::async_trait;
use pkgsig_errors::Error;
use pkgsig_events::{AppEvent, EventEmitter, EventSender, StateEvent};
use pkgsig_types::{PackageKey, Thumbprint};
use pkgsig_validation::cancel::ensure_active;
use pkgsig_validation::{SignaturePartsExtractor, SignedPackageReader};
use sqlx::{Pool, Sqlite};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct SqliteSignaturePartsExtractor {
    pool: Pool<Sqlite>,
    tx: Option<EventSender>,
}

impl SqliteSignaturePartsExtractor {
    #[must_use]
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool, tx: None }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Stored signatures made by `thumbprint`
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn signatures_for(
        &self,
        thumbprint: &Thumbprint,
    ) -> Result<Vec<SignaturePartRow>, Error> {
        let mut tx = self.pool.begin().await?;
        let rows = queries::signature_parts_for(&mut tx, thumbprint).await?;
        tx.commit().await?;
        Ok(rows)
    }

    /// Stored signatures extracted from the package with `package_key`
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn signatures_of_package(
        &self,
        package_key: PackageKey,
    ) -> Result<Vec<SignaturePartRow>, Error> {
        let mut tx = self.pool.begin().await?;
        let rows = queries::signature_parts_of_package(&mut tx, package_key).await?;
        tx.commit().await?;
        Ok(rows)
    }
}

#[async_trait]
impl SignaturePartsExtractor for SqliteSignaturePartsExtractor {
    async fn extract(
        &self,
        package_key: PackageKey,
        package: &dyn SignedPackageReader,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let signatures = package.get_signatures(cancel).await?;

        let mut tx = self.pool.begin().await?;
        let mut stored = 0;
        for record in &signatures {
            if queries::insert_signature_part(&mut tx, package_key, record).await? {
                stored += 1;
            }
        }
        // Dropping the transaction rolls it back.
        ensure_active(cancel)?;
        tx.commit().await?;

        tracing::debug!(
            package_key,
            signatures = signatures.len(),
            stored,
            "signature parts extracted"
        );
        self.emit(AppEvent::State(StateEvent::SignaturePartsStored {
            package_key,
            signatures: stored,
        }));
        Ok(())
    }
}

impl EventEmitter for SqliteSignaturePartsExtractor {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}
