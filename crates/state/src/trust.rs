//! `SQLite`-backed certificate trust store

use crate::models::CertificateRow;
use crate::queries;
use async_trait::async_trait;
use pkgsig_errors::{Error, StateError};
use pkgsig_events::{AppEvent, EventEmitter, EventSender, StateEvent};
use pkgsig_signing::PublicKeyRef;
use pkgsig_types::{Thumbprint, TrustedCertificate};
use pkgsig_validation::CertificateStore;
use sqlx::{Pool, Sqlite};

#[derive(Clone)]
pub struct SqliteTrustStore {
    pool: Pool<Sqlite>,
    tx: Option<EventSender>,
}

impl SqliteTrustStore {
    #[must_use]
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool, tx: None }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Trust a public key. Adding a known key updates its subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn add(
        &self,
        key: &PublicKeyRef,
        subject: Option<&str>,
    ) -> Result<TrustedCertificate, Error> {
        let mut tx = self.pool.begin().await?;
        queries::upsert_certificate(&mut tx, &key.id, subject, &key.data).await?;
        tx.commit().await?;

        tracing::info!(thumbprint = %key.id, "certificate trusted");
        self.emit(AppEvent::State(StateEvent::CertificateTrusted {
            thumbprint: key.id.clone(),
        }));

        let certificate = TrustedCertificate::new(key.id.clone());
        Ok(match subject {
            Some(subject) => certificate.with_subject(subject),
            None => certificate,
        })
    }

    /// Stop trusting a certificate.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::CertificateNotFound`] if no such certificate is trusted.
    pub async fn remove(&self, thumbprint: &Thumbprint) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;
        let removed = queries::delete_certificate(&mut tx, thumbprint).await?;
        tx.commit().await?;

        if !removed {
            return Err(StateError::CertificateNotFound {
                thumbprint: thumbprint.to_string(),
            }
            .into());
        }

        tracing::info!(%thumbprint, "certificate removed");
        self.emit(AppEvent::State(StateEvent::CertificateRemoved {
            thumbprint: thumbprint.clone(),
        }));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn list(&self) -> Result<Vec<CertificateRow>, Error> {
        let mut tx = self.pool.begin().await?;
        let rows = queries::list_certificates(&mut tx).await?;
        tx.commit().await?;
        Ok(rows)
    }

    /// Public keys of all trusted certificates, for building a verifier
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails.
    pub async fn public_keys(&self) -> Result<Vec<PublicKeyRef>, Error> {
        Ok(self.list().await?.iter().map(CertificateRow::public_key).collect())
    }
}

#[async_trait]
impl CertificateStore for SqliteTrustStore {
    async fn get_all_trusted_certificates(&self) -> Result<Vec<TrustedCertificate>, Error> {
        Ok(self.list().await?.iter().map(CertificateRow::certificate).collect())
    }
}

impl EventEmitter for SqliteTrustStore {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}
