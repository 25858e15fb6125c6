//! Database models for signing state

use chrono::{DateTime, Utc};
use pkgsig_errors::{Error, StateError};
use pkgsig_signing::{Algorithm, PublicKeyRef};
use pkgsig_types::{PackageKey, SigningClassification, Thumbprint, TrustedCertificate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A trusted certificate record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateRow {
    pub thumbprint: String,
    pub subject: Option<String>,
    pub public_key: String,
    pub added_at: i64,
}

impl CertificateRow {
    #[must_use]
    pub fn certificate(&self) -> TrustedCertificate {
        let certificate = TrustedCertificate::new(self.thumbprint.as_str());
        match &self.subject {
            Some(subject) => certificate.with_subject(subject.clone()),
            None => certificate,
        }
    }

    #[must_use]
    pub fn public_key(&self) -> PublicKeyRef {
        PublicKeyRef {
            id: Thumbprint::new(self.thumbprint.clone()),
            algo: Algorithm::Minisign,
            data: self.public_key.clone(),
        }
    }

    #[must_use]
    pub fn added(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.added_at, 0)
    }
}

/// The recorded signing classification of one package
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningStateRow {
    pub package_key: PackageKey,
    pub package_id: String,
    pub package_version: String,
    pub status: String,
    pub updated_at: i64,
}

impl SigningStateRow {
    /// Parse the stored status
    ///
    /// # Errors
    ///
    /// Returns an error if the row holds a status this build does not know.
    pub fn classification(&self) -> Result<SigningClassification, Error> {
        SigningClassification::parse(&self.status).ok_or_else(|| {
            StateError::StateCorrupted {
                message: format!(
                    "unknown signing status '{}' for package key {}",
                    self.status, self.package_key
                ),
            }
            .into()
        })
    }

    #[must_use]
    pub fn updated(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.updated_at, 0)
    }
}

/// Signature metadata extracted from an accepted package
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignaturePartRow {
    pub id: i64,
    pub package_key: PackageKey,
    pub thumbprint: String,
    pub trusted_comment: Option<String>,
    pub signature: String,
    pub extracted_at: i64,
}
