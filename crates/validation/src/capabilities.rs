//! Collaborator capabilities consumed by the signature validator

use async_trait::async_trait;
use pkgsig_errors::Error;
use pkgsig_types::{
    PackageKey, SignatureRecord, SigningClassification, TrustedCertificate, VerificationResult,
};
use tokio_util::sync::CancellationToken;

/// Read access to one package and its embedded or detached signatures.
#[async_trait]
pub trait SignedPackageReader: Send + Sync {
    /// Whether the package claims to carry any signature at all
    async fn is_signed(&self, cancel: &CancellationToken) -> Result<bool, Error>;

    /// Parsed signature records, in the order the package stores them
    async fn get_signatures(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<SignatureRecord>, Error>;

    /// Raw package content. The validator never calls this; verifiers and
    /// extractors do.
    async fn read_content(&self, cancel: &CancellationToken) -> Result<Vec<u8>, Error>;
}

/// Enumerates trusted certificates. Filtering is done by the caller.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    async fn get_all_trusted_certificates(&self) -> Result<Vec<TrustedCertificate>, Error>;
}

/// Cryptographic verification of a package's signatures.
#[async_trait]
pub trait PackageSignatureVerifier: Send + Sync {
    async fn verify_signatures(
        &self,
        package: &dyn SignedPackageReader,
        cancel: &CancellationToken,
    ) -> Result<VerificationResult, Error>;
}

/// Persists detailed signature metadata for a validly signed package.
///
/// Once called, an extraction is driven to completion by the orchestrator;
/// implementations observe `cancel` themselves and must not commit after it
/// fires.
#[async_trait]
pub trait SignaturePartsExtractor: Send + Sync {
    async fn extract(
        &self,
        package_key: PackageKey,
        package: &dyn SignedPackageReader,
        cancel: &CancellationToken,
    ) -> Result<(), Error>;
}

/// Durable store of the signing classification per package.
#[async_trait]
pub trait SigningStateRecorder: Send + Sync {
    async fn set_signing_state(
        &self,
        package_key: PackageKey,
        package_id: &str,
        package_version: &str,
        classification: SigningClassification,
    ) -> Result<(), Error>;
}
