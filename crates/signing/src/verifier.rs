//! Minisign verification of package signatures

use crate::keys::{signature_algorithm, Algorithm, PublicKeyRef, SignatureAlgorithm};
use async_trait::async_trait;
use minisign_verify::{PublicKey, Signature};
use pkgsig_errors::Error;
use pkgsig_types::{Issue, SignatureCheck, SignatureRecord, Thumbprint, VerificationResult};
use pkgsig_validation::cancel::ensure_active;
use pkgsig_validation::{PackageSignatureVerifier, SignedPackageReader};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// Issue codes reported by [`MinisignVerifier`].
pub mod codes {
    pub const NO_PUBLIC_KEY: &str = "PS3001";
    pub const INVALID_PUBLIC_KEY: &str = "PS3002";
    pub const INTEGRITY_CHECK_FAILED: &str = "PS3008";
    pub const LEGACY_ALGORITHM: &str = "PS3016";
}

/// Verifies every signature of a package against a fixed set of public keys.
#[derive(Debug, Clone, Default)]
pub struct MinisignVerifier {
    keys: HashMap<Thumbprint, PublicKeyRef>,
}

impl MinisignVerifier {
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = PublicKeyRef>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .filter(|key| key.algo == Algorithm::Minisign)
                .map(|key| (key.id.clone(), key))
                .collect(),
        }
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Check one signature against `content`.
    #[must_use]
    pub fn check(&self, content: &[u8], record: &SignatureRecord) -> SignatureCheck {
        let mut issues = Vec::new();

        // Decoding already succeeded when the record was read; a failure here
        // means the record was built by hand.
        let signature = match Signature::decode(&record.encoded) {
            Ok(signature) => signature,
            Err(e) => {
                issues.push(Issue::error(
                    codes::INTEGRITY_CHECK_FAILED,
                    format!("The signature could not be decoded: {e}"),
                ));
                return SignatureCheck::new(issues).for_signer(record.thumbprint.clone());
            }
        };

        if let Some(line) = record.encoded.lines().nth(1) {
            if matches!(signature_algorithm(line), Ok(SignatureAlgorithm::Legacy)) {
                issues.push(Issue::warning(
                    codes::LEGACY_ALGORITHM,
                    "The signature was created with a legacy algorithm.",
                ));
            }
        }

        match self.keys.get(&record.thumbprint) {
            None => issues.push(Issue::error(
                codes::NO_PUBLIC_KEY,
                format!(
                    "No public key is registered for signing certificate {}.",
                    record.thumbprint
                ),
            )),
            Some(key) => match PublicKey::from_base64(&key.data) {
                Err(e) => issues.push(Issue::error(
                    codes::INVALID_PUBLIC_KEY,
                    format!("The public key for {} could not be decoded: {e}", key.id),
                )),
                Ok(public_key) => {
                    if let Err(e) = public_key.verify(content, &signature, true) {
                        tracing::debug!(
                            thumbprint = %record.thumbprint,
                            error = %e,
                            "minisign verification failed"
                        );
                        issues.push(Issue::error(
                            codes::INTEGRITY_CHECK_FAILED,
                            "The package integrity check failed.",
                        ));
                    }
                }
            },
        }

        SignatureCheck::new(issues).for_signer(record.thumbprint.clone())
    }
}

#[async_trait]
impl PackageSignatureVerifier for MinisignVerifier {
    async fn verify_signatures(
        &self,
        package: &dyn SignedPackageReader,
        cancel: &CancellationToken,
    ) -> Result<VerificationResult, Error> {
        let signatures = package.get_signatures(cancel).await?;
        let content = package.read_content(cancel).await?;
        ensure_active(cancel)?;

        let results: Vec<SignatureCheck> = signatures
            .iter()
            .map(|record| self.check(&content, record))
            .collect();
        let valid = !results.is_empty() && results.iter().all(|check| !check.has_errors());

        tracing::debug!(
            signatures = results.len(),
            valid,
            "verified package signatures"
        );
        Ok(VerificationResult::with_results(valid, results))
    }
}
