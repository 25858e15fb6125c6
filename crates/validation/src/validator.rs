//! Signature validation orchestrator

use crate::capabilities::{
    CertificateStore, PackageSignatureVerifier, SignaturePartsExtractor, SignedPackageReader,
    SigningStateRecorder,
};
use crate::cancel::{ensure_active, run_cancellable};
use crate::diagnostics::{format_verify_failure, IssueReport};
use pkgsig_errors::{Error, ValidationError};
use pkgsig_events::{AppEvent, EventEmitter, EventSender, RejectionReason, ValidationEvent};
use pkgsig_types::{
    PackageKey, SignatureRecord, SigningClassification, ValidationOutcome, ValidationRequest,
    ValidationStatus,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Terminal decision for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The package carries no signature.
    Unsigned,
    /// Signed, but refused by policy before cryptographic verification.
    Rejected(RejectionReason),
    /// Signed by a trusted certificate, but the verifier reported it invalid.
    VerifyFailed(IssueReport),
    /// Signed by a trusted certificate and verified; signature parts extracted.
    Accepted,
}

impl Verdict {
    #[must_use]
    pub fn classification(&self) -> SigningClassification {
        match self {
            Self::Unsigned => SigningClassification::Unsigned,
            Self::Rejected(_) | Self::VerifyFailed(_) => SigningClassification::Invalid,
            Self::Accepted => SigningClassification::Valid,
        }
    }

    #[must_use]
    pub fn status(&self) -> ValidationStatus {
        match self {
            Self::Unsigned | Self::Accepted => ValidationStatus::Succeeded,
            Self::Rejected(_) | Self::VerifyFailed(_) => ValidationStatus::Failed,
        }
    }
}

/// Sequences reader, trust store, verifier, extractor and recorder into a
/// single verdict per validation request.
///
/// Holds no mutable state of its own; one instance can serve concurrent
/// validations as long as the collaborators allow it.
pub struct SignatureValidator {
    recorder: Arc<dyn SigningStateRecorder>,
    verifier: Arc<dyn PackageSignatureVerifier>,
    extractor: Arc<dyn SignaturePartsExtractor>,
    certificates: Arc<dyn CertificateStore>,
    tx: Option<EventSender>,
}

impl SignatureValidator {
    #[must_use]
    pub fn new(
        recorder: Arc<dyn SigningStateRecorder>,
        verifier: Arc<dyn PackageSignatureVerifier>,
        extractor: Arc<dyn SignaturePartsExtractor>,
        certificates: Arc<dyn CertificateStore>,
    ) -> Self {
        Self {
            recorder,
            verifier,
            extractor,
            certificates,
            tx: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Validate one package and record its signing classification.
    ///
    /// On success the signing state has been recorded exactly once and
    /// `outcome.status` holds the terminal status. On any error, including
    /// cancellation, `outcome` is left as it was.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::AlreadyCompleted`] if `outcome` is already terminal
    /// - [`Error::Cancelled`] if `cancel` fires before the state is recorded;
    ///   nothing is recorded in that case
    /// - any error raised by a collaborator, unchanged
    pub async fn validate(
        &self,
        package: &dyn SignedPackageReader,
        outcome: &mut ValidationOutcome,
        request: &ValidationRequest,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        if outcome.is_terminal() {
            return Err(ValidationError::AlreadyCompleted {
                validation_id: request.validation_id.to_string(),
                status: outcome.status.to_string(),
            }
            .into());
        }

        let correlation = request.validation_id.to_string();
        self.emit_correlated(
            correlation.clone(),
            AppEvent::Validation(ValidationEvent::Started {
                package_id: request.package_id.clone(),
                package_version: request.package_version.clone(),
                validation_id: request.validation_id,
                package_key: outcome.package_key,
            }),
        );

        let verdict = match self.decide(outcome.package_key, package, request, cancel).await {
            Ok(verdict) => verdict,
            Err(Error::Cancelled) => return Err(self.cancelled(request)),
            Err(e) => return Err(e),
        };

        if ensure_active(cancel).is_err() {
            return Err(self.cancelled(request));
        }

        // Sole recorder call site. Once started, the write is allowed to finish.
        let classification = verdict.classification();
        self.recorder
            .set_signing_state(
                outcome.package_key,
                &request.package_id,
                &request.package_version,
                classification,
            )
            .await?;

        outcome.status = verdict.status();

        tracing::debug!(
            package_id = %request.package_id,
            package_version = %request.package_version,
            validation_id = %request.validation_id,
            %classification,
            status = %outcome.status,
            "signing state recorded"
        );
        self.emit_correlated(
            correlation,
            AppEvent::Validation(ValidationEvent::Recorded {
                package_key: outcome.package_key,
                package_id: request.package_id.clone(),
                package_version: request.package_version.clone(),
                classification,
                status: outcome.status,
            }),
        );

        Ok(())
    }

    /// Run the decision procedure up to, but excluding, the recorder call.
    async fn decide(
        &self,
        package_key: PackageKey,
        package: &dyn SignedPackageReader,
        request: &ValidationRequest,
        cancel: &CancellationToken,
    ) -> Result<Verdict, Error> {
        let signed = run_cancellable(cancel, package.is_signed(cancel)).await?;
        if !signed {
            self.emit_signatures_read(request, false, 0);
            tracing::info!(
                package_id = %request.package_id,
                package_version = %request.package_version,
                "package is not signed"
            );
            return Ok(Verdict::Unsigned);
        }

        let signatures = run_cancellable(cancel, package.get_signatures(cancel)).await?;
        self.emit_signatures_read(request, true, signatures.len());

        let signature = match signatures.as_slice() {
            [only] => only,
            _ => {
                return Ok(self.reject(
                    request,
                    RejectionReason::SignatureCount {
                        count: signatures.len(),
                    },
                ))
            }
        };

        if !self.is_trusted(signature, cancel).await? {
            return Ok(self.reject(
                request,
                RejectionReason::UntrustedSigner {
                    thumbprint: signature.thumbprint.clone(),
                },
            ));
        }

        let result = run_cancellable(cancel, self.verifier.verify_signatures(package, cancel)).await?;
        let report = IssueReport::from_result(&result);

        if !result.valid {
            self.report_verify_failure(request, &report);
            return Ok(Verdict::VerifyFailed(report));
        }

        if !report.is_empty() {
            tracing::debug!(
                package_id = %request.package_id,
                package_version = %request.package_version,
                errors = report.errors.len(),
                warnings = report.warnings.len(),
                "signature verified with issues"
            );
        }

        self.emit_correlated(
            request.validation_id.to_string(),
            AppEvent::Validation(ValidationEvent::Accepted {
                package_id: request.package_id.clone(),
                package_version: request.package_version.clone(),
                classification: SigningClassification::Valid,
            }),
        );

        // A started extraction runs to completion; it sees the token itself.
        ensure_active(cancel)?;
        self.extractor.extract(package_key, package, cancel).await?;
        self.emit_correlated(
            request.validation_id.to_string(),
            AppEvent::Validation(ValidationEvent::Extracted {
                package_id: request.package_id.clone(),
                package_version: request.package_version.clone(),
            }),
        );

        Ok(Verdict::Accepted)
    }

    async fn is_trusted(
        &self,
        signature: &SignatureRecord,
        cancel: &CancellationToken,
    ) -> Result<bool, Error> {
        let trusted =
            run_cancellable(cancel, self.certificates.get_all_trusted_certificates()).await?;
        Ok(trusted
            .iter()
            .any(|certificate| certificate.thumbprint == signature.thumbprint))
    }

    fn reject(&self, request: &ValidationRequest, reason: RejectionReason) -> Verdict {
        tracing::warn!(
            package_id = %request.package_id,
            package_version = %request.package_version,
            validation_id = %request.validation_id,
            %reason,
            "signed package rejected"
        );
        self.emit_correlated(
            request.validation_id.to_string(),
            AppEvent::Validation(ValidationEvent::Rejected {
                package_id: request.package_id.clone(),
                package_version: request.package_version.clone(),
                reason: reason.clone(),
            }),
        );
        Verdict::Rejected(reason)
    }

    fn report_verify_failure(&self, request: &ValidationRequest, report: &IssueReport) {
        let message = format_verify_failure(
            &request.package_id,
            &request.package_version,
            &request.validation_id,
            report,
        );
        tracing::error!(validation_id = %request.validation_id, "{message}");
        self.emit_correlated(
            request.validation_id.to_string(),
            AppEvent::Validation(ValidationEvent::VerifyFailed {
                package_id: request.package_id.clone(),
                package_version: request.package_version.clone(),
                validation_id: request.validation_id,
                message,
                errors: report.errors.clone(),
                warnings: report.warnings.clone(),
            }),
        );
    }

    fn emit_signatures_read(&self, request: &ValidationRequest, signed: bool, count: usize) {
        self.emit_correlated(
            request.validation_id.to_string(),
            AppEvent::Validation(ValidationEvent::SignaturesRead {
                package_id: request.package_id.clone(),
                package_version: request.package_version.clone(),
                signed,
                count,
            }),
        );
    }

    fn cancelled(&self, request: &ValidationRequest) -> Error {
        tracing::warn!(
            package_id = %request.package_id,
            package_version = %request.package_version,
            validation_id = %request.validation_id,
            "validation cancelled before signing state was recorded"
        );
        self.emit_correlated(
            request.validation_id.to_string(),
            AppEvent::Validation(ValidationEvent::Cancelled {
                package_id: request.package_id.clone(),
                package_version: request.package_version.clone(),
                validation_id: request.validation_id,
            }),
        );
        Error::Cancelled
    }
}

impl EventEmitter for SignatureValidator {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}
