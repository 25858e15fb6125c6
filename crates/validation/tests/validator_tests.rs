//! Orchestrator behaviour against in-memory collaborators

use async_trait::async_trait;
use pkgsig_errors::{Error, ValidationError};
use pkgsig_events::{channel, AppEvent, EventLevel, EventReceiver, ValidationEvent};
use pkgsig_types::{
    Issue, PackageKey, SignatureCheck, SignatureRecord, SigningClassification, TrustedCertificate,
    Url, Uuid, ValidationOutcome, ValidationRequest, ValidationStatus, VerificationResult,
};
use pkgsig_validation::{
    CancellationToken, CertificateStore, PackageSignatureVerifier, SignatureValidator,
    SignaturePartsExtractor, SignedPackageReader, SigningStateRecorder,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const PACKAGE_KEY: PackageKey = 42;

struct FakePackage {
    signed: bool,
    signatures: Vec<SignatureRecord>,
    fail_reads: bool,
}

impl FakePackage {
    fn unsigned() -> Self {
        Self {
            signed: false,
            signatures: Vec::new(),
            fail_reads: false,
        }
    }

    fn signed_by(thumbprints: &[&str]) -> Self {
        Self {
            signed: true,
            signatures: thumbprints
                .iter()
                .map(|t| SignatureRecord::new(*t, format!("sig-{t}")))
                .collect(),
            fail_reads: false,
        }
    }
}

#[async_trait]
impl SignedPackageReader for FakePackage {
    async fn is_signed(&self, _cancel: &CancellationToken) -> Result<bool, Error> {
        if self.fail_reads {
            return Err(Error::internal("package content is corrupt"));
        }
        Ok(self.signed)
    }

    async fn get_signatures(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Vec<SignatureRecord>, Error> {
        Ok(self.signatures.clone())
    }

    async fn read_content(&self, _cancel: &CancellationToken) -> Result<Vec<u8>, Error> {
        Ok(b"package".to_vec())
    }
}

#[derive(Default)]
struct FakeTrustStore {
    certificates: Vec<TrustedCertificate>,
    calls: AtomicUsize,
}

#[async_trait]
impl CertificateStore for FakeTrustStore {
    async fn get_all_trusted_certificates(&self) -> Result<Vec<TrustedCertificate>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.certificates.clone())
    }
}

enum VerifierBehaviour {
    Return(VerificationResult),
    Fail,
    /// Fire the token while verifying, then report success.
    CancelDuring(CancellationToken),
}

struct FakeVerifier {
    behaviour: VerifierBehaviour,
    calls: AtomicUsize,
}

#[async_trait]
impl PackageSignatureVerifier for FakeVerifier {
    async fn verify_signatures(
        &self,
        _package: &dyn SignedPackageReader,
        _cancel: &CancellationToken,
    ) -> Result<VerificationResult, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            VerifierBehaviour::Return(result) => Ok(result.clone()),
            VerifierBehaviour::Fail => Err(Error::internal("verifier unavailable")),
            VerifierBehaviour::CancelDuring(token) => {
                token.cancel();
                Ok(VerificationResult::new(true))
            }
        }
    }
}

#[derive(Default)]
struct FakeExtractor {
    calls: AtomicUsize,
    finished: AtomicUsize,
    package_keys: Mutex<Vec<PackageKey>>,
    fail: bool,
    /// Fire this token and yield once before finishing.
    cancel_midway: Option<CancellationToken>,
}

#[async_trait]
impl SignaturePartsExtractor for FakeExtractor {
    async fn extract(
        &self,
        package_key: PackageKey,
        _package: &dyn SignedPackageReader,
        _cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.package_keys.lock().unwrap().push(package_key);
        if self.fail {
            return Err(Error::internal("extraction failed"));
        }
        if let Some(token) = &self.cancel_midway {
            token.cancel();
            tokio::task::yield_now().await;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

type RecordedState = (PackageKey, String, String, SigningClassification);

#[derive(Default)]
struct FakeRecorder {
    calls: Mutex<Vec<RecordedState>>,
    fail: bool,
}

impl FakeRecorder {
    fn recorded(&self) -> Vec<RecordedState> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SigningStateRecorder for FakeRecorder {
    async fn set_signing_state(
        &self,
        package_key: PackageKey,
        package_id: &str,
        package_version: &str,
        classification: SigningClassification,
    ) -> Result<(), Error> {
        self.calls.lock().unwrap().push((
            package_key,
            package_id.to_string(),
            package_version.to_string(),
            classification,
        ));
        if self.fail {
            return Err(Error::internal("state database is down"));
        }
        Ok(())
    }
}

struct Harness {
    recorder: Arc<FakeRecorder>,
    verifier: Arc<FakeVerifier>,
    extractor: Arc<FakeExtractor>,
    certificates: Arc<FakeTrustStore>,
    validator: SignatureValidator,
    events: EventReceiver,
}

impl Harness {
    fn new(trusted: &[&str], behaviour: VerifierBehaviour) -> Self {
        Self::build(trusted, behaviour, FakeExtractor::default(), FakeRecorder::default())
    }

    fn build(
        trusted: &[&str],
        behaviour: VerifierBehaviour,
        extractor: FakeExtractor,
        recorder: FakeRecorder,
    ) -> Self {
        let recorder = Arc::new(recorder);
        let verifier = Arc::new(FakeVerifier {
            behaviour,
            calls: AtomicUsize::new(0),
        });
        let extractor = Arc::new(extractor);
        let certificates = Arc::new(FakeTrustStore {
            certificates: trusted.iter().map(|t| TrustedCertificate::new(*t)).collect(),
            calls: AtomicUsize::new(0),
        });
        let (tx, events) = channel();
        let validator = SignatureValidator::new(
            recorder.clone(),
            verifier.clone(),
            extractor.clone(),
            certificates.clone(),
        )
        .with_event_sender(tx);

        Self {
            recorder,
            verifier,
            extractor,
            certificates,
            validator,
            events,
        }
    }

    fn verifier_calls(&self) -> usize {
        self.verifier.calls.load(Ordering::SeqCst)
    }

    fn extractor_calls(&self) -> usize {
        self.extractor.calls.load(Ordering::SeqCst)
    }

    fn validation_events(&mut self) -> Vec<ValidationEvent> {
        let mut events = Vec::new();
        while let Ok(message) = self.events.try_recv() {
            if let AppEvent::Validation(event) = message.event {
                events.push(event);
            }
        }
        events
    }

    fn verify_failure_messages(&mut self) -> Vec<String> {
        self.validation_events()
            .into_iter()
            .filter_map(|event| match event {
                ValidationEvent::VerifyFailed { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }
}

/// JSON log lines written by a scoped `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        let writer = self.clone();
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish()
    }

    fn records(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

fn request(id: &str, version: &str) -> ValidationRequest {
    ValidationRequest::new(
        id,
        version,
        Url::parse(&format!("https://packages.example.org/{id}/{version}")).unwrap(),
        Uuid::new_v4(),
    )
}

fn valid() -> VerifierBehaviour {
    VerifierBehaviour::Return(VerificationResult::with_results(
        true,
        vec![SignatureCheck::new(Vec::new())],
    ))
}

fn invalid_with(issues: Vec<Issue>) -> VerifierBehaviour {
    VerifierBehaviour::Return(VerificationResult::with_results(
        false,
        vec![SignatureCheck::new(issues)],
    ))
}

#[tokio::test]
async fn unsigned_package_succeeds_without_verification() {
    let mut harness = Harness::new(&["AAA"], valid());
    let package = FakePackage::unsigned();
    let request = request("Bar", "2.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.status, ValidationStatus::Succeeded);
    assert_eq!(
        harness.recorder.recorded(),
        vec![(
            PACKAGE_KEY,
            "Bar".to_string(),
            "2.0.0".to_string(),
            SigningClassification::Unsigned
        )]
    );
    assert_eq!(harness.verifier_calls(), 0);
    assert_eq!(harness.extractor_calls(), 0);
    assert!(harness.verify_failure_messages().is_empty());
}

#[tokio::test]
async fn trusted_valid_signature_is_extracted_and_recorded() {
    let mut harness = Harness::new(&["BBB", "AAA"], valid());
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.status, ValidationStatus::Succeeded);
    assert_eq!(harness.verifier_calls(), 1);
    assert_eq!(harness.extractor_calls(), 1);
    assert_eq!(*harness.extractor.package_keys.lock().unwrap(), vec![PACKAGE_KEY]);
    let recorded = harness.recorder.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].3, SigningClassification::Valid);

    let events = harness.validation_events();
    assert!(matches!(events.first(), Some(ValidationEvent::Started { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, ValidationEvent::Extracted { .. })));
    assert!(matches!(
        events.last(),
        Some(ValidationEvent::Recorded {
            classification: SigningClassification::Valid,
            status: ValidationStatus::Succeeded,
            ..
        })
    ));
}

#[tokio::test]
async fn verify_failure_emits_exact_diagnostic() {
    let mut harness = Harness::new(
        &["AAA"],
        invalid_with(vec![
            Issue::error("E1", "bad hash"),
            Issue::warning("W1", "weak algo"),
        ]),
    );
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.status, ValidationStatus::Failed);
    assert_eq!(harness.extractor_calls(), 0);
    assert_eq!(
        harness.recorder.recorded()[0].3,
        SigningClassification::Invalid
    );
    assert_eq!(
        harness.verify_failure_messages(),
        vec![format!(
            "Signed package Foo 1.0.0 is blocked for validation {} due to verify failures. \
             Errors: E1: bad hash. Warnings: W1: weak algo.",
            request.validation_id
        )]
    );
}

#[tokio::test]
async fn verify_failure_writes_one_error_log_record() {
    let logs = CapturedLogs::default();
    let _guard = tracing::subscriber::set_default(logs.subscriber());

    let harness = Harness::new(
        &["AAA"],
        invalid_with(vec![
            Issue::error("E1", "bad hash"),
            Issue::warning("W1", "weak algo"),
        ]),
    );
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap();

    let records = logs.records();
    let visible: Vec<&serde_json::Value> = records
        .iter()
        .filter(|record| matches!(record["level"].as_str(), Some("INFO" | "WARN" | "ERROR")))
        .collect();
    assert_eq!(visible.len(), 1, "{records:#?}");
    assert_eq!(visible[0]["level"], "ERROR");
    assert_eq!(visible[0]["target"], "pkgsig_validation::validator");
    assert_eq!(
        visible[0]["fields"]["message"],
        format!(
            "Signed package Foo 1.0.0 is blocked for validation {} due to verify failures. \
             Errors: E1: bad hash. Warnings: W1: weak algo.",
            request.validation_id
        )
    );
}

#[tokio::test]
async fn verify_failure_event_is_error_level_and_correlated() {
    let mut harness = Harness::new(&["AAA"], invalid_with(vec![Issue::error("E1", "bad hash")]));
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap();

    let mut failures = Vec::new();
    while let Ok(message) = harness.events.try_recv() {
        if matches!(
            message.event,
            AppEvent::Validation(ValidationEvent::VerifyFailed { .. })
        ) {
            failures.push(message);
        }
    }
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].meta.level, EventLevel::Error);
    assert_eq!(
        failures[0].meta.correlation_id.as_deref(),
        Some(request.validation_id.to_string().as_str())
    );
}

#[tokio::test]
async fn verifier_issue_codes_are_grouped_across_signatures() {
    let mut harness = Harness::new(
        &["AAA"],
        VerifierBehaviour::Return(VerificationResult::with_results(
            false,
            vec![
                SignatureCheck::new(vec![Issue::warning(
                    "PS3016",
                    "The signature was created with a legacy algorithm.",
                )]),
                SignatureCheck::new(vec![Issue::error(
                    "PS3008",
                    "The package integrity check failed.",
                )]),
            ],
        )),
    );
    let package = FakePackage::signed_by(&["AAA"]);
    let request = ValidationRequest::new(
        "NuGet.Versioning",
        "4.3.0",
        Url::parse("https://packages.example.org/nuget.versioning.4.3.0.nupkg").unwrap(),
        Uuid::parse_str("b777135f-1aac-4ec2-a3eb-1f64fe1880d5").unwrap(),
    );
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        harness.verify_failure_messages(),
        vec![
            "Signed package NuGet.Versioning 4.3.0 is blocked for validation \
             b777135f-1aac-4ec2-a3eb-1f64fe1880d5 due to verify failures. \
             Errors: PS3008: The package integrity check failed.. \
             Warnings: PS3016: The signature was created with a legacy algorithm.."
                .to_string()
        ]
    );
}

#[tokio::test]
async fn invalid_result_without_issues_keeps_empty_labels() {
    let mut harness = Harness::new(
        &["AAA"],
        VerifierBehaviour::Return(VerificationResult::new(false)),
    );
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap();

    let messages = harness.verify_failure_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].ends_with("due to verify failures. Errors: . Warnings: ."));
}

#[tokio::test]
async fn valid_result_with_warnings_is_not_reported_as_failure() {
    let mut harness = Harness::new(
        &["AAA"],
        VerifierBehaviour::Return(VerificationResult::with_results(
            true,
            vec![SignatureCheck::new(vec![Issue::warning("W1", "weak algo")])],
        )),
    );
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.status, ValidationStatus::Succeeded);
    assert_eq!(harness.extractor_calls(), 1);
    assert!(harness.verify_failure_messages().is_empty());
}

#[tokio::test]
async fn signature_count_other_than_one_is_rejected() {
    for thumbprints in [&[][..], &["AAA", "AAA"][..], &["AAA", "BBB", "CCC"][..]] {
        let mut harness = Harness::new(&["AAA", "BBB", "CCC"], valid());
        let package = FakePackage::signed_by(thumbprints);
        let request = request("Foo", "1.0.0");
        let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

        harness
            .validator
            .validate(&package, &mut outcome, &request, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.status, ValidationStatus::Failed);
        assert_eq!(harness.verifier_calls(), 0);
        assert_eq!(harness.extractor_calls(), 0);
        assert_eq!(harness.certificates.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            harness.recorder.recorded()[0].3,
            SigningClassification::Invalid
        );
        assert!(harness.validation_events().iter().any(|e| matches!(
            e,
            ValidationEvent::Rejected { reason: pkgsig_events::RejectionReason::SignatureCount { count }, .. }
                if *count == thumbprints.len()
        )));
    }
}

#[tokio::test]
async fn untrusted_signer_is_rejected_without_verification() {
    let mut harness = Harness::new(&["AAA"], valid());
    let package = FakePackage::signed_by(&["aaa"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.status, ValidationStatus::Failed);
    assert_eq!(harness.verifier_calls(), 0);
    assert_eq!(harness.extractor_calls(), 0);
    assert_eq!(
        harness.recorder.recorded()[0].3,
        SigningClassification::Invalid
    );
    assert!(harness.verify_failure_messages().is_empty());
}

#[tokio::test]
async fn already_cancelled_token_records_nothing() {
    let mut harness = Harness::new(&["AAA"], valid());
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = harness
        .validator
        .validate(&package, &mut outcome, &request, &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(outcome.status, ValidationStatus::NotStarted);
    assert!(harness.recorder.recorded().is_empty());
    assert_eq!(harness.verifier_calls(), 0);
    assert!(harness
        .validation_events()
        .iter()
        .any(|e| matches!(e, ValidationEvent::Cancelled { .. })));
}

#[tokio::test]
async fn cancellation_during_verification_stops_before_side_effects() {
    let cancel = CancellationToken::new();
    let harness = Harness::new(&["AAA"], VerifierBehaviour::CancelDuring(cancel.clone()));
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    let err = harness
        .validator
        .validate(&package, &mut outcome, &request, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(harness.verifier_calls(), 1);
    assert_eq!(harness.extractor_calls(), 0);
    assert!(harness.recorder.recorded().is_empty());
    assert_eq!(outcome.status, ValidationStatus::NotStarted);
}

#[tokio::test]
async fn completed_outcome_is_refused() {
    let harness = Harness::new(&["AAA"], valid());
    let package = FakePackage::unsigned();
    let request = request("Bar", "2.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);
    outcome.status = ValidationStatus::Failed;

    let err = harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::AlreadyCompleted { ref status, .. }) if status == "failed"
    ));
    assert!(harness.recorder.recorded().is_empty());
    assert_eq!(outcome.status, ValidationStatus::Failed);
}

#[tokio::test]
async fn reader_failure_propagates() {
    let harness = Harness::new(&["AAA"], valid());
    let package = FakePackage {
        fail_reads: true,
        ..FakePackage::unsigned()
    };
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    let err = harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Internal(ref m) if m == "package content is corrupt"));
    assert!(harness.recorder.recorded().is_empty());
    assert_eq!(outcome.status, ValidationStatus::NotStarted);
}

#[tokio::test]
async fn verifier_failure_propagates_without_record() {
    let harness = Harness::new(&["AAA"], VerifierBehaviour::Fail);
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    let err = harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Internal(ref m) if m == "verifier unavailable"));
    assert!(harness.recorder.recorded().is_empty());
    assert_eq!(harness.extractor_calls(), 0);
}

#[tokio::test]
async fn extractor_failure_propagates_without_record() {
    let harness = Harness::build(
        &["AAA"],
        valid(),
        FakeExtractor {
            fail: true,
            ..FakeExtractor::default()
        },
        FakeRecorder::default(),
    );
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    let err = harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Internal(ref m) if m == "extraction failed"));
    assert_eq!(harness.extractor_calls(), 1);
    assert!(harness.recorder.recorded().is_empty());
    assert_eq!(outcome.status, ValidationStatus::NotStarted);
}

#[tokio::test]
async fn cancellation_during_extraction_lets_it_finish_and_records_nothing() {
    let cancel = CancellationToken::new();
    let harness = Harness::build(
        &["AAA"],
        valid(),
        FakeExtractor {
            cancel_midway: Some(cancel.clone()),
            ..FakeExtractor::default()
        },
        FakeRecorder::default(),
    );
    let package = FakePackage::signed_by(&["AAA"]);
    let request = request("Foo", "1.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    let err = harness
        .validator
        .validate(&package, &mut outcome, &request, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(harness.extractor_calls(), 1);
    assert_eq!(harness.extractor.finished.load(Ordering::SeqCst), 1);
    assert!(harness.recorder.recorded().is_empty());
    assert_eq!(outcome.status, ValidationStatus::NotStarted);
}

#[tokio::test]
async fn recorder_failure_leaves_outcome_untouched() {
    let harness = Harness::build(
        &["AAA"],
        valid(),
        FakeExtractor::default(),
        FakeRecorder {
            fail: true,
            ..FakeRecorder::default()
        },
    );
    let package = FakePackage::unsigned();
    let request = request("Bar", "2.0.0");
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    let err = harness
        .validator
        .validate(&package, &mut outcome, &request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Internal(ref m) if m == "state database is down"));
    assert_eq!(harness.recorder.recorded().len(), 1);
    assert_eq!(outcome.status, ValidationStatus::NotStarted);
}

#[tokio::test]
async fn recorder_is_called_exactly_once_in_every_branch() {
    let cases: Vec<(FakePackage, VerifierBehaviour)> = vec![
        (FakePackage::unsigned(), valid()),
        (FakePackage::signed_by(&[]), valid()),
        (FakePackage::signed_by(&["AAA", "BBB"]), valid()),
        (FakePackage::signed_by(&["ZZZ"]), valid()),
        (
            FakePackage::signed_by(&["AAA"]),
            invalid_with(vec![Issue::error("E1", "bad hash")]),
        ),
        (FakePackage::signed_by(&["AAA"]), valid()),
    ];

    for (package, behaviour) in cases {
        let harness = Harness::new(&["AAA", "BBB"], behaviour);
        let request = request("Foo", "1.0.0");
        let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

        harness
            .validator
            .validate(&package, &mut outcome, &request, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(harness.recorder.recorded().len(), 1);
        assert!(outcome.is_terminal());
    }
}

#[tokio::test]
async fn validator_without_event_sender_still_records() {
    let recorder = Arc::new(FakeRecorder::default());
    let validator = SignatureValidator::new(
        recorder.clone(),
        Arc::new(FakeVerifier {
            behaviour: valid(),
            calls: AtomicUsize::new(0),
        }),
        Arc::new(FakeExtractor::default()),
        Arc::new(FakeTrustStore::default()),
    );
    let mut outcome = ValidationOutcome::new(PACKAGE_KEY);

    validator
        .validate(
            &FakePackage::unsigned(),
            &mut outcome,
            &request("Bar", "2.0.0"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(recorder.recorded().len(), 1);
    assert_eq!(outcome.status, ValidationStatus::Succeeded);
}
