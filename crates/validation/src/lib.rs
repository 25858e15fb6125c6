#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package signature validation core
//!
//! Decides, for one uploaded package, whether its signature is acceptable and
//! records that decision exactly once. Everything that touches the outside
//! world (reading signatures, the trust store, cryptographic verification,
//! metadata extraction, state persistence) is reached through the capability
//! traits in [`capabilities`], so the orchestrator can run against SQLite and
//! minisign in production and against in-memory fakes in tests.

pub mod capabilities;
pub mod cancel;
pub mod diagnostics;
pub mod validator;

pub use capabilities::{
    CertificateStore, PackageSignatureVerifier, SignaturePartsExtractor, SignedPackageReader,
    SigningStateRecorder,
};
pub use diagnostics::{format_verify_failure, IssueReport};
pub use tokio_util::sync::CancellationToken;
pub use validator::{SignatureValidator, Verdict};
