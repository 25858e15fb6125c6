#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for pkgsig
//!
//! This crate provides the data model shared by the validation core and its
//! collaborators: validation requests and outcomes, signing classifications,
//! trusted certificates, signature records and verification results.

pub mod signing;
pub mod validation;

// Re-export commonly used types
pub use signing::{
    Issue, SignatureCheck, SignatureRecord, SigningClassification, Thumbprint,
    TrustedCertificate, VerificationResult,
};
pub use url::Url;
pub use uuid::Uuid;
pub use validation::{PackageKey, ValidationOutcome, ValidationRequest, ValidationStatus};

