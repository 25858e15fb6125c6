#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Minisign-backed signature reading and verification for pkgsig

pub mod keys;
pub mod package;
pub mod verifier;

pub use keys::{key_id, Algorithm, PublicKeyRef, SignatureAlgorithm};
pub use package::{parse_signature, FilePackage};
pub use verifier::{codes, MinisignVerifier};
