//! Signing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SigningError {
    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    #[error("invalid public key format: {0}")]
    InvalidPublicKey(String),

    #[error("failed to read package content {path}: {message}")]
    ContentUnreadable { path: String, message: String },

    #[error("failed to read signature file {path}: {message}")]
    SignatureUnreadable { path: String, message: String },
}

impl UserFacingError for SigningError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidSignatureFormat(_) => {
                Some("Re-create the detached signature with minisign and upload it again.")
            }
            Self::InvalidPublicKey(_) => {
                Some("Provide the base64 public key line from the minisign .pub file.")
            }
            Self::ContentUnreadable { .. } | Self::SignatureUnreadable { .. } => {
                Some("Check that the package and its signature files exist and are readable.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InvalidSignatureFormat(_) => "signing.invalid_signature",
            Self::InvalidPublicKey(_) => "signing.invalid_public_key",
            Self::ContentUnreadable { .. } => "signing.content_unreadable",
            Self::SignatureUnreadable { .. } => "signing.signature_unreadable",
        })
    }
}
