//! Minisign key references and thumbprint derivation

use base64::{engine::general_purpose, Engine as _};
use pkgsig_errors::{Error, SigningError};
use pkgsig_types::Thumbprint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Minisign,
}

/// A trusted public key as stored in the trust store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKeyRef {
    /// Thumbprint of the key (hex key id)
    pub id: Thumbprint,
    pub algo: Algorithm,
    /// Base64 public key line
    pub data: String,
}

impl PublicKeyRef {
    /// Build a reference from a base64 minisign public key, deriving its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not valid base64 or too short to carry a key id.
    pub fn from_base64(data: &str) -> Result<Self, Error> {
        let data = data.trim();
        let id = key_id(data).map_err(|e| SigningError::InvalidPublicKey(e.to_string()))?;
        Ok(Self {
            id,
            algo: Algorithm::Minisign,
            data: data.to_string(),
        })
    }
}

/// Raw signature algorithm tag found in the first two decoded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// `Ed`: signs the content directly
    Legacy,
    /// `ED`: signs a BLAKE2b hash of the content
    Prehashed,
}

fn decode_line(line: &str) -> Result<Vec<u8>, String> {
    let decoded = general_purpose::STANDARD
        .decode(line.trim())
        .map_err(|e| e.to_string())?;
    if decoded.len() < 10 {
        return Err(format!("expected at least 10 bytes, got {}", decoded.len()));
    }
    Ok(decoded)
}

/// Hex-encoded key id (bytes 2..10) of a base64 minisign key or signature line.
///
/// # Errors
///
/// Returns an error if the line is not base64 or shorter than ten bytes.
pub fn key_id(line: &str) -> Result<Thumbprint, Error> {
    let decoded = decode_line(line).map_err(SigningError::InvalidSignatureFormat)?;
    Ok(Thumbprint::new(hex::encode(&decoded[2..10])))
}

/// Algorithm tag of a base64 signature line.
///
/// # Errors
///
/// Returns an error for undecodable lines or unknown tags.
pub fn signature_algorithm(line: &str) -> Result<SignatureAlgorithm, Error> {
    let decoded = decode_line(line).map_err(SigningError::InvalidSignatureFormat)?;
    match &decoded[..2] {
        b"Ed" => Ok(SignatureAlgorithm::Legacy),
        b"ED" => Ok(SignatureAlgorithm::Prehashed),
        other => Err(SigningError::InvalidSignatureFormat(format!(
            "unknown signature algorithm {}",
            String::from_utf8_lossy(other)
        ))
        .into()),
    }
}
