//! Packages on disk with detached minisign signatures

use crate::keys::key_id;
use async_trait::async_trait;
use minisign_verify::Signature;
use pkgsig_errors::{Error, SigningError};
use pkgsig_types::SignatureRecord;
use pkgsig_validation::cancel::ensure_active;
use pkgsig_validation::SignedPackageReader;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_util::sync::CancellationToken;

const TRUSTED_COMMENT_PREFIX: &str = "trusted comment: ";

/// A package file plus the signature files found next to it.
///
/// Signature files are named `<file name>.<ext>` or `<file name>.<n>.<ext>`
/// and are kept in file-name order.
#[derive(Debug, Clone)]
pub struct FilePackage {
    path: PathBuf,
    signature_paths: Vec<PathBuf>,
}

impl FilePackage {
    /// Locate `path` and its detached signatures.
    ///
    /// # Errors
    ///
    /// Returns an error if the package or its directory cannot be read.
    pub async fn open(path: impl Into<PathBuf>, extension: &str) -> Result<Self, Error> {
        let path = path.into();
        fs::metadata(&path).await.map_err(|e| SigningError::ContentUnreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| SigningError::ContentUnreadable {
                path: path.display().to_string(),
                message: "package path has no file name".to_string(),
            })?
            .to_string();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| Error::io_with_path(&e, dir.clone()))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io_with_path(&e, dir.clone()))?
        {
            if let Some(name) = entry.file_name().to_str() {
                if is_signature_name(&file_name, name, extension) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        tracing::debug!(
            package = %path.display(),
            signatures = names.len(),
            "discovered signature files"
        );

        Ok(Self {
            signature_paths: names.into_iter().map(|name| dir.join(name)).collect(),
            path,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn signature_paths(&self) -> &[PathBuf] {
        &self.signature_paths
    }
}

fn is_signature_name(file_name: &str, candidate: &str, extension: &str) -> bool {
    let Some(rest) = candidate
        .strip_prefix(file_name)
        .and_then(|rest| rest.strip_prefix('.'))
    else {
        return false;
    };
    if rest == extension {
        return true;
    }
    rest.strip_suffix(extension)
        .and_then(|index| index.strip_suffix('.'))
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

/// Parse a minisign signature file into a [`SignatureRecord`].
///
/// The full text is kept as the encoded form so it can be verified later.
///
/// # Errors
///
/// Returns an error if the text is not a well-formed minisign signature.
pub fn parse_signature(text: &str) -> Result<SignatureRecord, Error> {
    Signature::decode(text)?;

    let mut lines = text.lines();
    let _untrusted = lines.next();
    let signature_line = lines.next().ok_or_else(|| {
        SigningError::InvalidSignatureFormat("missing signature line".to_string())
    })?;
    let thumbprint = key_id(signature_line)?;

    let mut record = SignatureRecord::new(thumbprint, text);
    if let Some(comment) = lines
        .next()
        .and_then(|line| line.strip_prefix(TRUSTED_COMMENT_PREFIX))
    {
        record = record.with_trusted_comment(comment);
    }
    Ok(record)
}

#[async_trait]
impl SignedPackageReader for FilePackage {
    async fn is_signed(&self, _cancel: &CancellationToken) -> Result<bool, Error> {
        Ok(!self.signature_paths.is_empty())
    }

    async fn get_signatures(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<SignatureRecord>, Error> {
        let mut records = Vec::with_capacity(self.signature_paths.len());
        for path in &self.signature_paths {
            ensure_active(cancel)?;
            let text = fs::read_to_string(path)
                .await
                .map_err(|e| SigningError::SignatureUnreadable {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            records.push(parse_signature(&text)?);
        }
        Ok(records)
    }

    async fn read_content(&self, cancel: &CancellationToken) -> Result<Vec<u8>, Error> {
        ensure_active(cancel)?;
        fs::read(&self.path).await.map_err(|e| {
            SigningError::ContentUnreadable {
                path: self.path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}
