//! Command execution

use crate::cli::{Commands, TrustCommands};
use crate::error::CliError;
use pkgsig_config::Config;
use pkgsig_events::EventSender;
use pkgsig_signing::{FilePackage, MinisignVerifier, PublicKeyRef};
use pkgsig_state::{CertificateRow, SigningDatabase, SigningStateRow};
use pkgsig_types::{
    PackageKey, SigningClassification, Thumbprint, TrustedCertificate, Url, Uuid,
    ValidationOutcome, ValidationRequest, ValidationStatus,
};
use pkgsig_validation::SignatureValidator;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Summary of one validation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub package_id: String,
    pub package_version: String,
    pub validation_id: Uuid,
    pub package_key: PackageKey,
    pub status: ValidationStatus,
    pub classification: SigningClassification,
    pub signatures: usize,
}

/// Result of a command, rendered by [`crate::display::OutputRenderer`]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CommandResult {
    Validation(ValidationReport),
    CertificateTrusted(TrustedCertificate),
    Certificates(Vec<CertificateRow>),
    CertificateRemoved { thumbprint: Thumbprint },
    SigningState(SigningStateRow),
}

impl CommandResult {
    /// Process exit code for a successfully executed command
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandResult::Validation(report) if report.status == ValidationStatus::Failed => 2,
            _ => 0,
        }
    }
}

/// Everything a command needs
pub struct CommandContext {
    pub config: Config,
    pub db: SigningDatabase,
    pub tx: EventSender,
    pub cancel: CancellationToken,
}

/// Execute the specified command
pub async fn execute_command(
    command: Commands,
    ctx: CommandContext,
) -> Result<CommandResult, CliError> {
    match command {
        Commands::Validate {
            path,
            id,
            version,
            package_key,
            validation_id,
        } => {
            let report = validate(
                &ctx,
                &path,
                id,
                version,
                package_key,
                validation_id.unwrap_or_else(Uuid::new_v4),
            )
            .await?;
            Ok(CommandResult::Validation(report))
        }

        Commands::Trust(trust_cmd) => match trust_cmd {
            TrustCommands::Add {
                public_key,
                subject,
            } => {
                let key = PublicKeyRef::from_base64(&public_key)?;
                let certificate = ctx
                    .db
                    .trust_store()
                    .add(&key, subject.as_deref())
                    .await?;
                Ok(CommandResult::CertificateTrusted(certificate))
            }
            TrustCommands::List => {
                let rows = ctx.db.trust_store().list().await?;
                Ok(CommandResult::Certificates(rows))
            }
            TrustCommands::Remove { thumbprint } => {
                let thumbprint = Thumbprint::new(thumbprint);
                ctx.db.trust_store().remove(&thumbprint).await?;
                Ok(CommandResult::CertificateRemoved { thumbprint })
            }
        },

        Commands::Status { package_key } => {
            let row = ctx.db.recorder().get(package_key).await?;
            row.classification()?;
            Ok(CommandResult::SigningState(row))
        }
    }
}

async fn validate(
    ctx: &CommandContext,
    path: &Path,
    package_id: String,
    package_version: String,
    package_key: PackageKey,
    validation_id: Uuid,
) -> Result<ValidationReport, CliError> {
    let path = tokio::fs::canonicalize(path)
        .await
        .map_err(|e| pkgsig_errors::Error::io_with_path(&e, path))?;
    let content_url = Url::from_file_path(&path).map_err(|()| {
        CliError::InvalidArguments(format!("{} is not an absolute path", path.display()))
    })?;

    let package = FilePackage::open(&path, &ctx.config.signing.signature_extension).await?;
    let trust = ctx.db.trust_store();
    let verifier = MinisignVerifier::new(trust.public_keys().await?);
    tracing::debug!(keys = verifier.key_count(), "verifier ready");

    let validator = SignatureValidator::new(
        Arc::new(ctx.db.recorder()),
        Arc::new(verifier),
        Arc::new(ctx.db.extractor()),
        Arc::new(trust),
    )
    .with_event_sender(ctx.tx.clone());

    let request = ValidationRequest::new(package_id, package_version, content_url, validation_id);
    let mut outcome = ValidationOutcome::new(package_key);
    validator
        .validate(&package, &mut outcome, &request, &ctx.cancel)
        .await?;

    let recorded = ctx.db.recorder().get(package_key).await?;
    Ok(ValidationReport {
        package_id: request.package_id,
        package_version: request.package_version,
        validation_id: request.validation_id,
        package_key,
        status: outcome.status,
        classification: recorded.classification()?,
        signatures: package.signature_paths().len(),
    })
}
