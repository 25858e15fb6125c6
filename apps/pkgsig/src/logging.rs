//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so log
//! pipelines see the same information the CLI shows.

use pkgsig_config::LoggingConfig;
use pkgsig_events::{AppEvent, EventMessage, StateEvent, ValidationEvent};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over the configured filter; `--debug` raises pkgsig crates
/// to debug. Logs go to stderr so stdout stays clean for results.
pub fn init_tracing(logging: &LoggingConfig, debug_enabled: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_enabled {
            EnvFilter::new(format!("{},pkgsig=debug", logging.filter))
        } else {
            EnvFilter::new(&logging.filter)
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.with_target(debug_enabled).init();
    }
}

/// Log an event using the tracing infrastructure with structured fields
///
/// `VerifyFailed` is logged at debug level: the validator already wrote the
/// diagnostic line at error level and log consumers count those lines.
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    match &message.event {
        AppEvent::Validation(validation) => match validation {
            ValidationEvent::Started {
                package_id,
                package_version,
                validation_id,
                package_key,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    %validation_id,
                    %package_id,
                    %package_version,
                    package_key,
                    "Validation started"
                );
            }
            ValidationEvent::SignaturesRead {
                package_id,
                signed,
                count,
                ..
            } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    %package_id,
                    signed,
                    count,
                    "Signatures read"
                );
            }
            ValidationEvent::Rejected {
                package_id,
                package_version,
                reason,
            } => {
                warn!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    %package_id,
                    %package_version,
                    %reason,
                    "Signed package rejected"
                );
            }
            ValidationEvent::VerifyFailed {
                package_id,
                errors,
                warnings,
                ..
            } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    %package_id,
                    errors = errors.len(),
                    warnings = warnings.len(),
                    "Verification failed"
                );
            }
            ValidationEvent::Accepted {
                package_id,
                package_version,
                classification,
            } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    %package_id,
                    %package_version,
                    %classification,
                    "Signature accepted"
                );
            }
            ValidationEvent::Extracted { package_id, .. } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    %package_id,
                    "Signature parts extracted"
                );
            }
            ValidationEvent::Recorded {
                package_key,
                classification,
                status,
                ..
            } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    package_key,
                    %classification,
                    %status,
                    "Validation recorded"
                );
            }
            ValidationEvent::Cancelled { validation_id, .. } => {
                warn!(
                    source = meta.source.as_str(),
                    %validation_id,
                    "Validation cancelled"
                );
            }
        },

        AppEvent::State(state) => match state {
            StateEvent::SigningStateRecorded {
                package_key,
                classification,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    package_key,
                    %classification,
                    "Signing state written"
                );
            }
            StateEvent::SignaturePartsStored {
                package_key,
                signatures,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    package_key,
                    signatures,
                    "Signature parts stored"
                );
            }
            StateEvent::CertificateTrusted { thumbprint } => {
                debug!(source = meta.source.as_str(), %thumbprint, "Certificate trusted");
            }
            StateEvent::CertificateRemoved { thumbprint } => {
                debug!(source = meta.source.as_str(), %thumbprint, "Certificate removed");
            }
        },
    }
}
