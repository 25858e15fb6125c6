//! Output rendering and formatting

use crate::commands::{CommandResult, ValidationReport};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use console::{style, Term};
use pkgsig_state::{CertificateRow, SigningStateRow};
use pkgsig_types::{SigningClassification, ValidationStatus};
use std::io;

/// Output renderer for command results
#[derive(Clone)]
pub struct OutputRenderer {
    json_output: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render a command result to stdout
    pub fn render_result(&self, result: &CommandResult) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            CommandResult::Validation(report) => self.render_validation(report),
            CommandResult::CertificateTrusted(certificate) => {
                self.render_success_message(&format!(
                    "Trusted certificate {}",
                    certificate.thumbprint
                ));
            }
            CommandResult::Certificates(rows) => self.render_certificates(rows),
            CommandResult::CertificateRemoved { thumbprint } => {
                self.render_success_message(&format!("Removed certificate {thumbprint}"));
            }
            CommandResult::SigningState(row) => self.render_signing_state(row),
        }
        Ok(())
    }

    fn render_validation(&self, report: &ValidationReport) {
        let status = match report.status {
            ValidationStatus::Succeeded => style(report.status.as_str()).green(),
            ValidationStatus::Failed => style(report.status.as_str()).red(),
            ValidationStatus::NotStarted => style(report.status.as_str()).yellow(),
        };
        println!(
            "{} {}: {} ({})",
            report.package_id,
            report.package_version,
            self.paint(status),
            self.classification(report.classification)
        );
        println!("  validation id: {}", report.validation_id);
        println!("  package key:   {}", report.package_key);
        println!("  signatures:    {}", report.signatures);
    }

    fn render_certificates(&self, rows: &[CertificateRow]) {
        if rows.is_empty() {
            println!("No trusted certificates.");
            return;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Thumbprint", "Subject", "Added"]);

        for row in rows {
            table.add_row(vec![
                Cell::new(&row.thumbprint),
                Cell::new(row.subject.as_deref().unwrap_or("-")),
                Cell::new(
                    row.added()
                        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_default(),
                ),
            ]);
        }
        println!("{table}");
    }

    fn render_signing_state(&self, row: &SigningStateRow) {
        let classification = SigningClassification::parse(&row.status)
            .map_or_else(|| row.status.clone(), |c| self.classification(c));
        println!(
            "{} {} (package key {}): {}",
            row.package_id, row.package_version, row.package_key, classification
        );
        if let Some(updated) = row.updated() {
            println!("  updated: {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }

    fn render_success_message(&self, message: &str) {
        println!("{}", self.paint(style(message).green()));
    }

    fn classification(&self, classification: SigningClassification) -> String {
        let styled = match classification {
            SigningClassification::Valid => style(classification.as_str()).green(),
            SigningClassification::Invalid => style(classification.as_str()).red(),
            SigningClassification::Unsigned => style(classification.as_str()).dim(),
        };
        self.paint(styled)
    }

    fn paint<D: std::fmt::Display>(&self, styled: console::StyledObject<D>) -> String {
        if self.supports_color() {
            styled.to_string()
        } else {
            styled.force_styling(false).to_string()
        }
    }

    fn supports_color(&self) -> bool {
        Term::stdout().features().colors_supported()
    }
}
