//! Aggregation of verifier issues into the blocked-package diagnostic

use pkgsig_types::{Issue, Uuid, VerificationResult};

/// Verifier issues split into errors (fatal) and warnings (non-fatal),
/// each group keeping encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueReport {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl IssueReport {
    #[must_use]
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let (errors, warnings) = issues
            .into_iter()
            .cloned()
            .partition(|issue: &Issue| issue.fatal);
        Self { errors, warnings }
    }

    /// Collect all issues across every per-signature sub-result.
    #[must_use]
    pub fn from_result(result: &VerificationResult) -> Self {
        Self::from_issues(result.issues())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the diagnostic logged when a signed package fails verification.
///
/// Downstream log consumers parse this line; the wording and punctuation are
/// fixed. An empty group still keeps its label.
#[must_use]
pub fn format_verify_failure(
    package_id: &str,
    package_version: &str,
    validation_id: &Uuid,
    report: &IssueReport,
) -> String {
    format!(
        "Signed package {package_id} {package_version} is blocked for validation {validation_id} \
         due to verify failures. Errors: {}. Warnings: {}.",
        join_issues(&report.errors),
        join_issues(&report.warnings),
    )
}
