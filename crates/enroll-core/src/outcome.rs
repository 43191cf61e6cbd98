use std::fmt;
use std::time::Duration;

use serde::Serialize;

use enroll_ledger::LedgerError;
use enroll_types::TxHash;

/// Broad class of a workflow result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    /// Rejected locally, before any ledger cost was incurred.
    Validation,
    /// The ledger did not confirm the effect. A fee may have been spent.
    Ledger,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Validation => write!(f, "validation"),
            Self::Ledger => write!(f, "ledger"),
        }
    }
}

/// Result of a coordinator workflow.
///
/// Only [`Outcome::Enrolled`] and [`Outcome::CourseAdded`] are accompanied
/// by local state changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Enrolled { course_code: String, tx_hash: TxHash },
    PrerequisitesNotMet { missing: Vec<String> },
    CourseUnavailable { course_code: String },
    EnrollmentFailed { reason: String },
    CourseAdded { name: String, tx_hash: TxHash },
    CourseAlreadyExists { name: String },
    CourseAdditionFailed { reason: String },
    LedgerTimeout { after: Duration },
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Enrolled { .. } | Self::CourseAdded { .. } => OutcomeKind::Success,
            Self::PrerequisitesNotMet { .. }
            | Self::CourseUnavailable { .. }
            | Self::CourseAlreadyExists { .. } => OutcomeKind::Validation,
            Self::EnrollmentFailed { .. }
            | Self::CourseAdditionFailed { .. }
            | Self::LedgerTimeout { .. } => OutcomeKind::Ledger,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind() == OutcomeKind::Success
    }

    /// Stable machine-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enrolled { .. } => "enrolled",
            Self::PrerequisitesNotMet { .. } => "prerequisites_not_met",
            Self::CourseUnavailable { .. } => "course_unavailable",
            Self::EnrollmentFailed { .. } => "enrollment_failed",
            Self::CourseAdded { .. } => "course_added",
            Self::CourseAlreadyExists { .. } => "course_already_exists",
            Self::CourseAdditionFailed { .. } => "course_addition_failed",
            Self::LedgerTimeout { .. } => "ledger_timeout",
        }
    }

    /// Transaction hash of a confirmed effect.
    pub fn tx_hash(&self) -> Option<&TxHash> {
        match self {
            Self::Enrolled { tx_hash, .. } | Self::CourseAdded { tx_hash, .. } => Some(tx_hash),
            _ => None,
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        match self {
            Self::Enrolled { course_code, .. } => format!("Successfully enrolled in {course_code}"),
            Self::PrerequisitesNotMet { missing } if missing.is_empty() => {
                "Prerequisites not met".into()
            }
            Self::PrerequisitesNotMet { missing } => {
                format!("Prerequisites not met: {}", missing.join(", "))
            }
            Self::CourseUnavailable { .. } => "Course not available".into(),
            Self::EnrollmentFailed { reason } => format!("Enrollment failed: {reason}"),
            Self::CourseAdded { .. } => "Course added successfully".into(),
            Self::CourseAlreadyExists { .. } => "Course already exists".into(),
            Self::CourseAdditionFailed { reason } => format!("Failed to add course: {reason}"),
            Self::LedgerTimeout { after } => {
                format!("Ledger did not respond within {}s", after.as_secs_f64())
            }
        }
    }

    pub(crate) fn enrollment_error(error: LedgerError) -> Self {
        match error {
            LedgerError::Timeout(after) => Self::LedgerTimeout { after },
            other => Self::EnrollmentFailed {
                reason: other.to_string(),
            },
        }
    }

    pub(crate) fn course_addition_error(error: LedgerError) -> Self {
        match error {
            LedgerError::Timeout(after) => Self::LedgerTimeout { after },
            other => Self::CourseAdditionFailed {
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
