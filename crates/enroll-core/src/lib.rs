//! Enrollment coordination.
//!
//! [`EnrollmentCoordinator`] keeps the local student and course cache, gates
//! enrollments on prerequisites, drives the ledger through a
//! [`enroll_ledger::LedgerClient`], and seals every confirmed enrollment into
//! the audit chain. Workflow results are [`Outcome`] values.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod outcome;
pub mod prerequisites;

pub use config::CoordinatorConfig;
pub use coordinator::EnrollmentCoordinator;
pub use error::{CoreError, CoreResult};
pub use outcome::{Outcome, OutcomeKind};
pub use prerequisites::PrerequisiteEngine;
