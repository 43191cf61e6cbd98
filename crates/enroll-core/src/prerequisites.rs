use enroll_types::{Course, Student};

/// Local prerequisite check over cached state.
///
/// Advisory only: it spares the ledger obviously doomed transactions. The
/// remote contract stays the authority, and a stale cache may disagree with
/// it without that being an inconsistency.
pub struct PrerequisiteEngine;

impl PrerequisiteEngine {
    /// `true` iff both are known and every prerequisite of `course` is in the
    /// student's completed set. An empty prerequisite list is always met.
    pub fn met(student: Option<&Student>, course: Option<&Course>) -> bool {
        match (student, course) {
            (Some(student), Some(course)) => course
                .prerequisites
                .iter()
                .all(|code| student.has_completed(code)),
            _ => false,
        }
    }

    /// Prerequisite codes not yet completed, in the course's order.
    ///
    /// An unknown course has nothing to report; an unknown student is
    /// missing every prerequisite.
    pub fn missing(student: Option<&Student>, course: Option<&Course>) -> Vec<String> {
        let Some(course) = course else {
            return Vec::new();
        };
        course
            .prerequisites
            .iter()
            .filter(|code| !student.is_some_and(|s| s.has_completed(code)))
            .cloned()
            .collect()
    }
}
