use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// A student as known to the local cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub completed_courses: BTreeSet<String>,
    /// Ledger account, learned at registration or on the first successful
    /// enrollment.
    pub address: Option<Address>,
}

impl Student {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            completed_courses: BTreeSet::new(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: Option<Address>) -> Self {
        self.address = address;
        self
    }

    pub fn has_completed(&self, course_code: &str) -> bool {
        self.completed_courses.contains(course_code)
    }
}

/// A course entry in the local cache.
///
/// The cache is a projection of what the ledger accepted at creation time.
/// It answers prerequisite structure only; current availability always
/// comes from a [`LedgerCourseView`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub code: String,
    pub prerequisites: Vec<String>,
    pub available_slots: u32,
}

impl Course {
    pub fn new(code: impl Into<String>, prerequisites: Vec<String>, available_slots: u32) -> Self {
        Self {
            code: code.into(),
            prerequisites,
            available_slots,
        }
    }
}

/// Live course state as reported by the remote contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCourseView {
    pub name: String,
    pub available_seats: u32,
    pub prerequisites: Vec<String>,
    pub is_active: bool,
}

/// Upward-facing course listing entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub name: String,
    pub available_seats: u32,
    pub prerequisites: Vec<String>,
    pub is_active: bool,
}

impl From<LedgerCourseView> for CourseSummary {
    fn from(view: LedgerCourseView) -> Self {
        Self {
            name: view.name,
            available_seats: view.available_seats,
            prerequisites: view.prerequisites,
            is_active: view.is_active,
        }
    }
}

/// Payload of every non-genesis audit block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub student_id: String,
    pub course_code: String,
    pub transaction_hash: String,
}

impl EnrollmentRecord {
    /// JSON payload sealed into the audit chain.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "student_id": self.student_id,
            "course_code": self.course_code,
            "transaction_hash": self.transaction_hash,
        })
    }
}
