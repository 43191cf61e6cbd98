use std::sync::Arc;

use enroll_core::EnrollmentCoordinator;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<EnrollmentCoordinator>,
}

impl AppState {
    pub fn new(coordinator: Arc<EnrollmentCoordinator>) -> Self {
        Self { coordinator }
    }
}
