//! HTTP API for course enrollment.
//!
//! Exposes course listing, enrollment, prerequisite lookup, admin course
//! management, student bookkeeping, and audit chain inspection over JSON.
//! All handlers share one [`enroll_core::EnrollmentCoordinator`].

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{AdminConfig, ServerConfig, ServiceConfig};
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::EnrollServer;
pub use state::AppState;
