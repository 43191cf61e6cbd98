use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all enrollment endpoints.
pub fn build_router(state: AppState, allow_cors: bool) -> Router {
    let router = Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/api/courses", get(handler::list_courses))
        .route("/api/enroll", post(handler::enroll))
        .route("/api/prerequisites/:code", get(handler::prerequisites))
        .route("/api/students", post(handler::register_student))
        .route("/api/students/:id/complete", post(handler::complete_course))
        .route("/api/chain", get(handler::chain))
        .route("/api/chain/verify", get(handler::verify_chain))
        .route("/api/admin/courses", get(handler::list_courses))
        .route("/api/admin/add_course", post(handler::add_course))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if allow_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
