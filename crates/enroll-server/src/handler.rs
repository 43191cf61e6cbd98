use axum::extract::{Path, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use enroll_core::{Outcome, OutcomeKind};
use enroll_types::Address;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Body returned by every workflow endpoint.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OutcomeResponse {
    pub success: bool,
    pub message: String,
    pub kind: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl From<Outcome> for OutcomeResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            success: outcome.is_success(),
            message: outcome.message(),
            kind: outcome.kind(),
            transaction_hash: outcome.tx_hash().map(|h| h.to_string()),
        }
    }
}

pub async fn list_courses(State(state): State<AppState>) -> Json<Value> {
    let courses = state.coordinator.get_all_courses().await;
    Json(json!({ "success": true, "courses": courses }))
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub student_id: String,
    pub course_code: String,
    pub student_address: String,
    pub private_key: String,
}

pub async fn enroll(
    State(state): State<AppState>,
    Json(req): Json<EnrollRequest>,
) -> ServerResult<Json<OutcomeResponse>> {
    let address: Address = req
        .student_address
        .parse()
        .map_err(|e| ServerError::BadRequest(format!("invalid student_address: {e}")))?;

    let outcome = state
        .coordinator
        .enroll(&req.student_id, &req.course_code, address, &req.private_key)
        .await;
    Ok(Json(outcome.into()))
}

pub async fn prerequisites(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ServerResult<Json<Value>> {
    match state.coordinator.get_prerequisites(&code).await {
        Some(prerequisites) => Ok(Json(json!({
            "success": true,
            "prerequisites": prerequisites,
        }))),
        None => Err(ServerError::NotFound("Course not found".into())),
    }
}

#[derive(Debug, Deserialize)]
pub struct AddCourseRequest {
    pub name: String,
    pub available_seats: u32,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

pub async fn add_course(
    State(state): State<AppState>,
    Json(req): Json<AddCourseRequest>,
) -> ServerResult<Json<OutcomeResponse>> {
    if req.name.trim().is_empty() {
        return Err(ServerError::BadRequest("course name must not be empty".into()));
    }
    let outcome = state
        .coordinator
        .add_course(&req.name, req.available_seats, req.prerequisites)
        .await;
    Ok(Json(outcome.into()))
}

#[derive(Debug, Deserialize)]
pub struct RegisterStudentRequest {
    pub student_id: String,
    #[serde(default)]
    pub address: Option<Address>,
}

pub async fn register_student(
    State(state): State<AppState>,
    Json(req): Json<RegisterStudentRequest>,
) -> Json<Value> {
    let created = state
        .coordinator
        .register_student(&req.student_id, req.address)
        .await;
    let message = if created {
        "Student registered"
    } else {
        "Student already exists"
    };
    Json(json!({ "success": created, "message": message }))
}

#[derive(Debug, Deserialize)]
pub struct CompleteCourseRequest {
    pub course_code: String,
}

pub async fn complete_course(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(req): Json<CompleteCourseRequest>,
) -> ServerResult<Json<Value>> {
    if !state
        .coordinator
        .complete_course(&student_id, &req.course_code)
        .await
    {
        return Err(ServerError::NotFound("Student not found".into()));
    }
    Ok(Json(json!({
        "success": true,
        "message": format!("{} completed {}", student_id, req.course_code),
    })))
}

pub async fn chain(State(state): State<AppState>) -> Json<Value> {
    let blocks = state.coordinator.chain_blocks().await;
    Json(json!({
        "success": true,
        "length": blocks.len(),
        "blocks": blocks,
    }))
}

pub async fn verify_chain(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    state.coordinator.verify_chain().await?;
    Ok(Json(json!({ "success": true, "valid": true })))
}
