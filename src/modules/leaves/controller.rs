use axum::{Json, extract::State, http::StatusCode};
use rollcall_core::{AppError, ErrorResponse};
use rollcall_models::{
    ApplyLeaveDto, LeaveApplication, LeaveId, LeaveView, MessageResponse, ReviewLeaveDto,
};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::leaves::service::LeaveService;
use crate::state::AppState;
use crate::validator::{ParsedPath, ValidatedJson};

/// Apply for leave (students only)
#[utoipa::path(
    post,
    path = "/api/leaves/apply",
    request_body = ApplyLeaveDto,
    responses(
        (status = 201, description = "Leave application filed", body = LeaveApplication),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not a student", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state, dto))]
pub async fn apply_leave(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidatedJson(dto): ValidatedJson<ApplyLeaveDto>,
) -> Result<(StatusCode, Json<LeaveApplication>), AppError> {
    let leave = LeaveService::apply(state.store.as_ref(), &caller, dto).await?;
    Ok((StatusCode::CREATED, Json(leave)))
}

/// The caller's own leave applications, newest first
#[utoipa::path(
    get,
    path = "/api/leaves/my",
    responses(
        (status = 200, description = "Caller's leave applications", body = Vec<LeaveApplication>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn my_leaves(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<LeaveApplication>>, AppError> {
    let leaves = LeaveService::list_mine(state.store.as_ref(), &caller).await?;
    Ok(Json(leaves))
}

/// All leave applications (faculty or admin)
#[utoipa::path(
    get,
    path = "/api/leaves/all",
    responses(
        (status = 200, description = "All leave applications", body = Vec<LeaveView>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is a student", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn all_leaves(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<LeaveView>>, AppError> {
    let leaves = LeaveService::list_all(state.store.as_ref(), &caller).await?;
    Ok(Json(leaves))
}

/// Approve or reject a leave application (faculty or admin)
#[utoipa::path(
    put,
    path = "/api/leaves/update/{leaveId}",
    params(("leaveId" = String, Path, description = "Leave application ID")),
    request_body = ReviewLeaveDto,
    responses(
        (status = 200, description = "Leave reviewed", body = LeaveApplication),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is a student", body = ErrorResponse),
        (status = 404, description = "Leave application not found", body = ErrorResponse),
        (status = 422, description = "Status must be Approved or Rejected", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state, dto))]
pub async fn review_leave(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ParsedPath(leave_id): ParsedPath<LeaveId>,
    ValidatedJson(dto): ValidatedJson<ReviewLeaveDto>,
) -> Result<Json<LeaveApplication>, AppError> {
    let leave = LeaveService::review(state.store.as_ref(), &caller, leave_id, dto).await?;
    Ok(Json(leave))
}

/// Cancel the caller's own pending leave application
#[utoipa::path(
    delete,
    path = "/api/leaves/{id}",
    params(("id" = String, Path, description = "Leave application ID")),
    responses(
        (status = 200, description = "Leave cancelled", body = MessageResponse),
        (status = 400, description = "Only pending leaves can be cancelled", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Leave not found or not authorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn cancel_leave(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ParsedPath(id): ParsedPath<LeaveId>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = LeaveService::cancel(state.store.as_ref(), &caller, id).await?;
    Ok(Json(response))
}
