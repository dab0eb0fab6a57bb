use axum::{Json, extract::State, http::StatusCode};
use rollcall_core::{AppError, ErrorResponse};
use rollcall_models::{
    AttendanceFilterParams, AttendanceRecord, AttendanceView, ClassId, MarkAttendanceDto,
};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::attendance::service::AttendanceService;
use crate::state::AppState;
use crate::validator::{ParsedPath, ParsedQuery, ValidatedJson};

/// Mark attendance for a student on a date (faculty or admin)
#[utoipa::path(
    post,
    path = "/api/attendance/mark",
    request_body = MarkAttendanceDto,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller may not mark attendance", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 409, description = "Attendance already marked for this date", body = ErrorResponse),
        (status = 422, description = "Target is not a student", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, dto))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidatedJson(dto): ValidatedJson<MarkAttendanceDto>,
) -> Result<(StatusCode, Json<AttendanceRecord>), AppError> {
    let record = AttendanceService::mark(state.store.as_ref(), &caller, dto).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// The caller's own attendance, newest date first
#[utoipa::path(
    get,
    path = "/api/attendance/my",
    responses(
        (status = 200, description = "Caller's attendance records", body = Vec<AttendanceRecord>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn my_attendance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    let records = AttendanceService::list_mine(state.store.as_ref(), &caller).await?;
    Ok(Json(records))
}

/// Attendance of every student in a class (faculty or admin)
#[utoipa::path(
    get,
    path = "/api/attendance/class/{classId}",
    params(("classId" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class attendance", body = Vec<AttendanceView>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller may not view class attendance", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn class_attendance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ParsedPath(class_id): ParsedPath<ClassId>,
) -> Result<Json<Vec<AttendanceView>>, AppError> {
    let records = AttendanceService::list_by_class(state.store.as_ref(), &caller, class_id).await?;
    Ok(Json(records))
}

/// All attendance, filtered (admin only). Filters combine with AND.
#[utoipa::path(
    get,
    path = "/api/attendance/all",
    params(AttendanceFilterParams),
    responses(
        (status = 200, description = "Matching attendance", body = Vec<AttendanceView>),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 422, description = "startDate after endDate", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state))]
pub async fn all_attendance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ParsedQuery(filters): ParsedQuery<AttendanceFilterParams>,
) -> Result<Json<Vec<AttendanceView>>, AppError> {
    let records = AttendanceService::list_all(state.store.as_ref(), &caller, filters).await?;
    Ok(Json(records))
}
