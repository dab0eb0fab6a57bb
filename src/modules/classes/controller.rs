use axum::{Json, extract::State, http::StatusCode};
use rollcall_core::{AppError, ErrorResponse};
use rollcall_models::{
    AssignClassDto, Class, ClassId, CreateClassDto, MessageResponse, UserResponse,
};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::classes::service::ClassService;
use crate::state::AppState;
use crate::validator::{ParsedPath, ValidatedJson};

/// Create a class (admin only)
#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 409, description = "Class already exists", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, dto))]
pub async fn create_class(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    let class = ClassService::create_class(state.store.as_ref(), &caller, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// List classes
#[utoipa::path(
    get,
    path = "/api/classes",
    responses(
        (status = 200, description = "All classes", body = Vec<Class>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_classes(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<Class>>, AppError> {
    let classes = ClassService::list_classes(state.store.as_ref(), &caller).await?;
    Ok(Json(classes))
}

/// Get a class by ID
#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class", body = Class),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ParsedPath(id): ParsedPath<ClassId>,
) -> Result<Json<Class>, AppError> {
    let class = ClassService::get_class(state.store.as_ref(), &caller, id).await?;
    Ok(Json(class))
}

/// Delete a class (admin only)
#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = String, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn delete_class(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ParsedPath(id): ParsedPath<ClassId>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = ClassService::delete_class(state.store.as_ref(), &caller, id).await?;
    Ok(Json(response))
}

/// Assign a student or faculty member to a class (admin only)
#[utoipa::path(
    post,
    path = "/api/classes/assign",
    request_body = AssignClassDto,
    responses(
        (status = 200, description = "Assigned", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "Student or class not found", body = ErrorResponse),
        (status = 422, description = "Administrators cannot be assigned", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, dto))]
pub async fn assign_class(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidatedJson(dto): ValidatedJson<AssignClassDto>,
) -> Result<Json<UserResponse>, AppError> {
    let user = ClassService::assign(state.store.as_ref(), &caller, dto).await?;
    Ok(Json(user))
}
