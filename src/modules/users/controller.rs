use axum::{Json, extract::State, http::StatusCode};
use rollcall_core::{AppError, ErrorResponse};
use rollcall_models::{
    AuthResponse, LoginRequest, MessageResponse, RegisterUserDto, ResetPasswordRequest,
    SendCodeRequest, UpdateUserDto, UserId, UserResponse,
};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::{ParsedPath, ValidatedJson};

/// Log in with institutional ID and password
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Invalid ID or password", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = UserService::login(state.store.as_ref(), dto, &state.jwt_config).await?;
    Ok(Json(response))
}

/// Register a new user (admin only)
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterUserDto,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 409, description = "Email or ID already exists", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidatedJson(dto): ValidatedJson<RegisterUserDto>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response =
        UserService::register(state.store.as_ref(), &caller, dto, &state.jwt_config).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Current caller's profile
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::profile(state.store.as_ref(), &caller).await?;
    Ok(Json(user))
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = UserService::list_users(state.store.as_ref(), &caller).await?;
    Ok(Json(users))
}

/// Update a user (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ParsedPath(id): ParsedPath<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::update_user(state.store.as_ref(), &caller, id, dto).await?;
    Ok(Json(user))
}

/// Delete a user (admin only). Attendance and leave history are kept.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ParsedPath(id): ParsedPath<UserId>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = UserService::delete_user(state.store.as_ref(), &caller, id).await?;
    Ok(Json(response))
}

/// Email a password-reset verification code
#[utoipa::path(
    post,
    path = "/api/users/send-code",
    request_body = SendCodeRequest,
    responses(
        (status = 200, description = "Verification code sent", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn send_code(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SendCodeRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response =
        UserService::send_reset_code(state.store.as_ref(), state.email_service(), dto).await?;
    Ok(Json(response))
}

/// Reset a password with a verification code
#[utoipa::path(
    post,
    path = "/api/users/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Invalid or expired code", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = UserService::reset_password(state.store.as_ref(), dto).await?;
    Ok(Json(response))
}
