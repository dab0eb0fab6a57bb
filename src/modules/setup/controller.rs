use axum::{Json, extract::State, http::StatusCode};
use rollcall_core::{AppError, ErrorResponse};
use rollcall_models::{AuthResponse, RegisterUserDto};
use tracing::instrument;

use crate::modules::setup::service::SetupService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Register the first administrator (no token; only while no admin exists)
#[utoipa::path(
    post,
    path = "/api/setup/register-admin",
    request_body = RegisterUserDto,
    responses(
        (status = 201, description = "Administrator registered", body = AuthResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 403, description = "An administrator already exists", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Setup"
)]
#[instrument(skip(state, dto))]
pub async fn register_admin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterUserDto>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response =
        SetupService::register_first_admin(state.store.as_ref(), dto, &state.jwt_config).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
