use std::collections::HashMap;

use anyhow::anyhow;
use chrono::{Duration, Utc};
use rand::Rng;
use rollcall_auth::{Caller, Operation, Target, create_access_token};
use rollcall_config::JwtConfig;
use rollcall_core::{AppError, hash_password, verify_password};
use rollcall_db::Store;
use rollcall_models::{
    AuthResponse, Class, ClassId, LoginRequest, MessageResponse, NewUser, RegisterUserDto,
    ResetPasswordRequest, Role, SendCodeRequest, UpdateUserDto, User, UserChanges, UserId,
    UserResponse,
};
use tracing::{error, info, instrument};

use crate::metrics::{
    track_jwt_issued, track_reset_code_sent, track_user_created, track_user_login_failure,
    track_user_login_success,
};
use crate::modules::authorize;
use crate::utils::email::{EmailService, RESET_CODE_TTL_MINUTES};

const DUPLICATE_USER: &str = "Email or ID already exists";
const INVALID_LOGIN: &str = "Invalid ID or password";

pub struct UserService;

impl UserService {
    #[instrument(
        skip(store, dto, jwt_config),
        fields(unique_id = %dto.unique_id, role = %dto.role)
    )]
    pub async fn register(
        store: &dyn Store,
        caller: &Caller,
        dto: RegisterUserDto,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        authorize(caller, Operation::RegisterUser, &Target::None)?;

        let new_user = prepare_new_user(store, dto).await?;
        let user = store
            .create_user(new_user)
            .await
            .map_err(|e| e.into_app_error(DUPLICATE_USER))?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        track_user_created(user.role);

        auth_response(store, user, jwt_config).await
    }

    #[instrument(skip(store, dto, jwt_config), fields(unique_id = %dto.unique_id))]
    pub async fn login(
        store: &dyn Store,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let unique_id = dto.unique_id.trim().to_uppercase();
        let Some(user) = store.find_user_by_unique_id(&unique_id).await? else {
            track_user_login_failure("unknown_id");
            return Err(AppError::unauthorized(INVALID_LOGIN));
        };

        if !verify_password(&dto.password, &user.password_hash)? {
            track_user_login_failure("invalid_password");
            return Err(AppError::unauthorized(INVALID_LOGIN));
        }

        track_user_login_success(user.role);
        auth_response(store, user, jwt_config).await
    }

    #[instrument(skip(store))]
    pub async fn profile(store: &dyn Store, caller: &Caller) -> Result<UserResponse, AppError> {
        authorize(caller, Operation::ViewProfile, &Target::None)?;

        let user = store
            .find_user(caller.id)
            .await?
            .ok_or_else(user_not_found)?;

        resolve_user(store, user).await
    }

    #[instrument(skip(store))]
    pub async fn list_users(
        store: &dyn Store,
        caller: &Caller,
    ) -> Result<Vec<UserResponse>, AppError> {
        authorize(caller, Operation::ListUsers, &Target::None)?;

        let users = store.list_users().await?;
        resolve_users(store, users).await
    }

    #[instrument(skip(store, dto))]
    pub async fn update_user(
        store: &dyn Store,
        caller: &Caller,
        id: UserId,
        dto: UpdateUserDto,
    ) -> Result<UserResponse, AppError> {
        authorize(caller, Operation::UpdateUser, &Target::None)?;

        let existing = store.find_user(id).await?.ok_or_else(user_not_found)?;

        let role = dto.role.unwrap_or(existing.role);
        if !existing.unique_id.matches_role(role) {
            return Err(prefix_mismatch(role));
        }

        let class_id = if role.has_class() {
            match dto.class_id {
                Some(class_id) => {
                    ensure_class_exists(store, class_id).await?;
                    Some(Some(class_id))
                }
                None => None,
            }
        } else if dto.class_id.is_some() {
            return Err(admin_with_class());
        } else {
            // Administrators never keep a class.
            Some(None)
        };

        let changes = UserChanges {
            name: dto.name.map(|name| name.trim().to_string()),
            email: dto.email.map(|email| normalize_email(&email)),
            role: dto.role,
            class_id,
        };

        let user = store
            .update_user(id, changes)
            .await
            .map_err(|e| e.into_app_error("Email already exists"))?
            .ok_or_else(user_not_found)?;

        info!(user_id = %user.id, "User updated");
        resolve_user(store, user).await
    }

    #[instrument(skip(store))]
    pub async fn delete_user(
        store: &dyn Store,
        caller: &Caller,
        id: UserId,
    ) -> Result<MessageResponse, AppError> {
        authorize(caller, Operation::DeleteUser, &Target::None)?;

        if !store.delete_user(id).await? {
            return Err(user_not_found());
        }

        info!(user_id = %id, "User deleted");
        Ok(MessageResponse::new("User deleted successfully"))
    }

    /// Stores a fresh 6-digit code and emails it in the background.
    #[instrument(skip(store, email_service, dto))]
    pub async fn send_reset_code(
        store: &dyn Store,
        email_service: EmailService,
        dto: SendCodeRequest,
    ) -> Result<MessageResponse, AppError> {
        let user = store
            .find_user_by_email(&normalize_email(&dto.email))
            .await?
            .ok_or_else(user_not_found)?;

        let code = generate_reset_code();
        let expires_at = Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES);
        store.set_reset_code(user.id, &code, expires_at).await?;
        track_reset_code_sent();

        tokio::spawn(async move {
            if let Err(e) = email_service
                .send_reset_code(&user.email, &user.name, &code)
                .await
            {
                error!(user_id = %user.id, error = %e, "Failed to send reset code email");
            }
        });

        Ok(MessageResponse::new("Verification code sent to email"))
    }

    #[instrument(skip(store, dto))]
    pub async fn reset_password(
        store: &dyn Store,
        dto: ResetPasswordRequest,
    ) -> Result<MessageResponse, AppError> {
        let user = store
            .find_user_by_email(&normalize_email(&dto.email))
            .await?
            .ok_or_else(user_not_found)?;

        if user.reset_code.as_deref() != Some(dto.code.trim()) {
            return Err(AppError::unprocessable(anyhow!("Invalid verification code")));
        }

        if user
            .reset_code_expires_at
            .is_none_or(|expires_at| expires_at < Utc::now())
        {
            return Err(AppError::unprocessable(anyhow!(
                "Verification code has expired"
            )));
        }

        let password_hash = hash_password(&dto.new_password)?;
        store.set_password(user.id, &password_hash).await?;

        info!(user_id = %user.id, "Password reset");
        Ok(MessageResponse::new("Password updated successfully"))
    }
}

/// Checks the role rules for a new account and hashes its password.
pub(crate) async fn prepare_new_user(
    store: &dyn Store,
    dto: RegisterUserDto,
) -> Result<NewUser, AppError> {
    if !dto.unique_id.matches_role(dto.role) {
        return Err(prefix_mismatch(dto.role));
    }

    let class_id = match (dto.role.has_class(), dto.class_id) {
        (false, Some(_)) => return Err(admin_with_class()),
        (true, Some(class_id)) => {
            ensure_class_exists(store, class_id).await?;
            Some(class_id)
        }
        (_, None) => None,
    };

    Ok(NewUser {
        name: dto.name.trim().to_string(),
        email: normalize_email(&dto.email),
        unique_id: dto.unique_id,
        role: dto.role,
        class_id,
        password_hash: hash_password(&dto.password)?,
    })
}

pub(crate) async fn auth_response(
    store: &dyn Store,
    user: User,
    jwt_config: &JwtConfig,
) -> Result<AuthResponse, AppError> {
    let token = create_access_token(user.id, user.role, jwt_config)?;
    track_jwt_issued();

    Ok(AuthResponse {
        token,
        user: resolve_user(store, user).await?,
    })
}

/// Resolves the user's class reference; a deleted class becomes `None`.
pub(crate) async fn resolve_user(store: &dyn Store, user: User) -> Result<UserResponse, AppError> {
    let class = match user.class_id {
        Some(class_id) => store.find_class(class_id).await?,
        None => None,
    };
    Ok(UserResponse::new(user, class))
}

pub(crate) async fn resolve_users(
    store: &dyn Store,
    users: Vec<User>,
) -> Result<Vec<UserResponse>, AppError> {
    let classes: HashMap<ClassId, Class> = store
        .list_classes()
        .await?
        .into_iter()
        .map(|class| (class.id, class))
        .collect();

    Ok(users
        .into_iter()
        .map(|user| {
            let class = user.class_id.and_then(|id| classes.get(&id).cloned());
            UserResponse::new(user, class)
        })
        .collect())
}

async fn ensure_class_exists(store: &dyn Store, class_id: ClassId) -> Result<(), AppError> {
    match store.find_class(class_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::unprocessable(anyhow!("Class not found"))),
    }
}

fn prefix_mismatch(role: Role) -> AppError {
    let label = match role {
        Role::Admin => "Admin",
        Role::Faculty => "Faculty",
        Role::Student => "Student",
    };
    AppError::unprocessable(anyhow!("{} ID must start with {}", label, role.id_prefix()))
}

fn admin_with_class() -> AppError {
    AppError::unprocessable(anyhow!("Administrators cannot be assigned to a class"))
}

fn user_not_found() -> AppError {
    AppError::not_found(anyhow!("User not found"))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_reset_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}
