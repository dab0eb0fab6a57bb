use anyhow::anyhow;
use rollcall_config::JwtConfig;
use rollcall_core::AppError;
use rollcall_db::Store;
use rollcall_models::{AuthResponse, RegisterUserDto, Role};
use tracing::{info, instrument, warn};

use crate::metrics::track_user_created;
use crate::modules::users::service::{auth_response, prepare_new_user};

pub struct SetupService;

impl SetupService {
    /// Registers the first administrator. Accepted only while no admin
    /// account exists; the check and insert are atomic in the store.
    #[instrument(skip(store, dto, jwt_config), fields(unique_id = %dto.unique_id))]
    pub async fn register_first_admin(
        store: &dyn Store,
        dto: RegisterUserDto,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        if dto.role != Role::Admin {
            return Err(AppError::unprocessable(anyhow!(
                "Only an admin account can be bootstrapped"
            )));
        }

        let new_user = prepare_new_user(store, dto).await?;
        let Some(user) = store
            .create_first_admin(new_user)
            .await
            .map_err(|e| e.into_app_error("Email or ID already exists"))?
        else {
            warn!("Bootstrap registration rejected: an administrator already exists");
            return Err(AppError::forbidden("An administrator already exists"));
        };

        info!(user_id = %user.id, "First administrator registered");
        track_user_created(user.role);

        auth_response(store, user, jwt_config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::ErrorKind;
    use rollcall_db::MemoryStore;
    use rollcall_models::UniqueId;

    fn admin_dto(unique_id: &str, email: &str) -> RegisterUserDto {
        RegisterUserDto {
            name: "Principal".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            unique_id: UniqueId::new(unique_id).unwrap(),
            role: Role::Admin,
            class_id: None,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_only_once() {
        let store = MemoryStore::new();
        let jwt = JwtConfig::new("test-secret");

        let first =
            SetupService::register_first_admin(&store, admin_dto("ADM001", "a@x.edu"), &jwt)
                .await
                .unwrap();
        assert_eq!(first.user.role, Role::Admin);

        let err = SetupService::register_first_admin(&store, admin_dto("ADM002", "b@x.edu"), &jwt)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_bootstrap_requires_admin_role() {
        let store = MemoryStore::new();
        let mut dto = admin_dto("STU001", "s@x.edu");
        dto.role = Role::Student;

        let err = SetupService::register_first_admin(&store, dto, &JwtConfig::new("s"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert!(!store.admin_exists().await.unwrap());
    }
}
