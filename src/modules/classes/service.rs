use anyhow::anyhow;
use rollcall_auth::{Caller, Operation, Target};
use rollcall_core::AppError;
use rollcall_db::Store;
use rollcall_models::{
    AssignClassDto, Class, ClassId, CreateClassDto, MessageResponse, UserChanges, UserResponse,
};
use tracing::{info, instrument};

use crate::modules::authorize;

pub struct ClassService;

impl ClassService {
    #[instrument(skip(store, dto))]
    pub async fn create_class(
        store: &dyn Store,
        caller: &Caller,
        dto: CreateClassDto,
    ) -> Result<Class, AppError> {
        authorize(caller, Operation::CreateClass, &Target::None)?;

        let name = dto.name.trim();
        let section = dto.section.trim();
        if name.is_empty() || section.is_empty() {
            return Err(AppError::unprocessable(anyhow!(
                "Class name and section are required"
            )));
        }

        let class = store
            .create_class(name, section)
            .await
            .map_err(|e| e.into_app_error("Class already exists"))?;

        info!(class_id = %class.id, name = %class.name, section = %class.section, "Class created");
        Ok(class)
    }

    #[instrument(skip(store))]
    pub async fn list_classes(store: &dyn Store, caller: &Caller) -> Result<Vec<Class>, AppError> {
        authorize(caller, Operation::ReadClasses, &Target::None)?;
        Ok(store.list_classes().await?)
    }

    #[instrument(skip(store))]
    pub async fn get_class(
        store: &dyn Store,
        caller: &Caller,
        id: ClassId,
    ) -> Result<Class, AppError> {
        authorize(caller, Operation::ReadClasses, &Target::None)?;

        store.find_class(id).await?.ok_or_else(class_not_found)
    }

    /// Removes the class. Members keep their reference, which reads as no
    /// class from then on.
    #[instrument(skip(store))]
    pub async fn delete_class(
        store: &dyn Store,
        caller: &Caller,
        id: ClassId,
    ) -> Result<MessageResponse, AppError> {
        authorize(caller, Operation::DeleteClass, &Target::None)?;

        if !store.delete_class(id).await? {
            return Err(class_not_found());
        }

        info!(class_id = %id, "Class deleted");
        Ok(MessageResponse::new("Class deleted"))
    }

    #[instrument(skip(store))]
    pub async fn assign(
        store: &dyn Store,
        caller: &Caller,
        dto: AssignClassDto,
    ) -> Result<UserResponse, AppError> {
        authorize(caller, Operation::AssignClass, &Target::None)?;

        let user = store
            .find_user(dto.student_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        if !user.role.has_class() {
            return Err(AppError::unprocessable(anyhow!(
                "Administrators cannot be assigned to a class"
            )));
        }

        let class = store
            .find_class(dto.class_id)
            .await?
            .ok_or_else(class_not_found)?;

        let changes = UserChanges {
            class_id: Some(Some(class.id)),
            ..UserChanges::default()
        };
        let user = store
            .update_user(user.id, changes)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        info!(user_id = %user.id, class_id = %class.id, "Assigned to class");
        Ok(UserResponse::new(user, Some(class)))
    }
}

fn class_not_found() -> AppError {
    AppError::not_found(anyhow!("Class not found"))
}
