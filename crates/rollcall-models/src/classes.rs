//! Class registry models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ClassId, UserId};

/// A class/section grouping. `(name, section)` is unique. Classes do not
/// list their members; users point at the class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: ClassId,
    #[schema(example = "CSE 3rd Year")]
    pub name: String,
    #[schema(example = "A")]
    pub section: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, message = "Class name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Section is required"))]
    pub section: String,
}

/// Assigns a student (or faculty member) to a class.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignClassDto {
    #[serde(alias = "userId")]
    pub student_id: UserId,
    pub class_id: ClassId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_class_requires_fields() {
        let dto = CreateClassDto {
            name: "CSE".into(),
            section: String::new(),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("section"));
    }

    #[test]
    fn test_assign_dto_accepts_user_id_alias() {
        let user = UserId::new();
        let class = ClassId::new();
        let json = format!(r#"{{"userId":"{}","classId":"{}"}}"#, user, class);
        let dto: AssignClassDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto.student_id, user);
        assert_eq!(dto.class_id, class);
    }
}
