//! Leave workflow models.
//!
//! Applications start `Pending` and move to `Approved` or `Rejected` when a
//! faculty member or administrator reviews them. Only a pending application
//! can be cancelled, and only by the student who filed it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{LeaveId, UserId};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "leave_status")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Approved and Rejected are the only outcomes a review may set.
    pub fn is_review_outcome(self) -> bool {
        matches!(self, LeaveStatus::Approved | LeaveStatus::Rejected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
    pub id: LeaveId,
    pub student_id: UserId,
    pub reason: String,
    #[schema(example = "2024-02-01")]
    pub from_date: NaiveDate,
    #[schema(example = "2024-02-03")]
    pub to_date: NaiveDate,
    pub status: LeaveStatus,
    /// Set together with the status on review.
    pub reviewed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLeave {
    pub student_id: UserId,
    pub reason: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// An application annotated with the student's name and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveView {
    pub id: LeaveId,
    pub student_id: UserId,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub reason: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub status: LeaveStatus,
    pub reviewed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl LeaveView {
    pub fn new(
        leave: LeaveApplication,
        student_name: Option<String>,
        student_email: Option<String>,
    ) -> Self {
        Self {
            id: leave.id,
            student_id: leave.student_id,
            student_name,
            student_email,
            reason: leave.reason,
            from_date: leave.from_date,
            to_date: leave.to_date,
            status: leave.status,
            reviewed_by: leave.reviewed_by,
            created_at: leave.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLeaveDto {
    #[validate(length(min = 1, message = "Reason is required"))]
    #[schema(example = "fever")]
    pub reason: String,
    #[schema(example = "2024-02-01")]
    pub from_date: NaiveDate,
    #[schema(example = "2024-02-03")]
    pub to_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReviewLeaveDto {
    pub status: LeaveStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(LeaveStatus::default(), LeaveStatus::Pending);
    }

    #[test]
    fn test_review_outcomes() {
        assert!(LeaveStatus::Approved.is_review_outcome());
        assert!(LeaveStatus::Rejected.is_review_outcome());
        assert!(!LeaveStatus::Pending.is_review_outcome());
    }

    #[test]
    fn test_apply_dto_rejects_empty_reason() {
        let dto: ApplyLeaveDto = serde_json::from_str(
            r#"{"reason":"","fromDate":"2024-02-01","toDate":"2024-02-03"}"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_review_dto_rejects_unknown_status() {
        assert!(serde_json::from_str::<ReviewLeaveDto>(r#"{"status":"Cancelled"}"#).is_err());
    }
}
