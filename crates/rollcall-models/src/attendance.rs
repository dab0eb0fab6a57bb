//! Attendance ledger models.
//!
//! One [`AttendanceRecord`] exists per `(student, date)`. Records are never
//! amended or deleted.

use chrono::{DateTime, NaiveDate, Utc};
use rollcall_core::serde::{deserialize_optional_date, deserialize_optional_uuid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::ids::{AttendanceId, ClassId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "attendance_status")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student_id: UserId,
    #[schema(example = "2024-01-10")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub student_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: UserId,
}

/// A record annotated with the people it refers to. Names resolve to `null`
/// when the account has since been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    pub id: AttendanceId,
    pub student_id: UserId,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marked_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceDto {
    pub student_id: UserId,
    #[schema(example = "2024-01-10")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Query string for the admin-wide listing. Empty values are ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub class_id: Option<Uuid>,
    /// Inclusive lower bound (YYYY-MM-DD).
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound (YYYY-MM-DD).
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<NaiveDate>,
}

impl AttendanceFilterParams {
    pub fn student(&self) -> Option<UserId> {
        self.student_id.map(UserId::from_uuid)
    }

    pub fn class(&self) -> Option<ClassId> {
        self.class_id.map(ClassId::from_uuid)
    }
}

/// Storage-level query. Every present field must match; `student_ids` of
/// `Some(vec![])` matches nothing.
#[derive(Debug, Clone, Default)]
pub struct AttendanceQuery {
    pub student_ids: Option<Vec<UserId>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AttendanceQuery {
    pub fn for_student(student_id: UserId) -> Self {
        Self {
            student_ids: Some(vec![student_id]),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.student_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&record.student_id))
            && self.start_date.is_none_or(|start| record.date >= start)
            && self.end_date.is_none_or(|end| record.date <= end)
    }
}
