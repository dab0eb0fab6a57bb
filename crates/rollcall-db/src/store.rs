//! The storage abstraction shared by every feature module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rollcall_models::{
    AttendanceQuery, AttendanceRecord, Class, ClassId, LeaveApplication, LeaveId, LeaveStatus,
    NewAttendance, NewLeave, NewUser, User, UserChanges, UserId,
};

use crate::error::StoreResult;

/// Persistent state for users, classes, attendance and leave applications.
///
/// Implementations enforce uniqueness themselves: user email and unique ID,
/// class `(name, section)` and attendance `(student_id, date)`. A violated
/// constraint surfaces as [`StoreError::UniqueViolation`](crate::StoreError)
/// and never overwrites the existing row.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    fn backend_name(&self) -> &'static str;

    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Inserts `user` only if no admin account exists yet, atomically with
    /// the check. Returns `None` when an admin is already present.
    async fn create_first_admin(&self, user: NewUser) -> StoreResult<Option<User>>;

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_unique_id(&self, unique_id: &str) -> StoreResult<Option<User>>;

    /// Users with the given IDs; unknown IDs are skipped.
    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;

    /// All users, oldest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Students whose class reference equals `class_id`.
    async fn list_students_in_class(&self, class_id: ClassId) -> StoreResult<Vec<User>>;

    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<Option<User>>;

    /// Removes the account only; attendance and leave history stay.
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;

    async fn admin_exists(&self) -> StoreResult<bool>;

    async fn set_reset_code(
        &self,
        id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Replaces the password hash and clears any reset code.
    async fn set_password(&self, id: UserId, password_hash: &str) -> StoreResult<()>;

    async fn create_class(&self, name: &str, section: &str) -> StoreResult<Class>;

    async fn find_class(&self, id: ClassId) -> StoreResult<Option<Class>>;

    async fn list_classes(&self) -> StoreResult<Vec<Class>>;

    /// Removes the class only; users keep their (now dangling) reference.
    async fn delete_class(&self, id: ClassId) -> StoreResult<bool>;

    async fn insert_attendance(&self, record: NewAttendance) -> StoreResult<AttendanceRecord>;

    /// Matching records, date descending.
    async fn list_attendance(&self, query: &AttendanceQuery) -> StoreResult<Vec<AttendanceRecord>>;

    /// Always stored as `Pending`.
    async fn insert_leave(&self, leave: NewLeave) -> StoreResult<LeaveApplication>;

    async fn find_leave(&self, id: LeaveId) -> StoreResult<Option<LeaveApplication>>;

    /// Newest first, optionally restricted to one student.
    async fn list_leaves(&self, student_id: Option<UserId>) -> StoreResult<Vec<LeaveApplication>>;

    /// Sets status and reviewer together.
    async fn review_leave(
        &self,
        id: LeaveId,
        status: LeaveStatus,
        reviewer: UserId,
    ) -> StoreResult<Option<LeaveApplication>>;

    /// Deletes the leave only if it belongs to `student_id` and is still
    /// pending at the moment of deletion.
    async fn delete_pending_leave(&self, id: LeaveId, student_id: UserId) -> StoreResult<bool>;
}
