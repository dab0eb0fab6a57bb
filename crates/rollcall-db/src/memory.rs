//! In-memory backend, used when no `DATABASE_URL` is configured and by the
//! test suite.
//!
//! All state sits behind one lock, so every check-then-write (uniqueness,
//! first-admin bootstrap, pending-only cancel) happens in a single critical
//! section.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rollcall_models::{
    AttendanceId, AttendanceQuery, AttendanceRecord, Class, ClassId, LeaveApplication, LeaveId,
    LeaveStatus, NewAttendance, NewLeave, NewUser, Role, User, UserChanges, UserId,
};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

#[derive(Default)]
struct Inner {
    /// Insertion order doubles as the tie-breaker for equal timestamps.
    users: Vec<User>,
    classes: Vec<Class>,
    attendance: Vec<AttendanceRecord>,
    leaves: Vec<LeaveApplication>,
}

impl Inner {
    fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    fn check_user_unique(
        &self,
        email: &str,
        unique_id: &str,
        except: Option<UserId>,
    ) -> StoreResult<()> {
        for user in self.users.iter().filter(|u| Some(u.id) != except) {
            if user.email == email {
                return Err(StoreError::UniqueViolation("users_email_key".into()));
            }
            if user.unique_id.as_str() == unique_id {
                return Err(StoreError::UniqueViolation("users_unique_id_key".into()));
            }
        }
        Ok(())
    }

    fn insert_user(&mut self, user: NewUser) -> StoreResult<User> {
        self.check_user_unique(&user.email, user.unique_id.as_str(), None)?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            unique_id: user.unique_id,
            role: user.role,
            class_id: user.class_id,
            password_hash: user.password_hash,
            reset_code: None,
            reset_code_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest-first ordering that keeps later insertions ahead on ties.
fn newest_first<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> Vec<T>
where
    T: Clone,
{
    let mut out: Vec<T> = items.iter().rev().cloned().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        self.inner.write().await.insert_user(user)
    }

    async fn create_first_admin(&self, user: NewUser) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.role == Role::Admin) {
            return Ok(None);
        }
        inner.insert_user(user).map(Some)
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_unique_id(&self, unique_id: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.unique_id.as_str() == unique_id)
            .cloned())
    }

    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn list_students_in_class(&self, class_id: ClassId) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .filter(|u| u.role == Role::Student && u.class_id == Some(class_id))
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut inner = self.inner.write().await;

        let Some(current) = inner.users.iter().find(|u| u.id == id) else {
            return Ok(None);
        };
        let email = changes.email.clone().unwrap_or_else(|| current.email.clone());
        let unique_id = current.unique_id.clone();
        inner.check_user_unique(&email, unique_id.as_str(), Some(id))?;

        let Some(user) = inner.user_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        user.email = email;
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(class_id) = changes.class_id {
            user.class_id = class_id;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        Ok(inner.users.len() < before)
    }

    async fn admin_exists(&self) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().any(|u| u.role == Role::Admin))
    }

    async fn set_reset_code(
        &self,
        id: UserId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.user_mut(id) {
            user.reset_code = Some(code.to_string());
            user.reset_code_expires_at = Some(expires_at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_password(&self, id: UserId, password_hash: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.user_mut(id) {
            user.password_hash = password_hash.to_string();
            user.reset_code = None;
            user.reset_code_expires_at = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn create_class(&self, name: &str, section: &str) -> StoreResult<Class> {
        let mut inner = self.inner.write().await;
        if inner
            .classes
            .iter()
            .any(|c| c.name == name && c.section == section)
        {
            return Err(StoreError::UniqueViolation(
                "classes_name_section_key".into(),
            ));
        }

        let class = Class {
            id: ClassId::new(),
            name: name.to_string(),
            section: section.to_string(),
            created_at: Utc::now(),
        };
        inner.classes.push(class.clone());
        Ok(class)
    }

    async fn find_class(&self, id: ClassId) -> StoreResult<Option<Class>> {
        let inner = self.inner.read().await;
        Ok(inner.classes.iter().find(|c| c.id == id).cloned())
    }

    async fn list_classes(&self) -> StoreResult<Vec<Class>> {
        let mut classes = self.inner.read().await.classes.clone();
        classes.sort_by(|a, b| (&a.name, &a.section).cmp(&(&b.name, &b.section)));
        Ok(classes)
    }

    async fn delete_class(&self, id: ClassId) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.classes.len();
        inner.classes.retain(|c| c.id != id);
        Ok(inner.classes.len() < before)
    }

    async fn insert_attendance(&self, record: NewAttendance) -> StoreResult<AttendanceRecord> {
        let mut inner = self.inner.write().await;
        if inner
            .attendance
            .iter()
            .any(|r| r.student_id == record.student_id && r.date == record.date)
        {
            return Err(StoreError::UniqueViolation(
                "attendance_student_date_key".into(),
            ));
        }

        let record = AttendanceRecord {
            id: AttendanceId::new(),
            student_id: record.student_id,
            date: record.date,
            status: record.status,
            marked_by: record.marked_by,
            created_at: Utc::now(),
        };
        inner.attendance.push(record.clone());
        Ok(record)
    }

    async fn list_attendance(&self, query: &AttendanceQuery) -> StoreResult<Vec<AttendanceRecord>> {
        let inner = self.inner.read().await;
        let matching: Vec<AttendanceRecord> = inner
            .attendance
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        Ok(newest_first(&matching, |r| (r.date, r.created_at)))
    }

    async fn insert_leave(&self, leave: NewLeave) -> StoreResult<LeaveApplication> {
        let leave = LeaveApplication {
            id: LeaveId::new(),
            student_id: leave.student_id,
            reason: leave.reason,
            from_date: leave.from_date,
            to_date: leave.to_date,
            status: LeaveStatus::Pending,
            reviewed_by: None,
            created_at: Utc::now(),
        };
        self.inner.write().await.leaves.push(leave.clone());
        Ok(leave)
    }

    async fn find_leave(&self, id: LeaveId) -> StoreResult<Option<LeaveApplication>> {
        let inner = self.inner.read().await;
        Ok(inner.leaves.iter().find(|l| l.id == id).cloned())
    }

    async fn list_leaves(&self, student_id: Option<UserId>) -> StoreResult<Vec<LeaveApplication>> {
        let inner = self.inner.read().await;
        let matching: Vec<LeaveApplication> = inner
            .leaves
            .iter()
            .filter(|l| student_id.is_none_or(|s| l.student_id == s))
            .cloned()
            .collect();
        Ok(newest_first(&matching, |l| l.created_at))
    }

    async fn review_leave(
        &self,
        id: LeaveId,
        status: LeaveStatus,
        reviewer: UserId,
    ) -> StoreResult<Option<LeaveApplication>> {
        let mut inner = self.inner.write().await;
        let Some(leave) = inner.leaves.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        leave.status = status;
        leave.reviewed_by = Some(reviewer);
        Ok(Some(leave.clone()))
    }

    async fn delete_pending_leave(&self, id: LeaveId, student_id: UserId) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.leaves.len();
        inner.leaves.retain(|l| {
            !(l.id == id && l.student_id == student_id && l.status == LeaveStatus::Pending)
        });
        Ok(inner.leaves.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_models::AttendanceStatus;
    use std::sync::Arc;

    fn new_user(role: Role, unique_id: &str, email: &str) -> NewUser {
        NewUser {
            name: format!("User {}", unique_id),
            email: email.to_string(),
            unique_id: unique_id.parse().unwrap(),
            role,
            class_id: None,
            password_hash: "hash".to_string(),
        }
    }

    fn mark(student_id: UserId, date: &str, status: AttendanceStatus) -> NewAttendance {
        NewAttendance {
            student_id,
            date: date.parse().unwrap(),
            status,
            marked_by: UserId::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_and_unique_id_rejected() {
        let store = MemoryStore::new();
        store
            .create_user(new_user(Role::Student, "STU001", "a@college.edu"))
            .await
            .unwrap();

        let same_email = store
            .create_user(new_user(Role::Student, "STU002", "a@college.edu"))
            .await
            .unwrap_err();
        assert!(same_email.is_unique_violation());

        let same_id = store
            .create_user(new_user(Role::Student, "STU001", "b@college.edu"))
            .await
            .unwrap_err();
        assert!(same_id.is_unique_violation());
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_mark_does_not_overwrite() {
        let store = MemoryStore::new();
        let student = UserId::new();

        store
            .insert_attendance(mark(student, "2024-01-10", AttendanceStatus::Present))
            .await
            .unwrap();
        let err = store
            .insert_attendance(mark(student, "2024-01-10", AttendanceStatus::Absent))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        let records = store
            .list_attendance(&AttendanceQuery::for_student(student))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_concurrent_marks_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let student = UserId::new();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                let status = if i % 2 == 0 {
                    AttendanceStatus::Present
                } else {
                    AttendanceStatus::Absent
                };
                tokio::spawn(async move {
                    store
                        .insert_attendance(mark(student, "2024-01-10", status))
                        .await
                })
            })
            .collect();

        let mut ok = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) if e.is_unique_violation() => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(duplicates, 15);
    }

    #[tokio::test]
    async fn test_attendance_sorted_date_descending() {
        let store = MemoryStore::new();
        let student = UserId::new();
        for date in ["2024-01-09", "2024-01-11", "2024-01-10"] {
            store
                .insert_attendance(mark(student, date, AttendanceStatus::Present))
                .await
                .unwrap();
        }

        let dates: Vec<String> = store
            .list_attendance(&AttendanceQuery::default())
            .await
            .unwrap()
            .iter()
            .map(|r| r.date.to_string())
            .collect();
        assert_eq!(dates, ["2024-01-11", "2024-01-10", "2024-01-09"]);
    }

    #[tokio::test]
    async fn test_first_admin_only_once() {
        let store = MemoryStore::new();
        let first = store
            .create_first_admin(new_user(Role::Admin, "ADM001", "root@college.edu"))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .create_first_admin(new_user(Role::Admin, "ADM002", "other@college.edu"))
            .await
            .unwrap();
        assert!(second.is_none());
        assert!(store.admin_exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_pending_leave_is_conditional() {
        let store = MemoryStore::new();
        let student = UserId::new();
        let leave = store
            .insert_leave(NewLeave {
                student_id: student,
                reason: "fever".into(),
                from_date: "2024-02-01".parse().unwrap(),
                to_date: "2024-02-03".parse().unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(leave.status, LeaveStatus::Pending);

        assert!(!store.delete_pending_leave(leave.id, UserId::new()).await.unwrap());

        store
            .review_leave(leave.id, LeaveStatus::Approved, UserId::new())
            .await
            .unwrap();
        assert!(!store.delete_pending_leave(leave.id, student).await.unwrap());
        assert!(store.find_leave(leave.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_user_email_collision() {
        let store = MemoryStore::new();
        let a = store
            .create_user(new_user(Role::Student, "STU001", "a@college.edu"))
            .await
            .unwrap();
        store
            .create_user(new_user(Role::Student, "STU002", "b@college.edu"))
            .await
            .unwrap();

        let err = store
            .update_user(
                a.id,
                UserChanges {
                    email: Some("b@college.edu".into()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        let renamed = store
            .update_user(
                a.id,
                UserChanges {
                    name: Some("Renamed".into()),
                    class_id: Some(Some(ClassId::new())),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(renamed.email, "a@college.edu");
        assert!(renamed.class_id.is_some());
    }

    #[tokio::test]
    async fn test_deleting_class_keeps_member_reference() {
        let store = MemoryStore::new();
        let class = store.create_class("CSE", "A").await.unwrap();
        let mut user = new_user(Role::Student, "STU001", "a@college.edu");
        user.class_id = Some(class.id);
        let user = store.create_user(user).await.unwrap();

        assert!(store.delete_class(class.id).await.unwrap());
        let reloaded = store.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.class_id, Some(class.id));
        assert!(store.find_class(class.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_class_rejected() {
        let store = MemoryStore::new();
        store.create_class("CSE", "A").await.unwrap();
        assert!(store.create_class("CSE", "B").await.is_ok());
        assert!(
            store
                .create_class("CSE", "A")
                .await
                .unwrap_err()
                .is_unique_violation()
        );
    }
}
