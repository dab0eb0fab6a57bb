//! Storage guarantees against a real PostgreSQL database.
//!
//! Run with `DATABASE_URL` set: `cargo test --test integration_postgres -- --ignored`.

use chrono::NaiveDate;
use rollcall_core::hash_password;
use rollcall_db::{PgStore, Store};
use rollcall_models::{
    AttendanceQuery, AttendanceStatus, LeaveStatus, NewAttendance, NewLeave, NewUser, Role,
    UniqueId,
};
use sqlx::PgPool;

fn new_user(unique_id: &str, role: Role) -> NewUser {
    NewUser {
        name: format!("Test {}", unique_id),
        email: format!("{}@college.edu", unique_id.to_lowercase()),
        unique_id: UniqueId::new(unique_id).unwrap(),
        role,
        class_id: None,
        password_hash: hash_password("password123").unwrap(),
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_store_guarantees(pool: PgPool) {
    let store = PgStore::new(pool);

    // First admin only once.
    let first = store
        .create_first_admin(new_user("ADM001", Role::Admin))
        .await
        .unwrap();
    assert!(first.is_some());
    let second = store
        .create_first_admin(new_user("ADM002", Role::Admin))
        .await
        .unwrap();
    assert!(second.is_none());

    // Unique email and ID.
    let faculty = store.create_user(new_user("FAC001", Role::Faculty)).await.unwrap();
    let err = store
        .create_user(new_user("FAC001", Role::Faculty))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    // One attendance record per student per day.
    let student = store.create_user(new_user("STU001", Role::Student)).await.unwrap();
    let mark = |status| NewAttendance {
        student_id: student.id,
        date: date("2024-01-10"),
        status,
        marked_by: faculty.id,
    };
    store.insert_attendance(mark(AttendanceStatus::Present)).await.unwrap();
    let err = store
        .insert_attendance(mark(AttendanceStatus::Absent))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    let records = store
        .list_attendance(&AttendanceQuery::for_student(student.id))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, AttendanceStatus::Present);

    // Cancellation only deletes pending leaves.
    let leave = store
        .insert_leave(NewLeave {
            student_id: student.id,
            reason: "fever".to_string(),
            from_date: date("2024-02-01"),
            to_date: date("2024-02-03"),
        })
        .await
        .unwrap();
    assert_eq!(leave.status, LeaveStatus::Pending);

    store
        .review_leave(leave.id, LeaveStatus::Approved, faculty.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!store.delete_pending_leave(leave.id, student.id).await.unwrap());
    assert!(store.find_leave(leave.id).await.unwrap().is_some());
}
