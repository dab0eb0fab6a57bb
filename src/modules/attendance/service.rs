use std::collections::HashMap;

use anyhow::anyhow;
use rollcall_auth::{Caller, Operation, Target};
use rollcall_core::AppError;
use rollcall_db::Store;
use rollcall_models::{
    AttendanceFilterParams, AttendanceQuery, AttendanceRecord, AttendanceView, ClassId,
    MarkAttendanceDto, NewAttendance, Role, User, UserId,
};
use tracing::{info, instrument, warn};

use crate::metrics::{track_attendance_marked, track_duplicate_mark};
use crate::modules::authorize;

pub struct AttendanceService;

impl AttendanceService {
    /// Records one status for `(student, date)`. A second mark for the same
    /// day fails and leaves the first record untouched.
    #[instrument(skip(store))]
    pub async fn mark(
        store: &dyn Store,
        caller: &Caller,
        dto: MarkAttendanceDto,
    ) -> Result<AttendanceRecord, AppError> {
        authorize(caller, Operation::MarkAttendance, &Target::Student(dto.student_id))?;

        let student = store
            .find_user(dto.student_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        if student.role != Role::Student {
            return Err(AppError::unprocessable(anyhow!(
                "Attendance can only be marked for students"
            )));
        }

        let record = store
            .insert_attendance(NewAttendance {
                student_id: student.id,
                date: dto.date,
                status: dto.status,
                marked_by: caller.id,
            })
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    warn!(student_id = %student.id, date = %dto.date, "Duplicate attendance mark");
                    track_duplicate_mark();
                }
                e.into_app_error("Attendance already marked for this date")
            })?;

        info!(
            record_id = %record.id,
            student_id = %record.student_id,
            date = %record.date,
            status = ?record.status,
            "Attendance marked"
        );
        track_attendance_marked(record.status);

        Ok(record)
    }

    #[instrument(skip(store))]
    pub async fn list_mine(
        store: &dyn Store,
        caller: &Caller,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        authorize(caller, Operation::ViewOwnAttendance, &Target::Student(caller.id))?;

        Ok(store
            .list_attendance(&AttendanceQuery::for_student(caller.id))
            .await?)
    }

    /// Records of the students currently in `class_id`, date descending.
    #[instrument(skip(store))]
    pub async fn list_by_class(
        store: &dyn Store,
        caller: &Caller,
        class_id: ClassId,
    ) -> Result<Vec<AttendanceView>, AppError> {
        authorize(caller, Operation::ListClassAttendance, &Target::None)?;

        let students = store.list_students_in_class(class_id).await?;
        if students.is_empty() {
            return Ok(Vec::new());
        }

        let query = AttendanceQuery {
            student_ids: Some(students.iter().map(|s| s.id).collect()),
            ..AttendanceQuery::default()
        };
        let records = store.list_attendance(&query).await?;

        let students: HashMap<UserId, User> = students.into_iter().map(|s| (s.id, s)).collect();
        Ok(records
            .into_iter()
            .map(|record| view(record, &students, false))
            .collect())
    }

    /// Every record matching all the given filters, annotated with student
    /// and marker names.
    #[instrument(skip(store))]
    pub async fn list_all(
        store: &dyn Store,
        caller: &Caller,
        filters: AttendanceFilterParams,
    ) -> Result<Vec<AttendanceView>, AppError> {
        authorize(caller, Operation::ListAllAttendance, &Target::None)?;

        if filters
            .start_date
            .zip(filters.end_date)
            .is_some_and(|(start, end)| start > end)
        {
            return Err(AppError::unprocessable(anyhow!(
                "startDate must not be after endDate"
            )));
        }

        let mut student_ids = filters.student().map(|id| vec![id]);
        if let Some(class_id) = filters.class() {
            let members: Vec<UserId> = store
                .list_students_in_class(class_id)
                .await?
                .into_iter()
                .map(|s| s.id)
                .collect();
            student_ids = Some(match student_ids {
                Some(ids) => ids.into_iter().filter(|id| members.contains(id)).collect(),
                None => members,
            });
        }

        if student_ids.as_ref().is_some_and(Vec::is_empty) {
            return Ok(Vec::new());
        }

        let query = AttendanceQuery {
            student_ids,
            start_date: filters.start_date,
            end_date: filters.end_date,
        };
        let records = store.list_attendance(&query).await?;

        let mut people: Vec<UserId> = records
            .iter()
            .flat_map(|r| [r.student_id, r.marked_by])
            .collect();
        people.sort();
        people.dedup();

        let users: HashMap<UserId, User> = store
            .find_users(&people)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(records
            .into_iter()
            .map(|record| view(record, &users, true))
            .collect())
    }
}

fn view(
    record: AttendanceRecord,
    users: &HashMap<UserId, User>,
    with_marker: bool,
) -> AttendanceView {
    let student = users.get(&record.student_id);
    let marked_by_name = if with_marker {
        users.get(&record.marked_by).map(|u| u.name.clone())
    } else {
        None
    };

    AttendanceView {
        id: record.id,
        student_id: record.student_id,
        student_name: student.map(|s| s.name.clone()),
        student_email: student.map(|s| s.email.clone()),
        date: record.date,
        status: record.status,
        marked_by: record.marked_by,
        marked_by_name,
        created_at: record.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rollcall_core::ErrorKind;
    use rollcall_db::MemoryStore;
    use rollcall_models::{AttendanceStatus, NewUser, UniqueId};

    async fn add_user(
        store: &MemoryStore,
        unique_id: &str,
        role: Role,
        class_id: Option<ClassId>,
    ) -> User {
        store
            .create_user(NewUser {
                name: format!("User {}", unique_id),
                email: format!("{}@college.edu", unique_id.to_lowercase()),
                unique_id: UniqueId::new(unique_id).unwrap(),
                role,
                class_id,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn mark_dto(student_id: UserId, day: &str, status: AttendanceStatus) -> MarkAttendanceDto {
        MarkAttendanceDto {
            student_id,
            date: date(day),
            status,
        }
    }

    #[tokio::test]
    async fn test_second_mark_is_duplicate_and_keeps_first() {
        let store = MemoryStore::new();
        let faculty = Caller::from(&add_user(&store, "FAC001", Role::Faculty, None).await);
        let student = add_user(&store, "STU001", Role::Student, None).await;

        let present = mark_dto(student.id, "2024-01-10", AttendanceStatus::Present);
        AttendanceService::mark(&store, &faculty, present)
            .await
            .unwrap();
        let absent = mark_dto(student.id, "2024-01-10", AttendanceStatus::Absent);
        let err = AttendanceService::mark(&store, &faculty, absent)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateRecord);

        let records = AttendanceService::list_mine(&store, &Caller::from(&student))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_mark_rejects_non_student_and_unknown() {
        let store = MemoryStore::new();
        let admin = Caller::from(&add_user(&store, "ADM001", Role::Admin, None).await);
        let faculty = add_user(&store, "FAC001", Role::Faculty, None).await;

        let dto = mark_dto(faculty.id, "2024-01-10", AttendanceStatus::Present);
        let err = AttendanceService::mark(&store, &admin, dto)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);

        let dto = mark_dto(UserId::new(), "2024-01-10", AttendanceStatus::Present);
        let err = AttendanceService::mark(&store, &admin, dto)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_student_cannot_mark() {
        let store = MemoryStore::new();
        let student = add_user(&store, "STU001", Role::Student, None).await;

        let err = AttendanceService::mark(
            &store,
            &Caller::from(&student),
            mark_dto(student.id, "2024-01-10", AttendanceStatus::Present),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_list_all_intersects_student_and_class_filters() {
        let store = MemoryStore::new();
        let admin = Caller::from(&add_user(&store, "ADM001", Role::Admin, None).await);
        let class = store.create_class("CSE", "A").await.unwrap();
        let in_class = add_user(&store, "STU001", Role::Student, Some(class.id)).await;
        let outside = add_user(&store, "STU002", Role::Student, None).await;

        let marks = [
            (&in_class, "2024-01-10"),
            (&in_class, "2024-01-12"),
            (&outside, "2024-01-10"),
        ];
        for (student, day) in marks {
            let dto = mark_dto(student.id, day, AttendanceStatus::Present);
            AttendanceService::mark(&store, &admin, dto).await.unwrap();
        }

        let filters = AttendanceFilterParams {
            student_id: Some(outside.id.into_inner()),
            class_id: Some(class.id.into_inner()),
            ..Default::default()
        };
        assert!(AttendanceService::list_all(&store, &admin, filters).await.unwrap().is_empty());

        let filters = AttendanceFilterParams {
            class_id: Some(class.id.into_inner()),
            start_date: Some(date("2024-01-11")),
            ..Default::default()
        };
        let views = AttendanceService::list_all(&store, &admin, filters).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].date, date("2024-01-12"));
        assert_eq!(views[0].student_name.as_deref(), Some("User STU001"));
        assert_eq!(views[0].marked_by_name.as_deref(), Some("User ADM001"));
    }

    #[tokio::test]
    async fn test_list_all_rejects_inverted_range() {
        let store = MemoryStore::new();
        let admin = Caller::from(&add_user(&store, "ADM001", Role::Admin, None).await);

        let filters = AttendanceFilterParams {
            start_date: Some(date("2024-02-01")),
            end_date: Some(date("2024-01-01")),
            ..Default::default()
        };
        let err = AttendanceService::list_all(&store, &admin, filters).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_list_by_class_empty_class() {
        let store = MemoryStore::new();
        let faculty = Caller::from(&add_user(&store, "FAC001", Role::Faculty, None).await);
        let class = store.create_class("ECE", "B").await.unwrap();

        let views = AttendanceService::list_by_class(&store, &faculty, class.id).await.unwrap();
        assert!(views.is_empty());
    }
}
