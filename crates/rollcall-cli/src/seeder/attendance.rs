//! Attendance history seeding.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use rand::Rng;
use rayon::prelude::*;
use rollcall_models::{AttendanceId, AttendanceStatus, ClassId, Role, UserId};
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Instant;

use super::models::{AttendanceSeed, UserSeed};

/// The `days` most recent weekdays up to and including `today`, newest first.
pub fn school_days(today: NaiveDate, days: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(days);
    let mut date = today;
    while dates.len() < days {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(date);
        }
        date -= Duration::days(1);
    }
    dates
}

/// 85% present, 10% absent, 5% on leave.
fn random_status<R: Rng>(rng: &mut R) -> AttendanceStatus {
    match rng.gen_range(0..100) {
        0..85 => AttendanceStatus::Present,
        85..95 => AttendanceStatus::Absent,
        _ => AttendanceStatus::Leave,
    }
}

/// One record per student per date, marked by the first faculty member of
/// the student's class. Students in classes without faculty are skipped.
pub fn generate_attendance(users: &[UserSeed], dates: &[NaiveDate]) -> Vec<AttendanceSeed> {
    let mut markers: HashMap<ClassId, UserId> = HashMap::new();
    for user in users.iter().filter(|u| u.role == Role::Faculty) {
        if let Some(class_id) = user.class_id {
            markers.entry(class_id).or_insert(user.id);
        }
    }

    users
        .par_iter()
        .filter(|u| u.role == Role::Student)
        .filter_map(|student| {
            let marker = student.class_id.and_then(|id| markers.get(&id).copied())?;
            let mut rng = rand::thread_rng();
            let records = dates
                .iter()
                .map(|&date| AttendanceSeed {
                    student_id: student.id,
                    date,
                    status: random_status(&mut rng),
                    marked_by: marker,
                })
                .collect::<Vec<_>>();
            Some(records)
        })
        .flatten()
        .collect()
}

pub async fn seed_attendance(
    db: &PgPool,
    users: &[UserSeed],
    days: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📋 Seeding {} days of attendance...", days);

    let dates = school_days(Local::now().date_naive(), days);
    let records = generate_attendance(users, &dates);
    insert_attendance_batch(db, &records).await?;

    println!(
        "   ✓ Inserted {} attendance records in {:?}",
        records.len(),
        start_time.elapsed()
    );

    Ok(records.len())
}

async fn insert_attendance_batch(
    db: &PgPool,
    records: &[AttendanceSeed],
) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    // 5 params per record
    const BATCH_SIZE: usize = 1000;

    for chunk in records.chunks(BATCH_SIZE) {
        let mut query = String::from(
            "INSERT INTO attendance (id, student_id, date, status, marked_by) VALUES ",
        );
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 5;
            query.push_str(&format!(
                "(${}, ${}, ${}, ${}, ${})",
                p + 1,
                p + 2,
                p + 3,
                p + 4,
                p + 5
            ));
        }
        query.push_str(" ON CONFLICT (student_id, date) DO NOTHING");

        let mut q = sqlx::query(&query);
        for record in chunk {
            q = q
                .bind(AttendanceId::new())
                .bind(record.student_id)
                .bind(record.date)
                .bind(record.status)
                .bind(record.marked_by);
        }
        q.execute(&mut *tx).await?;
    }

    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeder::models::PeoplePerClass;
    use crate::seeder::users::generate_class_users;

    #[test]
    fn test_school_days_skip_weekends() {
        // 2026-10-18 is a Sunday.
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let days = school_days(today, 6);

        assert_eq!(days.len(), 6);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        assert_eq!(days[5], NaiveDate::from_ymd_opt(2026, 10, 9).unwrap());
        assert!(
            days.iter()
                .all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        );
    }

    #[test]
    fn test_generated_attendance_is_marked_by_class_faculty() {
        let classes = vec![ClassId::new(), ClassId::new()];
        let people = PeoplePerClass {
            faculty: 1,
            students: 4,
        };
        let users = generate_class_users(&classes, &people, "hash");
        let dates = school_days(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), 3);

        let records = generate_attendance(&users, &dates);
        assert_eq!(records.len(), 2 * 4 * 3);

        let by_id: HashMap<UserId, &UserSeed> = users.iter().map(|u| (u.id, u)).collect();
        for record in &records {
            let student = by_id[&record.student_id];
            let marker = by_id[&record.marked_by];
            assert_eq!(student.role, Role::Student);
            assert_eq!(marker.role, Role::Faculty);
            assert_eq!(student.class_id, marker.class_id);
        }
    }

    #[test]
    fn test_classes_without_faculty_are_skipped() {
        let classes = vec![ClassId::new()];
        let people = PeoplePerClass {
            faculty: 0,
            students: 3,
        };
        let users = generate_class_users(&classes, &people, "hash");
        let dates = school_days(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), 2);
        assert!(generate_attendance(&users, &dates).is_empty());
    }
}
