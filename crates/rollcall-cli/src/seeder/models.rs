//! Seed records and seeding configuration.

use chrono::NaiveDate;
use rollcall_models::{AttendanceStatus, ClassId, Role, UserId};

/// Seeded accounts use this email domain; `clear-seed` removes exactly
/// those accounts.
pub const SEED_EMAIL_DOMAIN: &str = "example.com";

/// Seeded class names start with this prefix.
pub const SEED_CLASS_PREFIX: &str = "Seeded";

pub struct ClassSeed {
    pub id: ClassId,
    pub name: String,
    pub section: String,
}

pub struct UserSeed {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub unique_id: String,
    pub role: Role,
    pub class_id: Option<ClassId>,
    pub password_hash: String,
}

pub struct AttendanceSeed {
    pub student_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: UserId,
}

/// People per seeded class.
#[derive(Clone)]
pub struct PeoplePerClass {
    pub faculty: usize,
    pub students: usize,
}

impl Default for PeoplePerClass {
    fn default() -> Self {
        Self {
            faculty: 2,
            students: 30,
        }
    }
}

#[derive(Clone)]
pub struct SeedConfig {
    pub num_classes: usize,
    pub people_per_class: PeoplePerClass,
    /// School days of attendance history, counted back from today.
    pub attendance_days: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            num_classes: 4,
            people_per_class: PeoplePerClass::default(),
            attendance_days: 10,
        }
    }
}

impl SeedConfig {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            ..Default::default()
        }
    }

    pub fn with_people(mut self, people: PeoplePerClass) -> Self {
        self.people_per_class = people;
        self
    }

    pub fn with_attendance_days(mut self, days: usize) -> Self {
        self.attendance_days = days;
        self
    }

    pub fn total_students(&self) -> usize {
        self.num_classes * self.people_per_class.students
    }

    pub fn total_attendance_records(&self) -> usize {
        self.total_students() * self.attendance_days
    }
}
