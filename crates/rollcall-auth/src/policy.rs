//! The authorization policy.
//!
//! Every role check in the API goes through [`allow`], a pure function of the
//! freshly resolved [`Caller`], the [`Operation`] being attempted and, where
//! ownership or state matters, the persisted [`Target`].
//!
//! | Operation | Allowed for |
//! |---|---|
//! | register, list, update, delete users | admin |
//! | list all attendance | admin |
//! | create, delete classes; assign to class | admin |
//! | mark attendance, class attendance | faculty, admin |
//! | list all leaves, review leave | faculty, admin |
//! | apply for leave | student |
//! | own attendance, own leaves | the caller the records belong to (any role) |
//! | cancel leave | the owning student, while the leave is pending |
//! | profile, read classes | any authenticated caller |

use std::fmt;

use rollcall_core::AppError;
use rollcall_models::{ClassId, LeaveStatus, Role, User, UserId};

/// The identity behind a request, resolved from storage for that request
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub role: Role,
    pub class_id: Option<ClassId>,
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            class_id: user.class_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RegisterUser,
    ListUsers,
    UpdateUser,
    DeleteUser,
    ViewProfile,
    MarkAttendance,
    ViewOwnAttendance,
    ListClassAttendance,
    ListAllAttendance,
    ApplyLeave,
    ViewOwnLeaves,
    ListAllLeaves,
    ReviewLeave,
    CancelLeave,
    CreateClass,
    ReadClasses,
    DeleteClass,
    AssignClass,
}

impl Operation {
    pub const ALL: [Operation; 18] = [
        Operation::RegisterUser,
        Operation::ListUsers,
        Operation::UpdateUser,
        Operation::DeleteUser,
        Operation::ViewProfile,
        Operation::MarkAttendance,
        Operation::ViewOwnAttendance,
        Operation::ListClassAttendance,
        Operation::ListAllAttendance,
        Operation::ApplyLeave,
        Operation::ViewOwnLeaves,
        Operation::ListAllLeaves,
        Operation::ReviewLeave,
        Operation::CancelLeave,
        Operation::CreateClass,
        Operation::ReadClasses,
        Operation::DeleteClass,
        Operation::AssignClass,
    ];

    fn describe(self) -> &'static str {
        match self {
            Operation::RegisterUser => "register users",
            Operation::ListUsers => "list users",
            Operation::UpdateUser => "update users",
            Operation::DeleteUser => "delete users",
            Operation::ViewProfile => "view profile",
            Operation::MarkAttendance => "mark attendance",
            Operation::ViewOwnAttendance => "view this attendance",
            Operation::ListClassAttendance => "view class attendance",
            Operation::ListAllAttendance => "view all attendance",
            Operation::ApplyLeave => "apply for leave",
            Operation::ViewOwnLeaves => "view these leave applications",
            Operation::ListAllLeaves => "view all leave applications",
            Operation::ReviewLeave => "review leave applications",
            Operation::CancelLeave => "cancel this leave application",
            Operation::CreateClass => "create classes",
            Operation::ReadClasses => "view classes",
            Operation::DeleteClass => "delete classes",
            Operation::AssignClass => "assign classes",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// The persisted state an ownership-sensitive operation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    None,
    /// Records belonging to this student.
    Student(UserId),
    Leave {
        student_id: UserId,
        status: LeaveStatus,
    },
}

/// Decides whether `caller` may perform `operation` on `target`.
///
/// Ownership operations require the matching [`Target`] variant; any other
/// combination is denied.
pub fn allow(caller: &Caller, operation: Operation, target: &Target) -> bool {
    use Operation::*;

    let is_admin = caller.role == Role::Admin;
    let is_staff = matches!(caller.role, Role::Admin | Role::Faculty);

    match (operation, target) {
        (
            RegisterUser | ListUsers | UpdateUser | DeleteUser | ListAllAttendance | CreateClass
            | DeleteClass | AssignClass,
            _,
        ) => is_admin,
        (MarkAttendance | ListClassAttendance | ListAllLeaves | ReviewLeave, _) => is_staff,
        (ApplyLeave, _) => caller.role == Role::Student,
        (ViewOwnAttendance | ViewOwnLeaves, Target::Student(student_id)) => {
            caller.id == *student_id
        }
        (CancelLeave, Target::Leave { student_id, status }) => {
            caller.id == *student_id && *status == LeaveStatus::Pending
        }
        (ViewProfile | ReadClasses, _) => true,
        _ => false,
    }
}

/// [`allow`], failing with `Forbidden` on denial.
pub fn authorize(caller: &Caller, operation: Operation, target: &Target) -> Result<(), AppError> {
    if allow(caller, operation, target) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Role '{}' is not permitted to {}",
            caller.role, operation
        )))
    }
}
