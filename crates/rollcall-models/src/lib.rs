//! # Rollcall Models
//!
//! Domain models and DTOs for the Rollcall API: database entities, the
//! insert/update shapes the storage layer accepts, and request/response
//! bodies with their validation rules.
//!
//! - [`ids`]: strongly-typed entity IDs
//! - [`value_types`]: the institutional [`UniqueId`]
//! - [`users`]: accounts, roles, login and password reset
//! - [`classes`]: the class registry
//! - [`attendance`]: the attendance ledger
//! - [`leaves`]: leave applications
//!
//! # Example
//!
//! ```ignore
//! use rollcall_models::{Role, UniqueId};
//!
//! let id: UniqueId = "STU001".parse()?;
//! assert!(id.matches_role(Role::Student));
//! ```

pub mod attendance;
pub mod classes;
pub mod ids;
pub mod leaves;
pub mod users;
pub mod value_types;

pub use attendance::{
    AttendanceFilterParams, AttendanceQuery, AttendanceRecord, AttendanceStatus, AttendanceView,
    MarkAttendanceDto, NewAttendance,
};
pub use classes::{AssignClassDto, Class, CreateClassDto};
pub use ids::{AttendanceId, ClassId, LeaveId, UserId};
pub use leaves::{
    ApplyLeaveDto, LeaveApplication, LeaveStatus, LeaveView, NewLeave, ReviewLeaveDto,
};
pub use users::{
    AuthResponse, LoginRequest, MessageResponse, NewUser, RegisterUserDto, ResetPasswordRequest,
    Role, SendCodeRequest, UpdateUserDto, User, UserChanges, UserResponse,
};
pub use value_types::{UniqueId, ValueTypeError};
