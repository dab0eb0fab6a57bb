use rollcall_core::{ErrorKind, ErrorResponse};
use rollcall_models::{
    ApplyLeaveDto, AssignClassDto, AttendanceRecord, AttendanceStatus, AttendanceView,
    AuthResponse, Class, CreateClassDto, LeaveApplication, LeaveStatus, LeaveView, LoginRequest,
    MarkAttendanceDto, MessageResponse, RegisterUserDto, ResetPasswordRequest, ReviewLeaveDto,
    Role, SendCodeRequest, UpdateUserDto, UserResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::users::controller::login,
        crate::modules::users::controller::register_user,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::send_code,
        crate::modules::users::controller::reset_password,
        crate::modules::setup::controller::register_admin,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::classes::controller::assign_class,
        crate::modules::attendance::controller::mark_attendance,
        crate::modules::attendance::controller::my_attendance,
        crate::modules::attendance::controller::class_attendance,
        crate::modules::attendance::controller::all_attendance,
        crate::modules::leaves::controller::apply_leave,
        crate::modules::leaves::controller::my_leaves,
        crate::modules::leaves::controller::all_leaves,
        crate::modules::leaves::controller::review_leave,
        crate::modules::leaves::controller::cancel_leave,
    ),
    components(
        schemas(
            Role,
            UserResponse,
            RegisterUserDto,
            UpdateUserDto,
            LoginRequest,
            AuthResponse,
            SendCodeRequest,
            ResetPasswordRequest,
            MessageResponse,
            Class,
            CreateClassDto,
            AssignClassDto,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceView,
            MarkAttendanceDto,
            LeaveStatus,
            LeaveApplication,
            LeaveView,
            ApplyLeaveDto,
            ReviewLeaveDto,
            ErrorKind,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Login, user administration and password reset"),
        (name = "Setup", description = "One-time administrator bootstrap"),
        (name = "Classes", description = "Class registry and class assignment"),
        (name = "Attendance", description = "Daily attendance ledger"),
        (name = "Leaves", description = "Leave applications and review")
    ),
    info(
        title = "Rollcall API",
        version = "0.1.0",
        description = "College attendance and leave tracking: admins manage accounts and classes, faculty mark attendance and review leave, students follow their own records.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
