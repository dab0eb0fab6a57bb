use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::attendance::controller::{
    all_attendance, class_attendance, mark_attendance, my_attendance,
};
use crate::state::AppState;

pub fn init_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/mark", post(mark_attendance))
        .route("/my", get(my_attendance))
        .route("/class/{classId}", get(class_attendance))
        .route("/all", get(all_attendance))
}
