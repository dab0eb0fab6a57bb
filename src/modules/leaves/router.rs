use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::modules::leaves::controller::{
    all_leaves, apply_leave, cancel_leave, my_leaves, review_leave,
};
use crate::state::AppState;

pub fn init_leaves_router() -> Router<AppState> {
    Router::new()
        .route("/apply", post(apply_leave))
        .route("/my", get(my_leaves))
        .route("/all", get(all_leaves))
        .route("/update/{leaveId}", put(review_leave))
        .route("/{id}", delete(cancel_leave))
}
