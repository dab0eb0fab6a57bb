use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::classes::controller::{
    assign_class, create_class, delete_class, get_class, get_classes,
};
use crate::state::AppState;

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_classes).post(create_class))
        .route("/assign", post(assign_class))
        .route("/{id}", get(get_class).delete(delete_class))
}
