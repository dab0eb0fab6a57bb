use axum::{Router, middleware, routing::post};

use crate::middleware::rate_limit::auth_rate_limit;
use crate::modules::setup::controller::register_admin;
use crate::state::AppState;

pub fn init_setup_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register-admin", post(register_admin))
        .route_layer(middleware::from_fn_with_state(state, auth_rate_limit))
}
