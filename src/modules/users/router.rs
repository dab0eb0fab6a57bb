use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::middleware::rate_limit::auth_rate_limit;
use crate::modules::users::controller::{
    delete_user, get_profile, get_users, login, register_user, reset_password, send_code,
    update_user,
};
use crate::state::AppState;

pub fn init_users_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(login))
        .route("/send-code", post(send_code))
        .route("/reset-password", post(reset_password))
        .route_layer(middleware::from_fn_with_state(state, auth_rate_limit));

    Router::new()
        .route("/", get(get_users).post(register_user))
        .route("/profile", get(get_profile))
        .route("/{id}", put(update_user).delete(delete_user))
        .merge(public)
}
