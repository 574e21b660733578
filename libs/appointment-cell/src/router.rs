// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/book",
            post(handlers::book_appointment).options(handlers::book_preflight),
        )
        .route("/available-times", post(handlers::get_available_times))
        .route("/user", post(handlers::get_user_appointments))
        .with_state(state)
}
