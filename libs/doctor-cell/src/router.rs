use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_doctors)
                .post(handlers::doctors_webhook)
                .options(handlers::doctors_preflight),
        )
        .with_state(state)
}
