pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::validation::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/validations",
            post(handlers::handle_validate_text),
        )
        .route(
            "/api/v1/validations/upload",
            post(handlers::handle_validate_upload),
        )
        .with_state(state)
}
