pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::careers::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/careers", post(handlers::handle_add_career))
        .route(
            "/api/v1/careers/questions/generate",
            post(handlers::handle_generate_questions),
        )
        .route(
            "/api/v1/careers/:id",
            get(handlers::handle_get_career).put(handlers::handle_update_career),
        )
        .with_state(state)
}
