pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::scouting::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/value-propositions",
            get(handlers::handle_list_value_propositions),
        )
        .route(
            "/api/v1/value-propositions/test",
            post(handlers::handle_smoke_test),
        )
        .route(
            "/api/v1/value-propositions/test-sheet",
            post(handlers::handle_sheet_test),
        )
        .route(
            "/api/v1/value-propositions/batch",
            post(handlers::handle_batch),
        )
        .route(
            "/api/v1/value-propositions/batch/:run_id",
            get(handlers::handle_batch_status),
        )
        .with_state(state)
}
