pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::export::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(handlers::handle_catalog))
        .route("/api/v1/resumes/sample", get(handlers::handle_sample))
        .route("/api/v1/resumes/preview", post(handlers::handle_preview))
        .route("/api/v1/resumes/pdf", post(handlers::handle_pdf))
        .route("/api/v1/resumes/docx", post(handlers::handle_docx))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
