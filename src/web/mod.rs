//! HTTP surface: routing and the mapping from `AppError` to responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use log::error;

use crate::{error::AppError, AppState};

pub mod handlers;
pub mod page;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/generate", post(handlers::generate))
        .route(
            "/qr/{id}",
            get(handlers::get_qr_code)
                .put(handlers::update_label)
                .delete(handlers::delete_qr_code),
        )
        .route("/health", get(handlers::health))
        .with_state(state)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "QR code not found").into_response(),
            AppError::Internal(err) => {
                error!("Request failed: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
