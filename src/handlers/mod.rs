pub mod ambulances;
pub mod calls;
pub mod dispatch;
pub mod events;
pub mod health;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::DispatchError;
use crate::services::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Fleet
        .route("/api/ambulances", get(ambulances::list_ambulances).post(ambulances::upsert_ambulance))
        // Calls
        .route("/api/calls", get(calls::list_calls).post(calls::create_call))
        .route("/api/calls/:id/cancel", post(calls::cancel_call))
        .route("/api/calls/:id/candidates", get(calls::list_candidates))
        // Dispatch
        .route("/api/dispatch", get(dispatch::list_dispatches).post(dispatch::dispatch_call))
        .route("/api/dispatch/:id/arrive", post(dispatch::record_arrival))
        // Events
        .route("/api/events", get(events::stream_events))
        // Health
        .route("/health", get(health::health_check))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug)]
pub enum AppError {
    Dispatch(DispatchError),
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Dispatch(err) => match err {
                DispatchError::Validation { .. } => StatusCode::BAD_REQUEST,
                DispatchError::CallNotFound(_) | DispatchError::DispatchNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                DispatchError::NoAmbulanceAvailable(_)
                | DispatchError::InvalidState { .. }
                | DispatchError::InvalidDispatchState { .. } => StatusCode::CONFLICT,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Dispatch(err) => err.to_string(),
            AppError::BadRequest(message) => message,
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        AppError::Dispatch(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid payload: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(format!("Invalid path: {}", rejection.body_text()))
    }
}
