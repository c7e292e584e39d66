use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::services::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "ambulances": state.dispatcher.ambulances().len(),
        "subscribers": state.dispatcher.events().subscriber_count(),
    }))
}
