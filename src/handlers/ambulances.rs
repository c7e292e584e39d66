use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use super::AppError;
use crate::models::{Ambulance, AmbulanceDescriptor};
use crate::services::AppState;

pub async fn list_ambulances(State(state): State<Arc<AppState>>) -> Json<Vec<Ambulance>> {
    Json(state.dispatcher.ambulances())
}

pub async fn upsert_ambulance(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AmbulanceDescriptor>, JsonRejection>,
) -> Result<Json<Ambulance>, AppError> {
    let Json(descriptor) = payload?;
    let saved = state.dispatcher.upsert_ambulance(descriptor)?;
    Ok(Json(saved))
}
