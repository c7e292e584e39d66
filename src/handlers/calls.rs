use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use std::sync::Arc;

use super::AppError;
use crate::models::{CallDescriptor, CallId, EmergencyCall};
use crate::services::dispatcher::RankedCandidate;
use crate::services::AppState;

pub async fn list_calls(State(state): State<Arc<AppState>>) -> Json<Vec<EmergencyCall>> {
    Json(state.dispatcher.calls())
}

pub async fn create_call(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CallDescriptor>, JsonRejection>,
) -> Result<Json<EmergencyCall>, AppError> {
    let Json(descriptor) = payload?;
    let call = state.dispatcher.intake_call(descriptor)?;
    Ok(Json(call))
}

pub async fn cancel_call(
    State(state): State<Arc<AppState>>,
    path: Result<Path<CallId>, PathRejection>,
) -> Result<Json<EmergencyCall>, AppError> {
    let Path(call_id) = path?;
    let call = state.dispatcher.cancel_call(call_id)?;
    Ok(Json(call))
}

pub async fn list_candidates(
    State(state): State<Arc<AppState>>,
    path: Result<Path<CallId>, PathRejection>,
) -> Result<Json<Vec<RankedCandidate>>, AppError> {
    let Path(call_id) = path?;
    Ok(Json(state.dispatcher.candidates(call_id)?))
}
