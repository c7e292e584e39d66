use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::AppError;
use crate::error::DispatchError;
use crate::models::{CallId, DispatchId, DispatchRecord};
use crate::services::dispatcher::DispatchOutcome;
use crate::services::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub call_id: CallId,
}

pub async fn list_dispatches(State(state): State<Arc<AppState>>) -> Json<Vec<DispatchRecord>> {
    Json(state.dispatcher.dispatches())
}

pub async fn dispatch_call(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DispatchRequest>, JsonRejection>,
) -> Result<Json<DispatchOutcome>, AppError> {
    let Json(request) = payload?;
    if request.call_id == 0 {
        return Err(DispatchError::validation("callId", "must be positive").into());
    }
    let outcome = state.dispatcher.dispatch(request.call_id)?;
    Ok(Json(outcome))
}

pub async fn record_arrival(
    State(state): State<Arc<AppState>>,
    path: Result<Path<DispatchId>, PathRejection>,
) -> Result<Json<DispatchRecord>, AppError> {
    let Path(dispatch_id) = path?;
    Ok(Json(state.dispatcher.record_arrival(dispatch_id)?))
}
