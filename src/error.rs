use crate::models::{CallId, CallStatus, DispatchId, DispatchStatus};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("call {0} not found")]
    CallNotFound(CallId),
    #[error("dispatch {0} not found")]
    DispatchNotFound(DispatchId),
    #[error("no ambulance available for call {0}")]
    NoAmbulanceAvailable(CallId),
    #[error("cannot {action} call {call_id} in status {status}")]
    InvalidState {
        call_id: CallId,
        status: CallStatus,
        action: &'static str,
    },
    #[error("cannot {action} dispatch {dispatch_id} in status {status}")]
    InvalidDispatchState {
        dispatch_id: DispatchId,
        status: DispatchStatus,
        action: &'static str,
    },
}

impl DispatchError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
