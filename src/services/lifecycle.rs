//! Call and dispatch-record state machines.
//!
//! Calls move `pending -> assigned -> en_route -> completed`, with
//! `cancelled` reachable from `pending` or `assigned`. Dispatch records move
//! forward through `dispatched -> arrived -> completed`; `arrived` may be
//! skipped. Terminal states accept nothing.

use chrono::{DateTime, Utc};

use crate::models::{
    AmbulanceId, CallStatus, DispatchId, DispatchRecord, DispatchStatus, EmergencyCall,
};

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("call cannot move from {from} to {to}")]
    Call { from: CallStatus, to: CallStatus },
    #[error("dispatch cannot move from {from} to {to}")]
    Dispatch {
        from: DispatchStatus,
        to: DispatchStatus,
    },
}

impl CallStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CallStatus::Completed | CallStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: CallStatus) -> bool {
        use CallStatus::*;
        matches!(
            (self, next),
            (Pending, Assigned)
                | (Pending, Cancelled)
                | (Assigned, EnRoute)
                | (Assigned, Cancelled)
                | (EnRoute, Completed)
        )
    }
}

impl DispatchStatus {
    pub fn is_terminal(self) -> bool {
        self == DispatchStatus::Completed
    }

    pub fn can_transition_to(self, next: DispatchStatus) -> bool {
        !self.is_terminal() && next > self
    }
}

impl DispatchRecord {
    /// Records without an explicit status are treated as just dispatched.
    pub fn current_status(&self) -> DispatchStatus {
        self.status.unwrap_or(DispatchStatus::Dispatched)
    }
}

pub fn transition_call(call: &mut EmergencyCall, to: CallStatus) -> Result<(), TransitionError> {
    if !call.status.can_transition_to(to) {
        return Err(TransitionError::Call {
            from: call.status,
            to,
        });
    }
    call.status = to;
    Ok(())
}

fn transition_dispatch(record: &mut DispatchRecord, to: DispatchStatus) -> Result<(), TransitionError> {
    let from = record.current_status();
    if !from.can_transition_to(to) {
        return Err(TransitionError::Dispatch { from, to });
    }
    record.status = Some(to);
    Ok(())
}

/// Marks a pending call as assigned and builds its dispatch record.
pub fn assign(
    call: &mut EmergencyCall,
    ambulance_id: AmbulanceId,
    dispatch_id: DispatchId,
    distance_km: Option<f64>,
    now: DateTime<Utc>,
) -> Result<DispatchRecord, TransitionError> {
    transition_call(call, CallStatus::Assigned)?;
    call.assigned_ambulance_id = Some(ambulance_id);

    Ok(DispatchRecord {
        id: dispatch_id,
        call_id: call.id,
        ambulance_id,
        dispatch_time: now,
        arrival_time: None,
        completion_time: None,
        distance_traveled_km: distance_km,
        response_time_seconds: None,
        status: Some(DispatchStatus::Dispatched),
    })
}

/// Whole seconds between dispatch and arrival, halves rounded up.
pub fn response_time_seconds(dispatch_time: DateTime<Utc>, arrival_time: DateTime<Utc>) -> i64 {
    let millis = (arrival_time - dispatch_time).num_milliseconds();
    (millis as f64 / 1000.0 + 0.5).floor() as i64
}

pub fn record_arrival(record: &mut DispatchRecord, now: DateTime<Utc>) -> Result<(), TransitionError> {
    transition_dispatch(record, DispatchStatus::Arrived)?;
    record.arrival_time = Some(now);
    record.response_time_seconds = Some(response_time_seconds(record.dispatch_time, now));
    Ok(())
}

/// Completes the record. An arrival recorded earlier is kept; otherwise
/// arrival defaults to `now`.
pub fn complete_dispatch(record: &mut DispatchRecord, now: DateTime<Utc>) -> Result<(), TransitionError> {
    transition_dispatch(record, DispatchStatus::Completed)?;
    let arrival = *record.arrival_time.get_or_insert(now);
    record.completion_time = Some(now);
    record.response_time_seconds = Some(response_time_seconds(record.dispatch_time, arrival));
    Ok(())
}

/// Closes a record whose call was cancelled. No arrival is inferred.
pub fn close_dispatch(record: &mut DispatchRecord, now: DateTime<Utc>) -> Result<(), TransitionError> {
    transition_dispatch(record, DispatchStatus::Completed)?;
    record.completion_time = Some(now);
    Ok(())
}

/// One step of the simulated progression: `assigned -> en_route`,
/// `en_route -> completed`. Returns the new status when the call moved.
pub fn progress_call(call: &mut EmergencyCall) -> Option<CallStatus> {
    let next = match call.status {
        CallStatus::Assigned => CallStatus::EnRoute,
        CallStatus::EnRoute => CallStatus::Completed,
        _ => return None,
    };
    transition_call(call, next).ok().map(|_| next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, Severity};
    use chrono::Duration;

    fn pending_call() -> EmergencyCall {
        EmergencyCall {
            id: 3,
            caller_phone: None,
            location: Coordinate { lat: 5.6, lng: -0.19 },
            address: None,
            severity_level: Severity::SERIOUS,
            call_time: Utc::now(),
            status: CallStatus::Pending,
            assigned_ambulance_id: None,
        }
    }

    #[test]
    fn test_call_transition_table() {
        use CallStatus::*;
        assert!(Pending.can_transition_to(Assigned));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Assigned.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(EnRoute));
        assert!(!EnRoute.can_transition_to(Cancelled));
        for terminal in [Completed, Cancelled] {
            for next in [Pending, Assigned, EnRoute, Completed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_dispatch_transitions_are_monotonic() {
        use DispatchStatus::*;
        assert!(Dispatched.can_transition_to(Arrived));
        assert!(Dispatched.can_transition_to(Completed));
        assert!(Arrived.can_transition_to(Completed));
        assert!(!Arrived.can_transition_to(Dispatched));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn test_assign_sets_call_and_builds_record() {
        let mut call = pending_call();
        let now = Utc::now();
        let record = assign(&mut call, 9, 1, Some(1.2), now).unwrap();
        assert_eq!(call.status, CallStatus::Assigned);
        assert_eq!(call.assigned_ambulance_id, Some(9));
        assert_eq!(record.call_id, 3);
        assert_eq!(record.ambulance_id, 9);
        assert_eq!(record.dispatch_time, now);
        assert_eq!(record.status, Some(DispatchStatus::Dispatched));
        assert!(record.is_active());
    }

    #[test]
    fn test_assign_rejects_non_pending() {
        let mut call = pending_call();
        call.status = CallStatus::Assigned;
        let err = assign(&mut call, 9, 1, None, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Call {
                from: CallStatus::Assigned,
                to: CallStatus::Assigned
            }
        );
    }

    #[test]
    fn test_response_time_rounding() {
        let t0 = Utc::now();
        assert_eq!(response_time_seconds(t0, t0 + Duration::milliseconds(125_000)), 125);
        assert_eq!(response_time_seconds(t0, t0 + Duration::milliseconds(125_499)), 125);
        assert_eq!(response_time_seconds(t0, t0 + Duration::milliseconds(125_500)), 126);
    }

    #[test]
    fn test_completion_defaults_arrival_to_now() {
        let mut call = pending_call();
        let t0 = Utc::now();
        let mut record = assign(&mut call, 1, 1, None, t0).unwrap();
        let t1 = t0 + Duration::seconds(90);
        complete_dispatch(&mut record, t1).unwrap();
        assert_eq!(record.arrival_time, Some(t1));
        assert_eq!(record.completion_time, Some(t1));
        assert_eq!(record.response_time_seconds, Some(90));
        assert_eq!(record.status, Some(DispatchStatus::Completed));
        assert!(complete_dispatch(&mut record, t1).is_err());
    }

    #[test]
    fn test_completion_keeps_recorded_arrival() {
        let mut call = pending_call();
        let t0 = Utc::now();
        let mut record = assign(&mut call, 1, 1, None, t0).unwrap();
        record_arrival(&mut record, t0 + Duration::seconds(40)).unwrap();
        complete_dispatch(&mut record, t0 + Duration::seconds(600)).unwrap();
        assert_eq!(record.response_time_seconds, Some(40));
        assert_eq!(record.arrival_time, Some(t0 + Duration::seconds(40)));
    }

    #[test]
    fn test_progress_sequence() {
        let mut call = pending_call();
        assert_eq!(progress_call(&mut call), None);
        call.status = CallStatus::Assigned;
        assert_eq!(progress_call(&mut call), Some(CallStatus::EnRoute));
        assert_eq!(progress_call(&mut call), Some(CallStatus::Completed));
        assert_eq!(progress_call(&mut call), None);
    }
}
