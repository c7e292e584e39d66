use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use super::lifecycle;
use super::notification::{Event, EventBus, Subscription};
use super::scoring::ScoreBreakdown;
use super::selector::{rank_candidates, select_best};
use super::store::{Store, Upsert};
use crate::error::{DispatchError, Result};
use crate::models::{
    Ambulance, AmbulanceDescriptor, CallDescriptor, CallId, CallStatus, DispatchId,
    DispatchRecord, EmergencyCall,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub dispatch: DispatchRecord,
    pub ambulance: Ambulance,
    pub score: ScoreBreakdown,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub ambulance: Ambulance,
    pub score: ScoreBreakdown,
}

/// Orchestrates intake, fleet updates, assignment and cancellation over an
/// owned store. All mutations run under a single lock and publish their
/// events before the lock is released.
pub struct Dispatcher {
    store: Mutex<Store>,
    events: EventBus,
}

impl Dispatcher {
    pub fn new(events: EventBus) -> Self {
        Self::with_store(Store::new(), events)
    }

    pub fn with_store(store: Store, events: EventBus) -> Self {
        Self {
            store: Mutex::new(store),
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    /// Runs `f` with exclusive access to the store and the bus.
    pub fn with_store_mut<R>(&self, f: impl FnOnce(&mut Store, &EventBus) -> R) -> R {
        let mut store = self.store.lock();
        f(&mut store, &self.events)
    }

    pub fn seed_demo_fleet(&self) -> Vec<Ambulance> {
        let seeded = self.store.lock().seed_demo_fleet(Utc::now());
        if !seeded.is_empty() {
            tracing::info!(count = seeded.len(), "seeded demo fleet");
        }
        seeded
    }

    pub fn ambulances(&self) -> Vec<Ambulance> {
        self.store.lock().ambulances().to_vec()
    }

    pub fn calls(&self) -> Vec<EmergencyCall> {
        self.store.lock().calls().to_vec()
    }

    pub fn dispatches(&self) -> Vec<DispatchRecord> {
        self.store.lock().dispatches().to_vec()
    }

    pub fn call(&self, id: CallId) -> Option<EmergencyCall> {
        self.store.lock().call(id).cloned()
    }

    pub fn dispatch_record(&self, id: DispatchId) -> Option<DispatchRecord> {
        self.store.lock().dispatch(id).cloned()
    }

    pub fn upsert_ambulance(&self, descriptor: AmbulanceDescriptor) -> Result<Ambulance> {
        let mut store = self.store.lock();
        let (ambulance, kind) = store.upsert_ambulance(descriptor, Utc::now())?;

        tracing::info!(
            ambulance_id = ambulance.id,
            vehicle_id = %ambulance.vehicle_id,
            status = %ambulance.status,
            created = (kind == Upsert::Created),
            "fleet updated"
        );
        self.events.publish(match kind {
            Upsert::Created => Event::AmbulanceCreated {
                ambulance: ambulance.clone(),
            },
            Upsert::Updated => Event::AmbulanceUpdated {
                ambulance: ambulance.clone(),
            },
        });
        Ok(ambulance)
    }

    pub fn intake_call(&self, descriptor: CallDescriptor) -> Result<EmergencyCall> {
        self.intake_call_at(descriptor, Utc::now())
    }

    pub fn intake_call_at(&self, descriptor: CallDescriptor, now: DateTime<Utc>) -> Result<EmergencyCall> {
        descriptor.validate()?;
        let mut store = self.store.lock();
        let id = store.next_call_id();
        let call = store.insert_call(descriptor.into_call(id, now)?).clone();

        tracing::info!(
            call_id = call.id,
            severity = call.severity_level.level(),
            lat = call.location.lat,
            lng = call.location.lng,
            "call received"
        );
        self.events.publish(Event::CallCreated { call: call.clone() });
        Ok(call)
    }

    pub fn dispatch(&self, call_id: CallId) -> Result<DispatchOutcome> {
        self.dispatch_at(call_id, Utc::now())
    }

    /// Selects the best ambulance for a pending call and applies the
    /// assignment. Nothing changes and nothing is published on failure.
    pub fn dispatch_at(&self, call_id: CallId, now: DateTime<Utc>) -> Result<DispatchOutcome> {
        let mut store = self.store.lock();

        let call = store
            .call(call_id)
            .ok_or(DispatchError::CallNotFound(call_id))?;
        if call.status != CallStatus::Pending {
            return Err(DispatchError::InvalidState {
                call_id,
                status: call.status,
                action: "dispatch",
            });
        }

        let (ambulance, score) = match select_best(store.ambulances(), call) {
            Some(best) => (best.ambulance.clone(), best.score),
            None => {
                tracing::warn!(call_id, "no ambulance available");
                return Err(DispatchError::NoAmbulanceAvailable(call_id));
            }
        };

        let dispatch_id = store.next_dispatch_id();
        let call = store
            .call_mut(call_id)
            .ok_or(DispatchError::CallNotFound(call_id))?;
        let status = call.status;
        let record = lifecycle::assign(call, ambulance.id, dispatch_id, Some(score.distance_km), now)
            .map_err(|_| DispatchError::InvalidState {
                call_id,
                status,
                action: "dispatch",
            })?;
        let call = call.clone();
        let dispatch = store.insert_dispatch(record).clone();

        tracing::info!(
            call_id,
            dispatch_id,
            ambulance_id = ambulance.id,
            vehicle_id = %ambulance.vehicle_id,
            score = score.total,
            distance_km = score.distance_km,
            "ambulance dispatched"
        );
        self.events.publish(Event::CallUpdated { call });
        self.events.publish(Event::DispatchCreated {
            dispatch: dispatch.clone(),
        });

        Ok(DispatchOutcome {
            dispatch,
            ambulance,
            score,
        })
    }

    /// Every eligible ambulance for the call with its score, best first.
    pub fn candidates(&self, call_id: CallId) -> Result<Vec<RankedCandidate>> {
        let store = self.store.lock();
        let call = store
            .call(call_id)
            .ok_or(DispatchError::CallNotFound(call_id))?;

        let ranked = rank_candidates(store.ambulances(), call);
        for candidate in &ranked {
            tracing::debug!(
                call_id,
                ambulance_id = candidate.ambulance.id,
                score = candidate.score.total,
                "candidate scored"
            );
        }
        Ok(ranked
            .into_iter()
            .map(|c| RankedCandidate {
                ambulance: c.ambulance.clone(),
                score: c.score,
            })
            .collect())
    }

    pub fn cancel_call(&self, call_id: CallId) -> Result<EmergencyCall> {
        self.cancel_call_at(call_id, Utc::now())
    }

    /// Cancels a pending or assigned call, closing its active dispatch
    /// record if it has one.
    pub fn cancel_call_at(&self, call_id: CallId, now: DateTime<Utc>) -> Result<EmergencyCall> {
        let mut store = self.store.lock();

        let call = store
            .call_mut(call_id)
            .ok_or(DispatchError::CallNotFound(call_id))?;
        let status = call.status;
        lifecycle::transition_call(call, CallStatus::Cancelled).map_err(|_| {
            DispatchError::InvalidState {
                call_id,
                status,
                action: "cancel",
            }
        })?;
        let call = call.clone();

        let closed = match store.active_dispatch_for_call_mut(call_id) {
            Some(record) => lifecycle::close_dispatch(record, now)
                .ok()
                .map(|_| record.clone()),
            None => None,
        };

        tracing::info!(call_id, previous = %status, "call cancelled");
        self.events.publish(Event::CallUpdated { call: call.clone() });
        if let Some(dispatch) = closed {
            self.events.publish(Event::DispatchUpdated { dispatch });
        }
        Ok(call)
    }

    pub fn record_arrival(&self, dispatch_id: DispatchId) -> Result<DispatchRecord> {
        self.record_arrival_at(dispatch_id, Utc::now())
    }

    pub fn record_arrival_at(&self, dispatch_id: DispatchId, now: DateTime<Utc>) -> Result<DispatchRecord> {
        let mut store = self.store.lock();

        let record = store
            .dispatch_mut(dispatch_id)
            .ok_or(DispatchError::DispatchNotFound(dispatch_id))?;
        let call_id = record.call_id;
        let status = record.current_status();
        lifecycle::record_arrival(record, now).map_err(|_| DispatchError::InvalidDispatchState {
            dispatch_id,
            status,
            action: "record arrival for",
        })?;
        let record = record.clone();

        tracing::info!(
            dispatch_id,
            call_id,
            response_time_seconds = record.response_time_seconds,
            "ambulance arrived"
        );
        self.events.publish(Event::DispatchUpdated {
            dispatch: record.clone(),
        });
        Ok(record)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}
