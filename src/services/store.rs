use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    Ambulance, AmbulanceDescriptor, AmbulanceId, AmbulanceStatus, CallId, Coordinate,
    DispatchId, DispatchRecord, EmergencyCall, EquipmentLevel,
};

/// Accra, Ghana. Centre of the demo fleet and fallback for sample calls.
pub const BASE_LOCATION: Coordinate = Coordinate {
    lat: 5.6037,
    lng: -0.1870,
};

#[derive(Debug, Clone)]
struct IdSequence(u64);

impl IdSequence {
    fn new() -> Self {
        Self(1)
    }

    fn next(&mut self) -> u64 {
        let id = self.0;
        self.0 = self.0.saturating_add(1);
        id
    }

    /// Keeps future ids clear of an externally chosen one.
    fn observe(&mut self, id: u64) {
        if id >= self.0 {
            self.0 = id.saturating_add(1);
        }
    }
}

/// Owned registry of ambulances, calls and dispatch records. Collections
/// keep insertion order; entities reference each other by id only.
#[derive(Debug, Clone)]
pub struct Store {
    ambulances: Vec<Ambulance>,
    calls: Vec<EmergencyCall>,
    dispatches: Vec<DispatchRecord>,
    ambulance_ids: IdSequence,
    call_ids: IdSequence,
    dispatch_ids: IdSequence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

impl Store {
    pub fn new() -> Self {
        Self {
            ambulances: Vec::new(),
            calls: Vec::new(),
            dispatches: Vec::new(),
            ambulance_ids: IdSequence::new(),
            call_ids: IdSequence::new(),
            dispatch_ids: IdSequence::new(),
        }
    }

    pub fn ambulances(&self) -> &[Ambulance] {
        &self.ambulances
    }

    pub fn ambulances_mut(&mut self) -> &mut [Ambulance] {
        &mut self.ambulances
    }

    pub fn calls(&self) -> &[EmergencyCall] {
        &self.calls
    }

    pub fn dispatches(&self) -> &[DispatchRecord] {
        &self.dispatches
    }

    pub fn ambulance(&self, id: AmbulanceId) -> Option<&Ambulance> {
        self.ambulances.iter().find(|a| a.id == id)
    }

    pub fn call(&self, id: CallId) -> Option<&EmergencyCall> {
        self.calls.iter().find(|c| c.id == id)
    }

    pub fn call_mut(&mut self, id: CallId) -> Option<&mut EmergencyCall> {
        self.calls.iter_mut().find(|c| c.id == id)
    }

    pub fn calls_mut(&mut self) -> &mut [EmergencyCall] {
        &mut self.calls
    }

    pub fn dispatch(&self, id: DispatchId) -> Option<&DispatchRecord> {
        self.dispatches.iter().find(|d| d.id == id)
    }

    pub fn dispatch_mut(&mut self, id: DispatchId) -> Option<&mut DispatchRecord> {
        self.dispatches.iter_mut().find(|d| d.id == id)
    }

    /// The non-terminal dispatch record serving `call_id`, if any.
    pub fn active_dispatch_for_call_mut(&mut self, call_id: CallId) -> Option<&mut DispatchRecord> {
        self.dispatches
            .iter_mut()
            .find(|d| d.call_id == call_id && d.is_active())
    }

    /// Replaces the ambulance with the descriptor's id, or creates it when
    /// the id is absent or unknown.
    pub fn upsert_ambulance(
        &mut self,
        descriptor: AmbulanceDescriptor,
        now: DateTime<Utc>,
    ) -> Result<(Ambulance, Upsert)> {
        descriptor.validate()?;

        if let Some(id) = descriptor.id {
            if let Some(slot) = self.ambulances.iter_mut().find(|a| a.id == id) {
                *slot = descriptor.into_ambulance(id, now)?;
                return Ok((slot.clone(), Upsert::Updated));
            }
        }

        let id = match descriptor.id {
            Some(id) => {
                self.ambulance_ids.observe(id);
                id
            }
            None => self.ambulance_ids.next(),
        };
        let ambulance = descriptor.into_ambulance(id, now)?;
        self.ambulances.push(ambulance.clone());
        Ok((ambulance, Upsert::Created))
    }

    pub fn next_call_id(&mut self) -> CallId {
        self.call_ids.next()
    }

    pub fn insert_call(&mut self, call: EmergencyCall) -> &EmergencyCall {
        self.call_ids.observe(call.id);
        self.calls.push(call);
        &self.calls[self.calls.len() - 1]
    }

    pub fn next_dispatch_id(&mut self) -> DispatchId {
        self.dispatch_ids.next()
    }

    pub fn insert_dispatch(&mut self, record: DispatchRecord) -> &DispatchRecord {
        self.dispatch_ids.observe(record.id);
        self.dispatches.push(record);
        &self.dispatches[self.dispatches.len() - 1]
    }

    /// Seeds the five-vehicle demo fleet around Accra. Does nothing when
    /// the fleet already has members. Returns the ambulances added.
    pub fn seed_demo_fleet(&mut self, now: DateTime<Utc>) -> Vec<Ambulance> {
        if !self.ambulances.is_empty() {
            return Vec::new();
        }

        let layout = [
            (0.01, 0.01, EquipmentLevel::Advanced, AmbulanceStatus::Available),
            (-0.015, 0.005, EquipmentLevel::Basic, AmbulanceStatus::Available),
            (0.02, -0.005, EquipmentLevel::Critical, AmbulanceStatus::Transporting),
            (0.005, -0.01, EquipmentLevel::Advanced, AmbulanceStatus::Available),
            (-0.01, -0.005, EquipmentLevel::Basic, AmbulanceStatus::EnRoute),
        ];

        for (i, (d_lat, d_lng, level, status)) in (1u64..).zip(layout) {
            let ambulance = Ambulance {
                id: self.ambulance_ids.next(),
                vehicle_id: format!("GH-AMB-{}", 100 + i),
                status,
                location: BASE_LOCATION.offset(d_lat, d_lng),
                equipment_level: level,
                crew_size: 2 + (i % 2) as u8,
                last_updated: now,
            };
            self.ambulances.push(ambulance);
        }

        self.ambulances.clone()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
