use serde::Serialize;

use crate::geo::haversine_km;
use crate::models::{Ambulance, AmbulanceStatus, Coordinate, EquipmentLevel, Severity};

pub const DISTANCE_WEIGHT: f64 = 0.40;
pub const TRAVEL_TIME_WEIGHT: f64 = 0.25;
pub const CAPABILITY_WEIGHT: f64 = 0.20;
pub const AVAILABILITY_WEIGHT: f64 = 0.15;

const MAX_SCORED_KM: f64 = 30.0;
const MAX_SCORED_MINUTES: f64 = 45.0;
const BASE_SPEED_KMH: f64 = 40.0;
const MAX_CONGESTION: f64 = 0.5;
const CONGESTION_KM: f64 = 60.0;

/// Composite suitability of one ambulance for one call, with the raw inputs
/// and every sub-score kept for inspection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub total: f64,
    pub distance_km: f64,
    pub travel_minutes: f64,
    pub distance: f64,
    pub travel_time: f64,
    pub capability: f64,
    pub availability: f64,
}

pub fn score(ambulance: &Ambulance, location: Coordinate, severity: Severity) -> ScoreBreakdown {
    let km = haversine_km(ambulance.location, location);
    let minutes = estimate_travel_minutes(km);

    let distance = distance_score(km);
    let travel_time = travel_time_score(minutes);
    let capability = capability_score(ambulance.equipment_level, severity);
    let availability = availability_score(ambulance.status);

    ScoreBreakdown {
        total: weighted_total(distance, travel_time, capability, availability),
        distance_km: km,
        travel_minutes: minutes,
        distance,
        travel_time,
        capability,
        availability,
    }
}

pub fn weighted_total(distance: f64, travel_time: f64, capability: f64, availability: f64) -> f64 {
    distance * DISTANCE_WEIGHT
        + travel_time * TRAVEL_TIME_WEIGHT
        + capability * CAPABILITY_WEIGHT
        + availability * AVAILABILITY_WEIGHT
}

/// 1 at 0 km falling linearly to 0 at 30 km.
pub fn distance_score(km: f64) -> f64 {
    1.0 - km.clamp(0.0, MAX_SCORED_KM) / MAX_SCORED_KM
}

/// Minutes at 40 km/h, inflated by a congestion factor growing from 1.0
/// to 1.5 over the first 30 km.
pub fn estimate_travel_minutes(km: f64) -> f64 {
    let base_minutes = (km / BASE_SPEED_KMH) * 60.0;
    let congestion = 1.0 + (km / CONGESTION_KM).min(MAX_CONGESTION);
    base_minutes * congestion
}

/// 1 at 0 minutes falling linearly to 0 at 45 minutes.
pub fn travel_time_score(minutes: f64) -> f64 {
    1.0 - minutes.clamp(0.0, MAX_SCORED_MINUTES) / MAX_SCORED_MINUTES
}

pub fn capability_score(level: EquipmentLevel, severity: Severity) -> f64 {
    match level.weight() - severity.required_weight() {
        diff if diff >= 0 => 1.0,
        -1 => 0.5,
        _ => 0.0,
    }
}

pub fn availability_score(status: AmbulanceStatus) -> f64 {
    match status {
        AmbulanceStatus::Available => 1.0,
        AmbulanceStatus::EnRoute | AmbulanceStatus::AtScene => 0.3,
        AmbulanceStatus::Transporting => 0.1,
        AmbulanceStatus::OutOfService => 0.0,
    }
}
