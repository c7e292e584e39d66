//! Periodic demo driver: fleet jitter, call progression and sample calls.
//!
//! `tick` and `generate_call` are plain functions over an explicit clock and
//! RNG; `Simulator` only wires them to Tokio timers.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::dispatcher::Dispatcher;
use super::lifecycle;
use super::notification::Event;
use super::store::BASE_LOCATION;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::geo::DEG_PER_KM;
use crate::models::{CallDescriptor, CallId, CallStatus, Coordinate, DispatchId, EmergencyCall, Severity};

pub const SAMPLE_CALL_RADIUS_KM: f64 = 5.0;

pub const SAMPLE_ADDRESSES: [&str; 9] = [
    "Osu, Accra",
    "Tema Station",
    "Kaneshie Market",
    "Legon University",
    "Kotoka Airport",
    "Madina",
    "Dansoman",
    "East Legon",
    "Spintex Road",
];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub ambulances_moved: usize,
    pub calls_en_route: Vec<CallId>,
    pub calls_completed: Vec<CallId>,
    pub dispatches_completed: Vec<DispatchId>,
}

/// Advances the demo world by one step at `now`.
pub fn tick<R: Rng + ?Sized>(
    dispatcher: &Dispatcher,
    now: DateTime<Utc>,
    jitter_degrees: f64,
    rng: &mut R,
) -> TickReport {
    dispatcher.with_store_mut(|store, events| {
        let mut report = TickReport::default();

        for ambulance in store.ambulances_mut() {
            if jitter_degrees > 0.0 {
                let d_lat = (rng.gen::<f64>() - 0.5) * jitter_degrees;
                let d_lng = (rng.gen::<f64>() - 0.5) * jitter_degrees;
                ambulance.location = ambulance.location.offset(d_lat, d_lng);
            }
            ambulance.last_updated = now;
            report.ambulances_moved += 1;
            events.publish(Event::AmbulanceUpdated {
                ambulance: ambulance.clone(),
            });
        }

        events.publish(Event::Tick { now });

        for idx in 0..store.calls().len() {
            let call = &mut store.calls_mut()[idx];
            let Some(status) = lifecycle::progress_call(call) else {
                continue;
            };
            let call = call.clone();
            events.publish(Event::CallUpdated { call: call.clone() });

            match status {
                CallStatus::EnRoute => report.calls_en_route.push(call.id),
                CallStatus::Completed => {
                    report.calls_completed.push(call.id);
                    if let Some(record) = store.active_dispatch_for_call_mut(call.id) {
                        if lifecycle::complete_dispatch(record, now).is_ok() {
                            report.dispatches_completed.push(record.id);
                            events.publish(Event::DispatchUpdated {
                                dispatch: record.clone(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        tracing::debug!(
            moved = report.ambulances_moved,
            en_route = report.calls_en_route.len(),
            completed = report.calls_completed.len(),
            "simulation tick"
        );
        report
    })
}

/// A random call descriptor within `SAMPLE_CALL_RADIUS_KM` of `center`.
pub fn sample_call<R: Rng + ?Sized>(center: Coordinate, rng: &mut R) -> CallDescriptor {
    let r = SAMPLE_CALL_RADIUS_KM * DEG_PER_KM;
    let location = center.offset(
        (rng.gen::<f64>() - 0.5) * 2.0 * r,
        (rng.gen::<f64>() - 0.5) * 2.0 * r,
    );
    let severity = match rng.gen_range(1..=4) {
        1 => Severity::CRITICAL,
        2 => Severity::SERIOUS,
        3 => Severity::MODERATE,
        _ => Severity::MINOR,
    };
    let address = SAMPLE_ADDRESSES[rng.gen_range(0..SAMPLE_ADDRESSES.len())];
    CallDescriptor::new(location, severity).with_address(address)
}

/// Takes in a sample call near the first ambulance, or near the base when
/// the fleet is empty.
pub fn generate_call<R: Rng + ?Sized>(
    dispatcher: &Dispatcher,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<EmergencyCall> {
    let center = dispatcher
        .with_store_mut(|store, _| store.ambulances().first().map(|a| a.location))
        .unwrap_or(BASE_LOCATION);
    dispatcher.intake_call_at(sample_call(center, rng), now)
}

pub struct Simulator {
    dispatcher: Arc<Dispatcher>,
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(dispatcher: Arc<Dispatcher>, config: SimulationConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Publishes `ambulance_created` for the current fleet, then runs the
    /// tick and sample-call timers until the handle is stopped.
    pub fn start(self) -> SimulatorHandle {
        for ambulance in self.dispatcher.ambulances() {
            self.dispatcher
                .events()
                .publish(Event::AmbulanceCreated { ambulance });
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        tracing::info!(
            tick_ms = self.config.tick_interval.as_millis() as u64,
            call_ms = self.config.call_interval.as_millis() as u64,
            "simulator started"
        );

        let task = tokio::spawn(async move {
            let start = Instant::now();
            let mut ticks = interval_at(start + self.config.tick_interval, self.config.tick_interval);
            let mut calls = interval_at(start + self.config.call_interval, self.config.call_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            calls.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticks.tick() => {
                        tick(&self.dispatcher, Utc::now(), self.config.jitter_degrees, &mut rng);
                    }
                    _ = calls.tick() => {
                        if let Err(e) = generate_call(&self.dispatcher, Utc::now(), &mut rng) {
                            tracing::error!(error = %e, "failed to generate sample call");
                        }
                    }
                }
            }
        });

        SimulatorHandle { task }
    }
}

pub struct SimulatorHandle {
    task: JoinHandle<()>,
}

impl SimulatorHandle {
    pub fn stop(self) {
        self.task.abort();
        tracing::info!("simulator stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_sample_call_stays_within_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        let r = SAMPLE_CALL_RADIUS_KM * DEG_PER_KM;
        for _ in 0..200 {
            let d = sample_call(BASE_LOCATION, &mut rng);
            assert!((d.location.lat - BASE_LOCATION.lat).abs() <= r);
            assert!((d.location.lng - BASE_LOCATION.lng).abs() <= r);
            assert!((1..=4).contains(&d.severity_level));
            assert!(SAMPLE_ADDRESSES.contains(&d.address.as_deref().unwrap()));
        }
    }

    #[test]
    fn test_zero_jitter_keeps_positions() {
        let dispatcher = Dispatcher::default();
        dispatcher.seed_demo_fleet();
        let before = dispatcher.ambulances();
        let mut rng = StepRng::new(0, 1);
        let report = tick(&dispatcher, Utc::now(), 0.0, &mut rng);
        assert_eq!(report.ambulances_moved, 5);
        let after = dispatcher.ambulances();
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.location, b.location);
        }
    }
}
