//! Ambulance assignment engine and the dispatch service around it.
//!
//! The core is pure: [`geo`] measures distance, [`services::scoring`] turns an
//! (ambulance, call) pair into a suitability score, [`services::selector`]
//! picks the best candidate and [`services::lifecycle`] owns the call and
//! dispatch-record state machines. [`services::dispatcher::Dispatcher`] ties
//! them to an owned in-memory store and an event bus.

pub mod config;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod services;

pub use error::{DispatchError, Result};
pub use services::dispatcher::{DispatchOutcome, Dispatcher};
pub use services::notification::{Event, EventBus};
