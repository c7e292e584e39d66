pub mod dispatcher;
pub mod lifecycle;
pub mod notification;
pub mod scoring;
pub mod selector;
pub mod simulator;
pub mod store;

use crate::config::Config;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub dispatcher: Arc<dispatcher::Dispatcher>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let events = notification::EventBus::new(config.event_capacity);
        let dispatcher = Arc::new(dispatcher::Dispatcher::new(events));
        if config.seed_fleet {
            dispatcher.seed_demo_fleet();
        }

        Self { config, dispatcher }
    }

    pub fn simulator(&self) -> simulator::Simulator {
        simulator::Simulator::new(self.dispatcher.clone(), self.config.simulation.clone())
    }
}
