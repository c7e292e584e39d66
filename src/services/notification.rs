use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::models::{Ambulance, DispatchRecord, EmergencyCall};

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    AmbulanceCreated { ambulance: Ambulance },
    AmbulanceUpdated { ambulance: Ambulance },
    CallCreated { call: EmergencyCall },
    CallUpdated { call: EmergencyCall },
    DispatchCreated { dispatch: DispatchRecord },
    DispatchUpdated { dispatch: DispatchRecord },
    Tick {
        #[serde(with = "chrono::serde::ts_milliseconds")]
        now: DateTime<Utc>,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::AmbulanceCreated { .. } => "ambulance_created",
            Event::AmbulanceUpdated { .. } => "ambulance_updated",
            Event::CallCreated { .. } => "call_created",
            Event::CallUpdated { .. } => "call_updated",
            Event::DispatchCreated { .. } => "dispatch_created",
            Event::DispatchUpdated { .. } => "dispatch_updated",
            Event::Tick { .. } => "tick",
        }
    }
}

/// In-process publish/subscribe channel. Delivery is fire-and-forget:
/// events published with no subscribers are dropped, and a subscriber only
/// sees events published after it subscribed.
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: Event) {
        // Err only means nobody is listening right now
        if self.sender.send(event).is_err() {
            tracing::trace!("event published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Runs `callback` for every event on a background task until the
    /// returned handle is cancelled or dropped. Requires a Tokio runtime.
    pub fn listen<F>(&self, mut callback: F) -> ListenerHandle
    where
        F: FnMut(Event) + Send + 'static,
    {
        let mut subscription = self.subscribe();
        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                callback(event);
            }
        });
        ListenerHandle { task }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Receiving side of the bus. Dropping it unsubscribes.
pub struct Subscription {
    receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Next event, or `None` once the bus is gone. A subscriber that falls
    /// behind skips what it missed.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of `recv`.
    pub fn try_recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Everything currently buffered, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    pub fn unsubscribe(self) {}
}

pub struct ListenerHandle {
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn cancel(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
