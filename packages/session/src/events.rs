use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use attention_algo::{AttentionScore, AttentionState, PresenceStrategy, SessionStats};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum AttentionEvent {
    #[serde(rename = "SESSION_STARTED")]
    SessionStarted(SessionStartedPayload),

    #[serde(rename = "STATUS_CHANGED")]
    StatusChanged(StatusChangedPayload),

    #[serde(rename = "SESSION_STOPPED")]
    SessionStopped(SessionStoppedPayload),

    #[serde(rename = "ESTIMATOR_DEGRADED")]
    EstimatorDegraded(EstimatorDegradedPayload),
}

impl AttentionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            AttentionEvent::SessionStarted(_) => "SESSION_STARTED",
            AttentionEvent::StatusChanged(_) => "STATUS_CHANGED",
            AttentionEvent::SessionStopped(_) => "SESSION_STOPPED",
            AttentionEvent::EstimatorDegraded(_) => "ESTIMATOR_DEGRADED",
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            AttentionEvent::SessionStarted(p) => &p.session_id,
            AttentionEvent::StatusChanged(p) => &p.session_id,
            AttentionEvent::SessionStopped(p) => &p.session_id,
            AttentionEvent::EstimatorDegraded(p) => &p.session_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStartedPayload {
    pub session_id: String,
    pub interval_ms: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangedPayload {
    pub session_id: String,
    pub state: AttentionState,
    pub score: AttentionScore,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStoppedPayload {
    pub session_id: String,
    pub stats: SessionStats,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorDegradedPayload {
    pub session_id: String,
    pub strategy: PresenceStrategy,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub id: String,
    pub event: AttentionEvent,
    pub created_at: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new(event: AttentionEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event,
            created_at: Utc::now(),
        }
    }
}

type SubscriberId = String;

struct Subscriber {
    session_id: Option<String>,
    event_types: Option<Vec<String>>,
    sender: broadcast::Sender<EventEnvelope>,
}

impl Subscriber {
    fn matches(&self, envelope: &EventEnvelope) -> bool {
        if let Some(ref session_id) = self.session_id {
            if envelope.event.session_id() != session_id {
                return false;
            }
        }

        if let Some(ref event_types) = self.event_types {
            if !event_types.iter().any(|t| t == envelope.event.event_type()) {
                return false;
            }
        }

        true
    }
}

/// Fan-out of pipeline events. Publishing never blocks, so the pipeline can
/// publish while holding its own lock.
pub struct EventBus {
    global_sender: broadcast::Sender<EventEnvelope>,
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
    event_count: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        let (global_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            global_sender,
            subscribers: RwLock::new(HashMap::new()),
            event_count: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, event: AttentionEvent) {
        let envelope = EventEnvelope::new(event);
        self.event_count.fetch_add(1, Ordering::Relaxed);

        let mut sent_count = 0usize;
        for subscriber in self.subscribers.read().values() {
            if subscriber.matches(&envelope) && subscriber.sender.send(envelope.clone()).is_ok() {
                sent_count += 1;
            }
        }

        let event_type = envelope.event.event_type();
        if self.global_sender.send(envelope).is_err() {
            debug!(event_type, "No global subscribers for event");
        }

        debug!(event_type, sent_to = sent_count, "Event published");
    }

    pub fn subscribe_global(&self) -> broadcast::Receiver<EventEnvelope> {
        self.global_sender.subscribe()
    }

    pub fn subscribe_filtered(
        &self,
        session_id: Option<String>,
        event_types: Option<Vec<String>>,
    ) -> (SubscriberId, broadcast::Receiver<EventEnvelope>) {
        let (sender, receiver) = broadcast::channel(CHANNEL_CAPACITY);
        let subscriber_id = uuid::Uuid::new_v4().to_string();

        self.subscribers.write().insert(
            subscriber_id.clone(),
            Subscriber {
                session_id,
                event_types,
                sender,
            },
        );

        debug!(subscriber_id = %subscriber_id, "New filtered subscription created");
        (subscriber_id, receiver)
    }

    pub fn unsubscribe(&self, subscriber_id: &str) {
        if self.subscribers.write().remove(subscriber_id).is_some() {
            debug!(subscriber_id = %subscriber_id, "Subscription removed");
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> EventBusStats {
        let filtered_subscribers = self.subscribers.read().len();
        let global_subscribers = self.global_sender.receiver_count();
        EventBusStats {
            total_events: self.event_count(),
            subscriber_count: filtered_subscribers + global_subscribers,
            global_subscribers,
            filtered_subscribers,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventBusStats {
    pub total_events: u64,
    pub subscriber_count: usize,
    pub global_subscribers: usize,
    pub filtered_subscribers: usize,
}
