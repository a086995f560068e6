//! Catalog event types and EventBus
//!
//! Loader and filter session publish [`CatalogEvent`]s; the view state layer
//! and anything else interested subscribe.

use crate::db::models::CatalogCounts;
use crate::filter::FilterPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Catalog event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// Remote catalog fetch began
    BootstrapStarted { timestamp: DateTime<Utc> },

    /// Local store already had data; nothing fetched
    BootstrapSkipped { timestamp: DateTime<Utc> },

    /// Remote catalog replaced the local store
    BootstrapCompleted {
        counts: CatalogCounts,
        timestamp: DateTime<Utc>,
    },

    /// Fetch or replace failed; local data untouched
    BootstrapFailed {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Active filter path changed
    FilterPathChanged {
        path: FilterPath,
        timestamp: DateTime<Utc>,
    },

    /// Derived results recomputed and published
    ResultsPublished {
        revision: u64,
        video_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Non-fatal data-layer problem to show the user
    Notice {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl CatalogEvent {
    pub fn notice(message: impl Into<String>) -> Self {
        CatalogEvent::Notice {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Event name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::BootstrapStarted { .. } => "BootstrapStarted",
            CatalogEvent::BootstrapSkipped { .. } => "BootstrapSkipped",
            CatalogEvent::BootstrapCompleted { .. } => "BootstrapCompleted",
            CatalogEvent::BootstrapFailed { .. } => "BootstrapFailed",
            CatalogEvent::FilterPathChanged { .. } => "FilterPathChanged",
            CatalogEvent::ResultsPublished { .. } => "ResultsPublished",
            CatalogEvent::Notice { .. } => "Notice",
        }
    }
}

/// Broadcast bus for [`CatalogEvent`]s
///
/// Slow subscribers lag and lose the oldest events rather than blocking
/// publishers.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CatalogEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CatalogEvent) {
        let name = event.event_type();
        if self.tx.send(event).is_err() {
            debug!("No subscribers for {}", name);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
