//! Event system for composer notifications
//!
//! An in-process broadcast bus. The composer and the assembler emit events
//! as state changes and saves progress; UI layers subscribe to drive toasts
//! and refreshes.
//!
//! # Non-Blocking Behavior
//!
//! If no subscribers exist, events are dropped immediately. Subscribers can
//! lag without blocking emitters.
//!
//! # Example
//!
//! ```no_run
//! use libpostdeck::service::events::{ComposerEvent, EventBus};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(64);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(ComposerEvent::ChannelAdded {
//!     platform_id: "instagram".to_string(),
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::PostStatus;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<ComposerEvent>;

/// Broadcast bus for [`ComposerEvent`]s
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ComposerEvent>,
}

impl EventBus {
    /// Create a new event bus buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all current subscribers
    pub fn emit(&self, event: ComposerEvent) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Events emitted while composing and saving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComposerEvent {
    ChannelAdded {
        platform_id: String,
    },

    ChannelRemoved {
        platform_id: String,
    },

    /// A channel's caption was copied to every channel
    CaptionsApplied {
        source: String,
    },

    /// Composition was thrown away
    Discarded,

    CommitStarted {
        post_id: String,
        status: PostStatus,
    },

    /// The sink recorded the post; `status` drives the completion toast
    CommitCompleted {
        post_id: String,
        status: PostStatus,
    },

    CommitFailed {
        post_id: String,
        error: String,
    },
}
