//! UI-facing notifier
//!
//! Publishes request notices on a broadcast channel so any number of UI
//! components can render toasts or react to an expired session.

use chatwire_core::{Notice, Notifier};
use tokio::sync::broadcast;
use tracing::{debug, info};

const DEFAULT_CAPACITY: usize = 64;

/// Events emitted towards the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Show a transient message
    Notice(Notice),
    /// The session is no longer valid; the UI may offer a sign-in redirect
    SessionExpired,
}

/// [`Notifier`] that fans events out to every subscriber.
///
/// Events published while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<UiEvent>,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.sender.subscribe()
    }

    fn publish(&self, event: UiEvent) {
        if self.sender.send(event).is_err() {
            debug!("no UI subscribers; event dropped");
        }
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notice: Notice) {
        debug!(kind = %notice.kind, message = %notice.message, "publishing notice");
        self.publish(UiEvent::Notice(notice));
    }

    fn session_expired(&self) {
        info!("session expired; prompting for sign-in");
        self.publish(UiEvent::SessionExpired);
    }
}
