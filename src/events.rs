//! Change notification
//!
//! A method raises one [`ChangeEvent`] per accepted user edit and per
//! accepted token response. Programmatic assignment, defaults and restoring
//! settings never notify.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Signals that a field of the authorization method changed.
///
/// Carries no payload; listeners call
/// [`AuthorizationMethod::serialize`](crate::method::AuthorizationMethod::serialize)
/// to read the new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent;

/// Broadcasts change events to any number of subscribers.
#[derive(Debug)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribes to change events raised after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Raises a change event. Having no subscribers is not an error.
    pub fn notify(&self) {
        let delivered = self.tx.send(ChangeEvent).unwrap_or(0);
        tracing::trace!(subscribers = delivered, "Change notification");
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
