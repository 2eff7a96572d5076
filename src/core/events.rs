//! Typed change notifications
//!
//! Every store mutation emits exactly one [`StoreEvent`] naming what changed,
//! so a view can re-render only the affected subtree.

use super::catalog::CommandKey;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The catalog was rebuilt
    Catalog,
    /// The case list of one command changed
    Cases { key: CommandKey },
    History,
    Favorites,
    Keybindings,
    CustomFolders,
    /// Search mode was entered, updated or left
    Search,
    /// Several stores were replaced at once (import)
    All,
}

/// Broadcast channel for [`StoreEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: StoreEvent) {
        tracing::debug!(?event, "store changed");
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
