// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel for server events.

use tokio::sync::broadcast;

use super::ServerEvent;

/// Default channel capacity for the event bus.
pub(crate) const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Fan-out of [`ServerEvent`]s to any number of observers.
///
/// Backed by a tokio broadcast channel. Publishing never blocks the GATT
/// critical section: a slow observer loses the oldest events and sees
/// `RecvError::Lagged` instead of holding the server up.
///
/// # Examples
///
/// ```
/// use gatt_notifier::event::{EventBus, ServerEvent};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ServerEvent::Started);
/// assert_eq!(rx.try_recv().unwrap(), ServerEvent::Started);
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a new event bus buffering up to `capacity` events per observer.
    ///
    /// A capacity of zero is bumped to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns a receiver for all events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event, discarding it when nobody listens.
    pub fn publish(&self, event: ServerEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No server event subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
