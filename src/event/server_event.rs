// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server event types.

use super::DeviceId;

/// Events emitted by the GATT server.
///
/// These are informational: the server never waits for anyone to consume
/// them. Hosts typically forward them to a UI or a log.
///
/// # Examples
///
/// ```
/// use gatt_notifier::event::{DeviceId, ServerEvent};
///
/// let device_id = DeviceId::from_bytes([1, 2, 3, 4, 5, 6]);
///
/// let connected = ServerEvent::DeviceConnected { device_id };
/// assert_eq!(connected.device_id(), Some(device_id));
///
/// let cycle = ServerEvent::NotificationCycle {
///     count: 3,
///     delivered: 2,
///     failed: 0,
/// };
/// assert_eq!(cycle.device_id(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// The service is registered, advertising and the timer is armed.
    Started,

    /// The server has been torn down.
    Stopped,

    /// A central connected.
    DeviceConnected {
        /// The connecting central.
        device_id: DeviceId,
    },

    /// A central disconnected and its records were dropped.
    DeviceDisconnected {
        /// The disconnecting central.
        device_id: DeviceId,
    },

    /// A central's notification flag changed through a CCCD write.
    SubscriptionChanged {
        /// The writing central.
        device_id: DeviceId,
        /// Whether notifications are now enabled for it.
        subscribed: bool,
    },

    /// A notification cycle completed.
    NotificationCycle {
        /// The `count` field of the value that was generated.
        count: u64,
        /// Number of notifications handed to the stack.
        delivered: usize,
        /// Number of notifications the stack refused.
        failed: usize,
    },
}

impl ServerEvent {
    /// Returns the device ID associated with this event, if any.
    #[must_use]
    pub fn device_id(&self) -> Option<DeviceId> {
        match self {
            Self::DeviceConnected { device_id }
            | Self::DeviceDisconnected { device_id }
            | Self::SubscriptionChanged { device_id, .. } => Some(*device_id),
            Self::Started | Self::Stopped | Self::NotificationCycle { .. } => None,
        }
    }

    /// Returns `true` if this is a server lifecycle event.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::Started | Self::Stopped)
    }

    /// Returns `true` if this is a connection event.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::DeviceConnected { .. } | Self::DeviceDisconnected { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> DeviceId {
        DeviceId::from_bytes([0xAA; 6])
    }

    #[test]
    fn device_id_extraction() {
        let device_id = id();

        assert_eq!(
            ServerEvent::DeviceConnected { device_id }.device_id(),
            Some(device_id)
        );
        assert_eq!(
            ServerEvent::SubscriptionChanged {
                device_id,
                subscribed: true
            }
            .device_id(),
            Some(device_id)
        );
        assert_eq!(ServerEvent::Started.device_id(), None);
    }

    #[test]
    fn classification() {
        let device_id = id();

        assert!(ServerEvent::Started.is_lifecycle());
        assert!(ServerEvent::Stopped.is_lifecycle());
        assert!(!ServerEvent::Started.is_connection());
        assert!(ServerEvent::DeviceDisconnected { device_id }.is_connection());
        assert!(
            !ServerEvent::SubscriptionChanged {
                device_id,
                subscribed: false
            }
            .is_connection()
        );
    }
}
