// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-central connection and subscription records.

use std::collections::{HashMap, HashSet};

use crate::event::DeviceId;

/// What the server knows about one connected central.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct DeviceRecord {
    subscribed: bool,
}

/// Registry of connected centrals and their notification flags.
///
/// Presence of a key *is* the connected state, so a subscription can never
/// outlive its connection: [`disconnect`](Self::disconnect) drops both in
/// one step.
///
/// The registry is plain data. The server wraps it in its own lock so that
/// registry updates, value swaps and fan-out form one critical section.
///
/// # Examples
///
/// ```
/// use gatt_notifier::event::DeviceId;
/// use gatt_notifier::subscription::SubscriptionRegistry;
///
/// let mut registry = SubscriptionRegistry::new();
/// let id = DeviceId::from_bytes([1, 2, 3, 4, 5, 6]);
///
/// registry.connect(id);
/// assert!(registry.set_subscribed(id, true));
/// assert!(registry.subscribed_devices().contains(&id));
///
/// registry.disconnect(id);
/// assert!(!registry.set_subscribed(id, true));
/// ```
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    devices: HashMap<DeviceId, DeviceRecord>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new connection with notifications off.
    ///
    /// A repeated connect for the same id starts a fresh record.
    pub fn connect(&mut self, id: DeviceId) {
        self.devices.insert(id, DeviceRecord::default());
    }

    /// Drops the connection and any subscription for `id`.
    ///
    /// Returns `true` if the device was connected.
    pub fn disconnect(&mut self, id: DeviceId) -> bool {
        self.devices.remove(&id).is_some()
    }

    /// Sets the notification flag for a connected device.
    ///
    /// Returns `false` (and changes nothing) if `id` is not connected.
    pub fn set_subscribed(&mut self, id: DeviceId, subscribed: bool) -> bool {
        match self.devices.get_mut(&id) {
            Some(record) => {
                record.subscribed = subscribed;
                true
            }
            None => false,
        }
    }

    /// Returns a snapshot of the devices with notifications on.
    #[must_use]
    pub fn subscribed_devices(&self) -> HashSet<DeviceId> {
        self.devices
            .iter()
            .filter(|(_, record)| record.subscribed)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns a snapshot of all connected devices.
    #[must_use]
    pub fn connected_devices(&self) -> HashSet<DeviceId> {
        self.devices.keys().copied().collect()
    }

    /// Returns true if `id` is connected.
    #[must_use]
    pub fn is_connected(&self, id: DeviceId) -> bool {
        self.devices.contains_key(&id)
    }

    /// Returns true if `id` is connected with notifications on.
    #[must_use]
    pub fn is_subscribed(&self, id: DeviceId) -> bool {
        self.devices.get(&id).is_some_and(|record| record.subscribed)
    }

    /// Returns the number of connected devices.
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.devices.len()
    }

    /// Forgets every device.
    pub fn clear(&mut self) {
        self.devices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> DeviceId {
        DeviceId::from_bytes([0, 0, 0, 0, 0, n])
    }

    #[test]
    fn new_connection_is_unsubscribed() {
        let mut registry = SubscriptionRegistry::new();
        registry.connect(id(1));

        assert!(registry.is_connected(id(1)));
        assert!(!registry.is_subscribed(id(1)));
        assert!(registry.subscribed_devices().is_empty());
    }

    #[test]
    fn set_subscribed_requires_connection() {
        let mut registry = SubscriptionRegistry::new();

        assert!(!registry.set_subscribed(id(1), true));
        assert!(!registry.is_connected(id(1)));
        assert_eq!(registry.connected_count(), 0);
    }

    #[test]
    fn subscribe_and_unsubscribe() {
        let mut registry = SubscriptionRegistry::new();
        registry.connect(id(1));
        registry.connect(id(2));

        assert!(registry.set_subscribed(id(1), true));
        assert_eq!(registry.subscribed_devices(), HashSet::from([id(1)]));

        assert!(registry.set_subscribed(id(1), false));
        assert!(registry.subscribed_devices().is_empty());
        assert_eq!(registry.connected_count(), 2);
    }

    #[test]
    fn disconnect_drops_subscription() {
        let mut registry = SubscriptionRegistry::new();
        registry.connect(id(1));
        registry.set_subscribed(id(1), true);

        assert!(registry.disconnect(id(1)));
        assert!(!registry.disconnect(id(1)));
        assert!(registry.subscribed_devices().is_empty());
    }

    #[test]
    fn reconnect_does_not_restore_subscription() {
        let mut registry = SubscriptionRegistry::new();
        registry.connect(id(1));
        registry.set_subscribed(id(1), true);
        registry.disconnect(id(1));

        registry.connect(id(1));
        assert!(!registry.is_subscribed(id(1)));
    }

    #[test]
    fn duplicate_connect_resets_flag() {
        let mut registry = SubscriptionRegistry::new();
        registry.connect(id(1));
        registry.set_subscribed(id(1), true);

        registry.connect(id(1));
        assert!(!registry.is_subscribed(id(1)));
        assert_eq!(registry.connected_count(), 1);
    }

    #[test]
    fn subscribed_is_subset_of_connected_for_any_sequence() {
        // Deterministic pseudo-random walk over connect/disconnect/subscribe.
        let mut registry = SubscriptionRegistry::new();
        let mut seed: u32 = 0x1234_5678;

        for _ in 0..2_000 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let device = id(u8::try_from((seed >> 8) % 5).unwrap());
            match (seed >> 16) % 4 {
                0 => registry.connect(device),
                1 => {
                    registry.disconnect(device);
                }
                2 => {
                    registry.set_subscribed(device, true);
                }
                _ => {
                    registry.set_subscribed(device, false);
                }
            }

            let connected = registry.connected_devices();
            assert!(registry.subscribed_devices().is_subset(&connected));
        }
    }

    #[test]
    fn clear_forgets_everything() {
        let mut registry = SubscriptionRegistry::new();
        registry.connect(id(1));
        registry.set_subscribed(id(1), true);

        registry.clear();
        assert_eq!(registry.connected_count(), 0);
        assert!(registry.subscribed_devices().is_empty());
    }
}
