// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for the GATT server.

use std::time::Duration;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::event::DEFAULT_EVENT_CAPACITY;
use crate::gatt::{DEFAULT_CHARACTERISTIC_UUID, DEFAULT_SERVICE_UUID, ServiceDefinition};

/// Default interval between notification cycles.
pub const DEFAULT_NOTIFY_PERIOD: Duration = Duration::from_secs(5);

/// Configuration for a [`GattServer`](super::GattServer).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use gatt_notifier::server::ServerConfig;
///
/// // Defaults: 5 s period, first cycle 5 s after start
/// let config = ServerConfig::default();
/// assert_eq!(config.notify_period, Duration::from_secs(5));
///
/// // Faster cycle for a bench setup
/// let config = ServerConfig::new()
///     .with_notify_period(Duration::from_secs(1))
///     .with_initial_delay(Duration::from_millis(200));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Primary service identity, also the advertised identity.
    pub service_uuid: Uuid,
    /// Identity of the notifying characteristic.
    pub characteristic_uuid: Uuid,
    /// Interval between notification cycles.
    pub notify_period: Duration,
    /// Delay between `start()` and the first cycle.
    pub initial_delay: Duration,
    /// Events buffered per [`ServerEvent`](crate::event::ServerEvent) observer.
    pub event_capacity: usize,
}

impl ServerConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service identity.
    #[must_use]
    pub fn with_service_uuid(mut self, uuid: Uuid) -> Self {
        self.service_uuid = uuid;
        self
    }

    /// Sets the characteristic identity.
    #[must_use]
    pub fn with_characteristic_uuid(mut self, uuid: Uuid) -> Self {
        self.characteristic_uuid = uuid;
        self
    }

    /// Sets the notification period.
    #[must_use]
    pub fn with_notify_period(mut self, period: Duration) -> Self {
        self.notify_period = period;
        self
    }

    /// Sets the delay before the first cycle.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the per-observer event buffer size.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Returns the service layout this configuration describes.
    #[must_use]
    pub fn service_definition(&self) -> ServiceDefinition {
        ServiceDefinition::new(self.service_uuid, self.characteristic_uuid)
    }

    /// Checks the configuration for values the server cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the period is zero or the service
    /// and characteristic share an identity.
    pub fn validate(&self) -> Result<()> {
        if self.notify_period.is_zero() {
            return Err(Error::InvalidConfig(
                "notify period must be greater than zero".to_string(),
            ));
        }
        if self.service_uuid == self.characteristic_uuid {
            return Err(Error::InvalidConfig(
                "service and characteristic UUIDs must differ".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service_uuid: DEFAULT_SERVICE_UUID,
            characteristic_uuid: DEFAULT_CHARACTERISTIC_UUID,
            notify_period: DEFAULT_NOTIFY_PERIOD,
            initial_delay: DEFAULT_NOTIFY_PERIOD,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_wire_contract() {
        let config = ServerConfig::default();

        assert_eq!(config.notify_period, Duration::from_secs(5));
        assert_eq!(config.initial_delay, Duration::from_secs(5));
        assert_eq!(config.service_uuid, DEFAULT_SERVICE_UUID);
        assert_eq!(config.characteristic_uuid, DEFAULT_CHARACTERISTIC_UUID);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_methods() {
        let service = Uuid::from_u128(1);
        let characteristic = Uuid::from_u128(2);
        let config = ServerConfig::new()
            .with_service_uuid(service)
            .with_characteristic_uuid(characteristic)
            .with_notify_period(Duration::from_secs(1))
            .with_initial_delay(Duration::ZERO)
            .with_event_capacity(8);

        let definition = config.service_definition();
        assert_eq!(definition.uuid, service);
        assert_eq!(definition.characteristic_uuid(), characteristic);
        assert_eq!(config.initial_delay, Duration::ZERO);
        assert_eq!(config.event_capacity, 8);
    }

    #[test]
    fn zero_period_is_invalid() {
        let config = ServerConfig::new().with_notify_period(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn shared_uuid_is_invalid() {
        let config = ServerConfig::new().with_characteristic_uuid(DEFAULT_SERVICE_UUID);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
