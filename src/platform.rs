// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seams between the server core and the host BLE stack.
//!
//! The core calls *down* into the stack through [`GattPlatform`] and
//! [`AdvertisingRadio`], and the stack calls *up* into the core through
//! [`GattEventHandler`]. A host binding (`BlueZ`, `CoreBluetooth`, Android, a
//! simulator) implements the first two and forwards its callbacks to the
//! third.
//!
//! # Re-entrancy
//!
//! The server invokes [`GattPlatform`] methods while holding its state lock.
//! Implementations must hand work off to the stack and return; they must not
//! call back into a [`GattEventHandler`] on the same thread before
//! returning.

use std::sync::Arc;

use uuid::Uuid;

use crate::advertiser::AdvertisementData;
use crate::error::{DeliveryError, PlatformError};
use crate::event::DeviceId;
use crate::gatt::{ConnectionState, GattStatus, ReadRequest, ServiceDefinition, WriteRequest};

/// GATT server operations offered by the host stack.
pub trait GattPlatform: Send + Sync {
    /// Publishes the service so centrals can discover it.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the radio is unavailable or the stack
    /// rejects the service.
    fn register_service(&self, definition: &ServiceDefinition) -> Result<(), PlatformError>;

    /// Withdraws the service and releases server resources.
    fn unregister_service(&self);

    /// Answers a read or write request.
    fn send_response(
        &self,
        device: DeviceId,
        request_id: u32,
        status: GattStatus,
        offset: u16,
        value: &[u8],
    );

    /// Pushes a notification (no acknowledgment) to one central.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the stack could not queue the packet.
    fn notify(
        &self,
        device: DeviceId,
        characteristic: Uuid,
        value: &[u8],
    ) -> Result<(), DeliveryError>;
}

/// Advertising operations offered by the host stack.
pub trait AdvertisingRadio: Send + Sync {
    /// Begins broadcasting `data`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the radio refuses to advertise.
    fn start_advertising(&self, data: &AdvertisementData) -> Result<(), PlatformError>;

    /// Stops broadcasting.
    fn stop_advertising(&self);
}

/// Callbacks delivered by the host stack.
///
/// Replaces per-platform anonymous callback objects with one interface the
/// server implements, so the core never depends on a specific binding.
pub trait GattEventHandler: Send + Sync {
    /// A central connected or disconnected.
    fn on_connection_state_change(&self, device: DeviceId, state: ConnectionState);

    /// A central read an attribute value.
    fn on_characteristic_read(&self, device: DeviceId, request: ReadRequest);

    /// A central read a descriptor.
    fn on_descriptor_read(&self, device: DeviceId, request: ReadRequest);

    /// A central wrote a descriptor.
    fn on_descriptor_write(&self, device: DeviceId, request: WriteRequest);
}

impl<T: GattPlatform + ?Sized> GattPlatform for Arc<T> {
    fn register_service(&self, definition: &ServiceDefinition) -> Result<(), PlatformError> {
        (**self).register_service(definition)
    }

    fn unregister_service(&self) {
        (**self).unregister_service();
    }

    fn send_response(
        &self,
        device: DeviceId,
        request_id: u32,
        status: GattStatus,
        offset: u16,
        value: &[u8],
    ) {
        (**self).send_response(device, request_id, status, offset, value);
    }

    fn notify(
        &self,
        device: DeviceId,
        characteristic: Uuid,
        value: &[u8],
    ) -> Result<(), DeliveryError> {
        (**self).notify(device, characteristic, value)
    }
}

impl<T: AdvertisingRadio + ?Sized> AdvertisingRadio for Arc<T> {
    fn start_advertising(&self, data: &AdvertisementData) -> Result<(), PlatformError> {
        (**self).start_advertising(data)
    }

    fn stop_advertising(&self) {
        (**self).stop_advertising();
    }
}

impl<T: GattEventHandler + ?Sized> GattEventHandler for Arc<T> {
    fn on_connection_state_change(&self, device: DeviceId, state: ConnectionState) {
        (**self).on_connection_state_change(device, state);
    }

    fn on_characteristic_read(&self, device: DeviceId, request: ReadRequest) {
        (**self).on_characteristic_read(device, request);
    }

    fn on_descriptor_read(&self, device: DeviceId, request: ReadRequest) {
        (**self).on_descriptor_read(device, request);
    }

    fn on_descriptor_write(&self, device: DeviceId, request: WriteRequest) {
        (**self).on_descriptor_write(device, request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullStack;

    impl GattPlatform for NullStack {
        fn register_service(&self, _: &ServiceDefinition) -> Result<(), PlatformError> {
            Ok(())
        }

        fn unregister_service(&self) {}

        fn send_response(&self, _: DeviceId, _: u32, _: GattStatus, _: u16, _: &[u8]) {}

        fn notify(&self, _: DeviceId, _: Uuid, _: &[u8]) -> Result<(), DeliveryError> {
            Err(DeliveryError::NotConnected)
        }
    }

    impl AdvertisingRadio for NullStack {
        fn start_advertising(&self, _: &AdvertisementData) -> Result<(), PlatformError> {
            Err(PlatformError::RadioUnavailable)
        }

        fn stop_advertising(&self) {}
    }

    #[test]
    fn arc_forwards_to_inner() {
        let stack = Arc::new(NullStack);
        let device = DeviceId::from_bytes([1; 6]);

        assert!(stack.register_service(&ServiceDefinition::default()).is_ok());
        assert_eq!(
            stack.notify(device, Uuid::nil(), b"x"),
            Err(DeliveryError::NotConnected)
        );
        assert_eq!(
            stack.start_advertising(&AdvertisementData::for_service(Uuid::nil())),
            Err(PlatformError::RadioUnavailable)
        );
    }

    #[test]
    fn traits_are_object_safe() {
        fn assert_dyn(_: &dyn GattPlatform, _: &dyn AdvertisingRadio) {}
        assert_dyn(&NullStack, &NullStack);
    }
}
