// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Advertisement of the service identity.
//!
//! The advertisement carries the flags structure and the 128-bit service
//! UUID and nothing else: no local name, no manufacturer data, no
//! characteristic value. That keeps it at 21 of the 31 bytes a legacy
//! advertising PDU allows.

use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::AdvertiseError;
use crate::platform::AdvertisingRadio;

/// Maximum advertising data length of a legacy advertising PDU.
pub const MAX_ADVERTISING_LEN: usize = 31;

/// AD type: Flags.
const AD_TYPE_FLAGS: u8 = 0x01;

/// AD type: Complete List of 128-bit Service Class UUIDs.
const AD_TYPE_COMPLETE_UUID128: u8 = 0x07;

/// LE General Discoverable Mode, BR/EDR Not Supported.
const DEFAULT_FLAGS: u8 = 0x06;

/// The advertising data handed to the radio.
///
/// # Examples
///
/// ```
/// use gatt_notifier::advertiser::AdvertisementData;
/// use gatt_notifier::gatt::DEFAULT_SERVICE_UUID;
///
/// let data = AdvertisementData::for_service(DEFAULT_SERVICE_UUID);
/// assert_eq!(data.encode().len(), 21);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisementData {
    /// Discoverability flags.
    pub flags: u8,
    /// The advertised service identity.
    pub service_uuid: Uuid,
}

impl AdvertisementData {
    /// Creates the advertisement for a service.
    #[must_use]
    pub const fn for_service(service_uuid: Uuid) -> Self {
        Self {
            flags: DEFAULT_FLAGS,
            service_uuid,
        }
    }

    /// Encodes the AD structures as they go on air.
    ///
    /// UUIDs are transmitted little-endian.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(21);
        out.extend_from_slice(&[0x02, AD_TYPE_FLAGS, self.flags]);
        out.extend_from_slice(&[0x11, AD_TYPE_COMPLETE_UUID128]);
        out.extend_from_slice(&self.service_uuid.as_u128().to_le_bytes());
        out
    }
}

/// Owner of the radio's advertising resource.
///
/// The resource is exclusive, so a second [`start`](Self::start) without a
/// [`stop`](Self::stop) is an error rather than a silent no-op.
pub struct Advertiser<R> {
    radio: R,
    active: Mutex<Option<Uuid>>,
}

impl<R: AdvertisingRadio> Advertiser<R> {
    /// Wraps a radio.
    pub fn new(radio: R) -> Self {
        Self {
            radio,
            active: Mutex::new(None),
        }
    }

    /// Starts advertising `service_id`.
    ///
    /// # Errors
    ///
    /// - [`AdvertiseError::AlreadyAdvertising`] if advertising is active
    /// - [`AdvertiseError::PayloadTooLarge`] if the encoded data exceeds
    ///   [`MAX_ADVERTISING_LEN`]
    /// - [`AdvertiseError::Radio`] if the radio refuses
    pub fn start(&self, service_id: Uuid) -> Result<(), AdvertiseError> {
        let mut active = self.active.lock();
        if active.is_some() {
            return Err(AdvertiseError::AlreadyAdvertising);
        }

        let data = AdvertisementData::for_service(service_id);
        let len = data.encode().len();
        if len > MAX_ADVERTISING_LEN {
            return Err(AdvertiseError::PayloadTooLarge {
                len,
                max: MAX_ADVERTISING_LEN,
            });
        }

        self.radio.start_advertising(&data)?;
        *active = Some(service_id);

        tracing::info!(service = %service_id, len, "Advertising started");
        Ok(())
    }

    /// Stops advertising. Does nothing if not advertising.
    pub fn stop(&self) {
        let mut active = self.active.lock();
        if let Some(service_id) = active.take() {
            self.radio.stop_advertising();
            tracing::info!(service = %service_id, "Advertising stopped");
        }
    }

    /// Returns true while advertising.
    #[must_use]
    pub fn is_advertising(&self) -> bool {
        self.active.lock().is_some()
    }
}

impl<R> std::fmt::Debug for Advertiser<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advertiser")
            .field("active", &*self.active.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::PlatformError;
    use crate::gatt::DEFAULT_SERVICE_UUID;

    #[derive(Default)]
    struct CountingRadio {
        starts: AtomicUsize,
        stops: AtomicUsize,
        refuse: bool,
    }

    impl AdvertisingRadio for CountingRadio {
        fn start_advertising(&self, _: &AdvertisementData) -> Result<(), PlatformError> {
            if self.refuse {
                return Err(PlatformError::RadioUnavailable);
            }
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop_advertising(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn encode_layout() {
        let uuid = Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);
        let bytes = AdvertisementData::for_service(uuid).encode();

        assert_eq!(&bytes[..5], &[0x02, 0x01, 0x06, 0x11, 0x07]);
        // little-endian on air
        assert_eq!(bytes[5], 0xff);
        assert_eq!(bytes[20], 0x00);
        assert!(bytes.len() <= MAX_ADVERTISING_LEN);
    }

    #[test]
    fn start_then_stop() {
        let advertiser = Advertiser::new(CountingRadio::default());

        advertiser.start(DEFAULT_SERVICE_UUID).unwrap();
        assert!(advertiser.is_advertising());

        advertiser.stop();
        assert!(!advertiser.is_advertising());
        assert_eq!(advertiser.radio.starts.load(Ordering::SeqCst), 1);
        assert_eq!(advertiser.radio.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn double_start_is_an_error() {
        let advertiser = Advertiser::new(CountingRadio::default());
        advertiser.start(DEFAULT_SERVICE_UUID).unwrap();

        assert_eq!(
            advertiser.start(DEFAULT_SERVICE_UUID),
            Err(AdvertiseError::AlreadyAdvertising)
        );
        assert_eq!(advertiser.radio.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn radio_failure_leaves_advertiser_idle() {
        let advertiser = Advertiser::new(CountingRadio {
            refuse: true,
            ..CountingRadio::default()
        });

        assert_eq!(
            advertiser.start(DEFAULT_SERVICE_UUID),
            Err(AdvertiseError::Radio(PlatformError::RadioUnavailable))
        );
        assert!(!advertiser.is_advertising());
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let advertiser = Advertiser::new(CountingRadio::default());
        advertiser.stop();
        assert_eq!(advertiser.radio.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn restart_after_stop() {
        let advertiser = Advertiser::new(CountingRadio::default());
        advertiser.start(DEFAULT_SERVICE_UUID).unwrap();
        advertiser.stop();
        advertiser.start(DEFAULT_SERVICE_UUID).unwrap();
        assert_eq!(advertiser.radio.starts.load(Ordering::SeqCst), 2);
    }
}
