// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the GATT notifier.
//!
//! Only resource errors (radio, registration, advertising) ever reach the
//! host through [`Error`]. Protocol misuse by a central is answered locally
//! with a [`GattStatus`](crate::gatt::GattStatus), and notification delivery
//! failures ([`DeliveryError`]) are logged and dropped.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The host platform refused a GATT operation.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Advertising could not be started.
    #[error("advertise error: {0}")]
    Advertise(#[from] AdvertiseError),

    /// `start()` was called on a server that is already running.
    #[error("server is already running")]
    AlreadyRunning,

    /// `start()` was called while `stop()` is still tearing the server down.
    #[error("server is stopping")]
    Stopping,

    /// `start()` was called outside of a tokio runtime.
    #[error("no tokio runtime available to drive the notification timer")]
    NoRuntime,

    /// The server configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors reported by the host BLE stack.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The Bluetooth radio is off, missing or not authorized.
    #[error("bluetooth radio unavailable")]
    RadioUnavailable,

    /// The GATT service could not be registered.
    #[error("service registration failed: {0}")]
    RegistrationFailed(String),

    /// Any other radio-level failure.
    #[error("radio failure: {0}")]
    Radio(String),
}

/// Errors related to the advertisement lifecycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdvertiseError {
    /// Advertising was started twice without an intervening stop.
    #[error("already advertising")]
    AlreadyAdvertising,

    /// The encoded advertisement does not fit a legacy advertising PDU.
    #[error("advertisement is {len} bytes, limit is {max}")]
    PayloadTooLarge {
        /// Encoded length in bytes.
        len: usize,
        /// Maximum allowed length in bytes.
        max: usize,
    },

    /// The radio rejected the advertisement.
    #[error("radio rejected advertisement: {0}")]
    Radio(#[from] PlatformError),
}

/// Failure to hand a notification to a central.
///
/// These never propagate to the caller; the next cycle supersedes the value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The central disconnected before the notification was sent.
    #[error("device is not connected")]
    NotConnected,

    /// The stack refused the notification (queue full, link busy, ...).
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Errors related to parsing wire values.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A device address string was malformed.
    #[error("invalid device address: {0}")]
    InvalidAddress(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_too_large_display() {
        let err = AdvertiseError::PayloadTooLarge { len: 40, max: 31 };
        assert_eq!(err.to_string(), "advertisement is 40 bytes, limit is 31");
    }

    #[test]
    fn error_from_advertise_error() {
        let err: Error = AdvertiseError::AlreadyAdvertising.into();
        assert!(matches!(
            err,
            Error::Advertise(AdvertiseError::AlreadyAdvertising)
        ));
    }

    #[test]
    fn advertise_error_from_platform_error() {
        let err: AdvertiseError = PlatformError::RadioUnavailable.into();
        assert_eq!(
            err.to_string(),
            "radio rejected advertisement: bluetooth radio unavailable"
        );
    }

    #[test]
    fn lifecycle_errors_are_distinct() {
        assert_eq!(Error::AlreadyRunning.to_string(), "server is already running");
        assert_eq!(Error::Stopping.to_string(), "server is stopping");
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::InvalidAddress("zz".to_string());
        assert_eq!(err.to_string(), "invalid device address: zz");
    }
}
