// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Central device identifier type.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Identifier of a connected central.
///
/// Wraps the 48-bit link-layer address the stack reports for the peer. The
/// address is stable for the lifetime of a connection, which is all the
/// server relies on: it keys connection and subscription records.
///
/// The bytes are stored most significant first, matching the textual form.
///
/// # Examples
///
/// ```
/// use gatt_notifier::event::DeviceId;
///
/// let id: DeviceId = "C0:FF:EE:00:00:01".parse().unwrap();
/// assert_eq!(id.to_string(), "C0:FF:EE:00:00:01");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId([u8; 6]);

impl DeviceId {
    /// Creates a device identifier from a raw address.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Returns the raw address bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({self})")
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for DeviceId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split([':', '-']);

        for byte in &mut bytes {
            let part = parts
                .next()
                .filter(|p| p.len() == 2)
                .ok_or_else(|| ParseError::InvalidAddress(s.to_string()))?;
            *byte = u8::from_str_radix(part, 16)
                .map_err(|_| ParseError::InvalidAddress(s.to_string()))?;
        }

        if parts.next().is_some() {
            return Err(ParseError::InvalidAddress(s.to_string()));
        }

        Ok(Self(bytes))
    }
}

impl From<[u8; 6]> for DeviceId {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_colon_separated() {
        let id: DeviceId = "a1:b2:c3:d4:e5:f6".parse().unwrap();
        assert_eq!(id.as_bytes(), &[0xA1, 0xB2, 0xC3, 0xD4, 0xE5, 0xF6]);
    }

    #[test]
    fn parse_dash_separated() {
        let id: DeviceId = "00-11-22-33-44-55".parse().unwrap();
        assert_eq!(id, DeviceId::from_bytes([0, 0x11, 0x22, 0x33, 0x44, 0x55]));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("00:11:22:33:44".parse::<DeviceId>().is_err());
        assert!("00:11:22:33:44:55:66".parse::<DeviceId>().is_err());
        assert!("00:11:22:33:44:5".parse::<DeviceId>().is_err());
        assert!("00:11:22:33:44:zz".parse::<DeviceId>().is_err());
        assert!("".parse::<DeviceId>().is_err());
    }

    #[test]
    fn display_is_uppercase() {
        let id = DeviceId::from_bytes([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        assert_eq!(id.to_string(), "DE:AD:BE:EF:00:01");
    }

    #[test]
    fn debug_format() {
        let id = DeviceId::from_bytes([1, 2, 3, 4, 5, 6]);
        assert_eq!(format!("{id:?}"), "DeviceId(01:02:03:04:05:06)");
    }

    #[test]
    fn hashable() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        let id = DeviceId::from_bytes([9; 6]);
        set.insert(id);
        assert!(set.contains(&DeviceId::from_bytes([9; 6])));
    }
}
