// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client Characteristic Configuration values.

/// Decoded value of a CCCD write.
///
/// The descriptor holds a 2-byte little-endian bit field. Only the exact
/// values `0x0001` and `0x0000` are recognized; anything else (including
/// the indicate bit, which this characteristic does not support) decodes
/// to [`CccdValue::Unrecognized`] and is handled as a disable. Writes of
/// the wrong length decode to [`CccdValue::Malformed`], also a disable.
///
/// # Examples
///
/// ```
/// use gatt_notifier::gatt::CccdValue;
///
/// assert_eq!(CccdValue::decode(&[0x01, 0x00]), CccdValue::Notify);
/// assert_eq!(CccdValue::decode(&[0x00, 0x00]), CccdValue::Disabled);
/// assert!(!CccdValue::decode(&[0x02, 0x00]).notifications_enabled());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CccdValue {
    /// `0x0000`: notifications off.
    Disabled,
    /// `0x0001`: notifications on.
    Notify,
    /// Any other 2-byte encoding.
    Unrecognized(u16),
    /// A write that was not exactly two bytes long.
    Malformed {
        /// Length of the write in bytes.
        len: usize,
    },
}

impl CccdValue {
    /// Wire encoding of [`CccdValue::Notify`].
    pub const ENABLE: [u8; 2] = 0x0001u16.to_le_bytes();

    /// Wire encoding of [`CccdValue::Disabled`].
    pub const DISABLE: [u8; 2] = 0x0000u16.to_le_bytes();

    /// Decodes a raw descriptor write.
    ///
    /// Writes that are not exactly two bytes long cannot be a valid
    /// configuration and decode as [`CccdValue::Malformed`].
    #[must_use]
    pub fn decode(value: &[u8]) -> Self {
        let raw = match value {
            [lo, hi] => u16::from_le_bytes([*lo, *hi]),
            _ => return Self::Malformed { len: value.len() },
        };

        match raw {
            0x0000 => Self::Disabled,
            0x0001 => Self::Notify,
            other => Self::Unrecognized(other),
        }
    }

    /// Returns the value the descriptor reads back as for a subscription flag.
    #[must_use]
    pub const fn encode(subscribed: bool) -> [u8; 2] {
        if subscribed {
            Self::ENABLE
        } else {
            Self::DISABLE
        }
    }

    /// Returns `true` only for an explicit enable.
    #[must_use]
    pub const fn notifications_enabled(self) -> bool {
        matches!(self, Self::Notify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_enable_and_disable() {
        assert_eq!(CccdValue::decode(&CccdValue::ENABLE), CccdValue::Notify);
        assert_eq!(CccdValue::decode(&CccdValue::DISABLE), CccdValue::Disabled);
    }

    #[test]
    fn unrecognized_values_fail_safe() {
        for raw in [[0x02, 0x00], [0x03, 0x00], [0x00, 0x01], [0xFF, 0xFF]] {
            let value = CccdValue::decode(&raw);
            assert!(matches!(value, CccdValue::Unrecognized(_)), "{raw:?}");
            assert!(!value.notifications_enabled());
        }
    }

    #[test]
    fn wrong_length_is_malformed() {
        assert_eq!(CccdValue::decode(&[]), CccdValue::Malformed { len: 0 });
        assert_eq!(CccdValue::decode(&[0x01]), CccdValue::Malformed { len: 1 });
        assert_eq!(
            CccdValue::decode(&[0x01, 0x00, 0x00]),
            CccdValue::Malformed { len: 3 }
        );
        assert!(!CccdValue::decode(&[0x01]).notifications_enabled());
    }

    #[test]
    fn all_ones_is_distinct_from_malformed() {
        assert_eq!(
            CccdValue::decode(&[0xFF, 0xFF]),
            CccdValue::Unrecognized(0xFFFF)
        );
        assert_ne!(
            CccdValue::decode(&[0xFF, 0xFF, 0xFF]),
            CccdValue::Unrecognized(0xFFFF)
        );
    }

    #[test]
    fn encode_reflects_flag() {
        assert_eq!(CccdValue::encode(true), [0x01, 0x00]);
        assert_eq!(CccdValue::encode(false), [0x00, 0x00]);
    }
}
