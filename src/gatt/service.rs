// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static GATT attribute layout.

use std::fmt;
use std::ops::BitOr;

use uuid::Uuid;

/// Default primary service identity.
pub const DEFAULT_SERVICE_UUID: Uuid = Uuid::from_u128(0x9835_d696_923d_44ca_a5ea_d252_ae32_97b9);

/// Default characteristic identity.
pub const DEFAULT_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x7ab6_1943_bbb5_49d6_88c8_9618_5a98_e587);

/// Client Characteristic Configuration Descriptor (0x2902).
pub const CCCD_UUID: Uuid = uuid_from_u16(0x2902);

/// Expands a 16-bit SIG-assigned number onto the Bluetooth base UUID.
#[must_use]
#[allow(clippy::cast_lossless)] // `u128::from` is not const
pub const fn uuid_from_u16(short: u16) -> Uuid {
    Uuid::from_u128(0x0000_0000_0000_1000_8000_0080_5f9b_34fb | ((short as u128) << 96))
}

/// Characteristic property bits as they appear in the declaration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Properties(u8);

impl Properties {
    /// Value may be read.
    pub const READ: Self = Self(0x02);
    /// Value may be written with response.
    pub const WRITE: Self = Self(0x08);
    /// Value changes are pushed without acknowledgment.
    pub const NOTIFY: Self = Self(0x10);
    /// Value changes are pushed with acknowledgment.
    pub const INDICATE: Self = Self(0x20);

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Properties {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Properties({:#04x})", self.0)
    }
}

/// Attribute access permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permissions {
    /// Attribute may be read.
    pub read: bool,
    /// Attribute may be written.
    pub write: bool,
}

impl Permissions {
    /// Read-only access.
    pub const READ: Self = Self {
        read: true,
        write: false,
    };

    /// Read and write access.
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
    };
}

/// A descriptor attached to the characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorDefinition {
    /// Descriptor identity.
    pub uuid: Uuid,
    /// Access permissions.
    pub permissions: Permissions,
}

/// The single characteristic exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicDefinition {
    /// Characteristic identity.
    pub uuid: Uuid,
    /// Declared properties.
    pub properties: Properties,
    /// Value access permissions.
    pub permissions: Permissions,
    /// The subscription-control descriptor.
    pub cccd: DescriptorDefinition,
}

/// The immutable service layout registered with the stack.
///
/// One primary service, one readable and notifiable characteristic, and the
/// CCCD that lets a central switch notifications on and off.
///
/// # Examples
///
/// ```
/// use gatt_notifier::gatt::{CCCD_UUID, Properties, ServiceDefinition};
///
/// let definition = ServiceDefinition::default();
/// assert!(definition.primary);
/// assert!(definition.characteristic.properties.contains(Properties::NOTIFY));
/// assert_eq!(definition.characteristic.cccd.uuid, CCCD_UUID);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDefinition {
    /// Service identity.
    pub uuid: Uuid,
    /// Always `true`: the service is primary.
    pub primary: bool,
    /// The notifying characteristic.
    pub characteristic: CharacteristicDefinition,
}

impl ServiceDefinition {
    /// Builds the layout for the given service and characteristic identities.
    #[must_use]
    pub const fn new(service_uuid: Uuid, characteristic_uuid: Uuid) -> Self {
        Self {
            uuid: service_uuid,
            primary: true,
            characteristic: CharacteristicDefinition {
                uuid: characteristic_uuid,
                properties: Properties(Properties::READ.0 | Properties::NOTIFY.0),
                permissions: Permissions::READ,
                cccd: DescriptorDefinition {
                    uuid: CCCD_UUID,
                    permissions: Permissions::READ_WRITE,
                },
            },
        }
    }

    /// Returns the characteristic identity.
    #[must_use]
    pub const fn characteristic_uuid(&self) -> Uuid {
        self.characteristic.uuid
    }
}

impl Default for ServiceDefinition {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_UUID, DEFAULT_CHARACTERISTIC_UUID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cccd_uuid_matches_sig_assignment() {
        assert_eq!(
            CCCD_UUID.to_string(),
            "00002902-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn short_uuid_expands_onto_base() {
        assert_eq!(
            uuid_from_u16(0x180D).to_string(),
            "0000180d-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            uuid_from_u16(0xFFFF).to_string(),
            "0000ffff-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn default_uuids() {
        assert_eq!(
            DEFAULT_SERVICE_UUID.to_string(),
            "9835d696-923d-44ca-a5ea-d252ae3297b9"
        );
        assert_eq!(
            DEFAULT_CHARACTERISTIC_UUID.to_string(),
            "7ab61943-bbb5-49d6-88c8-96185a98e587"
        );
    }

    #[test]
    fn characteristic_is_read_notify() {
        let definition = ServiceDefinition::default();
        let props = definition.characteristic.properties;

        assert_eq!(props, Properties::READ | Properties::NOTIFY);
        assert!(!props.contains(Properties::WRITE));
        assert!(!props.contains(Properties::INDICATE));
        assert_eq!(definition.characteristic.permissions, Permissions::READ);
    }

    #[test]
    fn cccd_is_read_write() {
        let definition = ServiceDefinition::default();
        assert_eq!(
            definition.characteristic.cccd.permissions,
            Permissions::READ_WRITE
        );
    }

    #[test]
    fn properties_debug() {
        let props = Properties::READ | Properties::NOTIFY;
        assert_eq!(format!("{props:?}"), "Properties(0x12)");
    }
}
