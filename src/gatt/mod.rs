// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GATT data model: the service layout, CCCD values, and the request and
//! status types exchanged with the host stack.

mod cccd;
mod request;
mod service;

pub use cccd::CccdValue;
pub use request::{ConnectionState, GattStatus, ReadRequest, WriteRequest};
pub use service::{
    CCCD_UUID, CharacteristicDefinition, DEFAULT_CHARACTERISTIC_UUID, DEFAULT_SERVICE_UUID,
    DescriptorDefinition, Permissions, Properties, ServiceDefinition, uuid_from_u16,
};
