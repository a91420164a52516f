// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Central identities and server events.
//!
//! [`DeviceId`] names a connected central. The server reports what happens
//! to those centrals (and to itself) as [`ServerEvent`]s on an [`EventBus`].
//!
//! # Examples
//!
//! ```
//! use gatt_notifier::event::{DeviceId, EventBus, ServerEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! let device_id: DeviceId = "11:22:33:44:55:66".parse().unwrap();
//! bus.publish(ServerEvent::DeviceConnected { device_id });
//! ```

mod device_id;
mod event_bus;
mod server_event;

pub use device_id::DeviceId;
pub(crate) use event_bus::DEFAULT_EVENT_CAPACITY;
pub use event_bus::EventBus;
pub use server_event::ServerEvent;
