// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `gatt_notifier` - A BLE peripheral that publishes a periodically
//! refreshed value over GATT.
//!
//! The peripheral exposes one primary service holding one characteristic.
//! Centrals can read the characteristic at any time, and those that enable
//! notifications through its Client Characteristic Configuration Descriptor
//! receive every new value as it is generated.
//!
//! # Supported Features
//!
//! - **Service hosting**: register, advertise and tear down a single service
//! - **Reads**: characteristic reads (including blob reads) and CCCD reads
//! - **Subscriptions**: per-central notification opt-in that resets on
//!   reconnect
//! - **Notifications**: a fixed-period cycle pushing a JSON record
//!   `{"timestamp":..,"count":..}` to every subscriber
//! - **Events**: a broadcast stream of lifecycle, connection and cycle events
//!
//! The crate does not talk to a radio itself. A host binding implements
//! [`GattPlatform`] and [`AdvertisingRadio`], and forwards the stack's
//! callbacks to the server through [`GattEventHandler`].
//!
//! # Quick Start
//!
//! ```no_run
//! use gatt_notifier::{ConnectionState, DeviceId, GattEventHandler, GattServer};
//! # use gatt_notifier::{AdvertisingRadio, GattPlatform};
//!
//! # async fn example(platform: impl GattPlatform + 'static, radio: impl AdvertisingRadio + 'static)
//! # -> gatt_notifier::Result<()> {
//! let server = GattServer::new(platform, radio);
//! server.start()?;
//!
//! // Forwarded from the stack's connection callback
//! let central = DeviceId::from_bytes([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
//! server.on_connection_state_change(central, ConnectionState::Connected);
//!
//! // ...
//!
//! server.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Observing the Server
//!
//! ```no_run
//! use gatt_notifier::{GattServer, ServerEvent};
//! # use gatt_notifier::{AdvertisingRadio, GattPlatform};
//!
//! # async fn example(platform: impl GattPlatform + 'static, radio: impl AdvertisingRadio + 'static)
//! # -> gatt_notifier::Result<()> {
//! let server = GattServer::new(platform, radio);
//! let mut events = server.subscribe();
//! server.start()?;
//!
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         ServerEvent::SubscriptionChanged { device_id, subscribed } => {
//!             println!("{device_id} subscribed: {subscribed}");
//!         }
//!         ServerEvent::NotificationCycle { count, delivered, failed } => {
//!             println!("#{count}: {delivered} sent, {failed} failed");
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod advertiser;
pub mod error;
pub mod event;
pub mod gatt;
pub mod payload;
pub mod platform;
pub mod scheduler;
pub mod server;
pub mod subscription;

pub use advertiser::{AdvertisementData, Advertiser};
pub use error::{AdvertiseError, DeliveryError, Error, ParseError, PlatformError, Result};
pub use event::{DeviceId, EventBus, ServerEvent};
pub use gatt::{
    CCCD_UUID, CccdValue, ConnectionState, DEFAULT_CHARACTERISTIC_UUID, DEFAULT_SERVICE_UUID,
    GattStatus, ReadRequest, ServiceDefinition, WriteRequest,
};
pub use payload::{Clock, Payload, PayloadGenerator, SystemClock};
pub use platform::{AdvertisingRadio, GattEventHandler, GattPlatform};
pub use server::{GattServer, GattServerBuilder, Lifecycle, ServerConfig};
pub use subscription::SubscriptionRegistry;
