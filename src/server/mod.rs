// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The notifying GATT server.
//!
//! # Overview
//!
//! [`GattServer`] ties the pieces of the crate together:
//!
//! - **Service**: one primary service with one characteristic (read, notify)
//!   and its CCCD, registered on [`start`](GattServer::start)
//! - **Advertising**: the service identity is advertised while running
//! - **Subscriptions**: centrals opt in by writing the CCCD
//! - **Notifications**: every period a fresh value is generated, becomes
//!   readable and is pushed to each subscriber
//! - **Events**: observers follow the server through [`ServerEvent`]s
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use gatt_notifier::event::ServerEvent;
//! use gatt_notifier::server::{GattServer, ServerConfig};
//! # use gatt_notifier::platform::{GattPlatform, AdvertisingRadio};
//!
//! # async fn example(platform: impl GattPlatform + 'static, radio: impl AdvertisingRadio + 'static)
//! # -> gatt_notifier::Result<()> {
//! let server = GattServer::builder(platform, radio)
//!     .config(ServerConfig::new().with_notify_period(Duration::from_secs(2)))
//!     .build()?;
//!
//! let mut events = server.subscribe();
//! server.start()?;
//!
//! while let Ok(event) = events.recv().await {
//!     if let ServerEvent::NotificationCycle { count, delivered, .. } = event {
//!         println!("cycle {count} reached {delivered} centrals");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ServerEvent`]: crate::event::ServerEvent

mod gatt_server;
mod server_config;

pub use gatt_server::{GattServer, GattServerBuilder, Lifecycle};
pub use server_config::{DEFAULT_NOTIFY_PERIOD, ServerConfig};
