// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GATT server state machine and notification engine.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::advertiser::Advertiser;
use crate::error::{Error, Result};
use crate::event::{DeviceId, EventBus, ServerEvent};
use crate::gatt::{
    CCCD_UUID, CccdValue, ConnectionState, GattStatus, ReadRequest, ServiceDefinition,
    WriteRequest,
};
use crate::payload::{Clock, PayloadGenerator};
use crate::platform::{AdvertisingRadio, GattEventHandler, GattPlatform};
use crate::scheduler::{PeriodicTimer, TimerHandle};
use crate::subscription::SubscriptionRegistry;

use super::ServerConfig;

/// Lifecycle of a [`GattServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, never started.
    Idle,
    /// Registered, advertising and notifying.
    Running,
    /// `stop()` is tearing the server down.
    Stopping,
    /// Torn down; may be started again.
    Stopped,
}

impl Lifecycle {
    /// Returns true while the server accepts connections and notifies.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Everything mutated by protocol events, behind one lock.
struct ServerState {
    lifecycle: Lifecycle,
    registry: SubscriptionRegistry,
    current_value: Arc<[u8]>,
    generator: PayloadGenerator,
}

struct Inner<P, R> {
    platform: P,
    advertiser: Advertiser<R>,
    definition: ServiceDefinition,
    config: ServerConfig,
    state: Mutex<ServerState>,
    timer: Mutex<Option<TimerHandle>>,
    event_bus: EventBus,
}

/// BLE peripheral GATT server.
///
/// Owns one service with one readable, notifiable characteristic and its
/// CCCD. Centrals connect, read the current value at any time, and write
/// the CCCD to receive a notification every cycle.
///
/// The host drives the server two ways: it calls [`start`](Self::start) and
/// [`stop`](Self::stop), and it forwards stack callbacks through the
/// [`GattEventHandler`] implementation.
///
/// `GattServer` is cheaply cloneable (via `Arc`); clones share all state.
///
/// # Examples
///
/// ```no_run
/// use gatt_notifier::server::GattServer;
/// # use gatt_notifier::platform::{GattPlatform, AdvertisingRadio};
/// # async fn example(platform: impl GattPlatform + 'static, radio: impl AdvertisingRadio + 'static)
/// # -> gatt_notifier::Result<()> {
/// let server = GattServer::new(platform, radio);
/// let mut events = server.subscribe();
///
/// server.start()?;
///
/// tokio::spawn(async move {
///     while let Ok(event) = events.recv().await {
///         println!("{event:?}");
///     }
/// });
///
/// // ... later
/// server.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct GattServer<P, R> {
    inner: Arc<Inner<P, R>>,
}

impl<P, R> Clone for GattServer<P, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, R> GattServer<P, R>
where
    P: GattPlatform + 'static,
    R: AdvertisingRadio + 'static,
{
    /// Creates a server with the default configuration and system clock.
    pub fn new(platform: P, radio: R) -> Self {
        Self::from_parts(
            platform,
            radio,
            ServerConfig::default(),
            PayloadGenerator::new(),
        )
    }

    /// Creates a builder for a customized server.
    pub fn builder(platform: P, radio: R) -> GattServerBuilder<P, R> {
        GattServerBuilder {
            platform,
            radio,
            config: ServerConfig::default(),
            generator: PayloadGenerator::new(),
        }
    }

    fn from_parts(platform: P, radio: R, config: ServerConfig, generator: PayloadGenerator) -> Self {
        let definition = config.service_definition();
        let event_bus = EventBus::with_capacity(config.event_capacity);

        Self {
            inner: Arc::new(Inner {
                platform,
                advertiser: Advertiser::new(radio),
                definition,
                config,
                state: Mutex::new(ServerState {
                    lifecycle: Lifecycle::Idle,
                    registry: SubscriptionRegistry::new(),
                    current_value: Arc::from(Vec::new()),
                    generator,
                }),
                timer: Mutex::new(None),
                event_bus,
            }),
        }
    }

    /// Registers the service, starts advertising and arms the notification
    /// timer.
    ///
    /// An initial value (`count` 0) is generated so that reads before the
    /// first cycle return a real record.
    ///
    /// Nothing is retried: on failure everything acquired so far is released
    /// and the error is returned so the host can decide what to do.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRunning`] if the server is running
    /// - [`Error::Stopping`] if a `stop()` is still tearing the server down
    /// - [`Error::NoRuntime`] if called outside a tokio runtime
    /// - [`Error::Platform`] if the service cannot be registered
    /// - [`Error::Advertise`] if advertising cannot be started
    pub fn start(&self) -> Result<()> {
        let inner = &self.inner;
        let mut state = inner.state.lock();

        match state.lifecycle {
            Lifecycle::Running => return Err(Error::AlreadyRunning),
            Lifecycle::Stopping => return Err(Error::Stopping),
            Lifecycle::Idle | Lifecycle::Stopped => {}
        }
        tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;

        inner.platform.register_service(&inner.definition)?;

        if let Err(e) = inner.advertiser.start(inner.definition.uuid) {
            tracing::warn!(error = %e, "Advertising failed, releasing service");
            inner.platform.unregister_service();
            return Err(e.into());
        }

        let timer = PeriodicTimer::new(inner.config.initial_delay, inner.config.notify_period);
        let weak = Arc::downgrade(&self.inner);
        let handle = match timer.spawn(move || notification_tick(&weak)) {
            Ok(handle) => handle,
            Err(e) => {
                inner.advertiser.stop();
                inner.platform.unregister_service();
                return Err(e);
            }
        };

        state.current_value = state.generator.next().into();
        state.lifecycle = Lifecycle::Running;
        *inner.timer.lock() = Some(handle);
        drop(state);

        tracing::info!(
            service = %inner.definition.uuid,
            characteristic = %inner.definition.characteristic_uuid(),
            period_ms = inner.config.notify_period.as_millis(),
            "GATT server started"
        );
        inner.event_bus.publish(ServerEvent::Started);
        Ok(())
    }

    /// Tears the server down.
    ///
    /// Cancels the timer, stops advertising and releases the service, in
    /// that order. Once this returns no notification cycle will run until
    /// the server is started again. Does nothing if the server is not
    /// running.
    ///
    /// Cancel safe: if the returned future is dropped before completion the
    /// timer task is aborted and the rest of the teardown still runs.
    pub async fn stop(&self) {
        let inner = &self.inner;

        let timer = {
            let mut state = inner.state.lock();
            if !state.lifecycle.is_running() {
                return;
            }
            state.lifecycle = Lifecycle::Stopping;
            inner.timer.lock().take()
        };

        let teardown = Teardown { inner };
        if let Some(timer) = timer {
            timer.cancel().await;
        }
        drop(teardown);
    }
}

/// Finishes a `stop()` when dropped, whether or not the timer wait completed.
struct Teardown<'a, P: GattPlatform, R: AdvertisingRadio> {
    inner: &'a Inner<P, R>,
}

impl<P: GattPlatform, R: AdvertisingRadio> Drop for Teardown<'_, P, R> {
    fn drop(&mut self) {
        let inner = self.inner;
        inner.advertiser.stop();

        {
            let mut state = inner.state.lock();
            let dropped = state.registry.connected_count();
            state.registry.clear();
            inner.platform.unregister_service();
            state.lifecycle = Lifecycle::Stopped;
            tracing::info!(dropped_connections = dropped, "GATT server stopped");
        }

        inner.event_bus.publish(ServerEvent::Stopped);
    }
}

impl<P, R> GattServer<P, R>
where
    P: GattPlatform,
    R: AdvertisingRadio,
{
    /// Runs one notification cycle.
    ///
    /// Generates a new value, makes it the current value, then notifies
    /// every subscribed central once. Called by the internal timer; hosts
    /// with their own scheduler may call it directly. Does nothing unless
    /// the server is running.
    pub fn on_notification_cycle(&self) {
        self.inner.notification_cycle();
    }

    /// Returns the most recently generated value.
    ///
    /// Empty until the server is first started.
    #[must_use]
    pub fn current_value(&self) -> Arc<[u8]> {
        Arc::clone(&self.inner.state.lock().current_value)
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.state.lock().lifecycle
    }

    /// Returns true while the server is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lifecycle().is_running()
    }

    /// Returns true while the service is advertised.
    #[must_use]
    pub fn is_advertising(&self) -> bool {
        self.inner.advertiser.is_advertising()
    }

    /// Returns a snapshot of the connected centrals.
    #[must_use]
    pub fn connected_devices(&self) -> HashSet<DeviceId> {
        self.inner.state.lock().registry.connected_devices()
    }

    /// Returns a snapshot of the centrals receiving notifications.
    #[must_use]
    pub fn subscribed_devices(&self) -> HashSet<DeviceId> {
        self.inner.state.lock().registry.subscribed_devices()
    }

    /// Returns the registered service layout.
    #[must_use]
    pub fn service_definition(&self) -> &ServiceDefinition {
        &self.inner.definition
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Subscribes to server events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.inner.event_bus.subscribe()
    }
}

/// Timer callback. Holds only a weak reference so the timer task does not
/// keep a dropped server alive.
fn notification_tick<P: GattPlatform, R: AdvertisingRadio>(weak: &Weak<Inner<P, R>>) {
    if let Some(inner) = weak.upgrade() {
        inner.notification_cycle();
    }
}

impl<P: GattPlatform, R: AdvertisingRadio> Inner<P, R> {
    fn notification_cycle(&self) {
        let mut state = self.state.lock();
        if !state.lifecycle.is_running() {
            tracing::trace!(lifecycle = ?state.lifecycle, "Skipping notification cycle");
            return;
        }

        let payload = state.generator.next_payload();
        let value: Arc<[u8]> = payload.to_bytes().into();
        state.current_value = Arc::clone(&value);

        let characteristic = self.definition.characteristic_uuid();
        let mut delivered = 0;
        let mut failed = 0;

        for device in state.registry.subscribed_devices() {
            match self.platform.notify(device, characteristic, &value) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    tracing::debug!(device = %device, error = %e, "Notification not delivered");
                }
            }
        }
        drop(state);

        tracing::debug!(
            count = payload.count,
            delivered,
            failed,
            "Notification cycle complete"
        );
        self.event_bus.publish(ServerEvent::NotificationCycle {
            count: payload.count,
            delivered,
            failed,
        });
    }

    /// Answers a read with `value[offset..]`.
    fn respond_with_value(&self, device: DeviceId, request: ReadRequest, value: &[u8]) {
        match value.get(usize::from(request.offset)..) {
            Some(slice) => self.platform.send_response(
                device,
                request.request_id,
                GattStatus::Success,
                request.offset,
                slice,
            ),
            None => {
                tracing::debug!(
                    device = %device,
                    offset = request.offset,
                    len = value.len(),
                    "Read offset past end of value"
                );
                self.platform.send_response(
                    device,
                    request.request_id,
                    GattStatus::InvalidOffset,
                    request.offset,
                    &[],
                );
            }
        }
    }

    fn respond_failure(&self, device: DeviceId, request_id: u32, offset: u16) {
        self.platform
            .send_response(device, request_id, GattStatus::Failure, offset, &[]);
    }
}

impl<P: GattPlatform, R: AdvertisingRadio> GattEventHandler for GattServer<P, R> {
    fn on_connection_state_change(&self, device: DeviceId, state: ConnectionState) {
        let inner = &self.inner;

        match state {
            ConnectionState::Connected => {
                {
                    let mut server = inner.state.lock();
                    if !server.lifecycle.is_running() {
                        tracing::debug!(device = %device, "Connection while not running ignored");
                        return;
                    }
                    server.registry.connect(device);
                }
                tracing::info!(device = %device, "Central connected");
                inner
                    .event_bus
                    .publish(ServerEvent::DeviceConnected { device_id: device });
            }
            ConnectionState::Disconnected => {
                let removed = inner.state.lock().registry.disconnect(device);
                if removed {
                    tracing::info!(device = %device, "Central disconnected");
                    inner
                        .event_bus
                        .publish(ServerEvent::DeviceDisconnected { device_id: device });
                } else {
                    tracing::debug!(device = %device, "Disconnect for unknown central ignored");
                }
            }
        }
    }

    fn on_characteristic_read(&self, device: DeviceId, request: ReadRequest) {
        let inner = &self.inner;

        let value = {
            let state = inner.state.lock();
            if !state.registry.is_connected(device) {
                tracing::debug!(device = %device, "Read from unknown central ignored");
                return;
            }
            Arc::clone(&state.current_value)
        };

        if request.attribute != inner.definition.characteristic_uuid() {
            tracing::debug!(device = %device, attribute = %request.attribute, "Read of unknown characteristic");
            inner.respond_failure(device, request.request_id, request.offset);
            return;
        }

        tracing::trace!(device = %device, offset = request.offset, "Characteristic read");
        inner.respond_with_value(device, request, &value);
    }

    fn on_descriptor_read(&self, device: DeviceId, request: ReadRequest) {
        let inner = &self.inner;

        let subscribed = {
            let state = inner.state.lock();
            if !state.registry.is_connected(device) {
                tracing::debug!(device = %device, "Descriptor read from unknown central ignored");
                return;
            }
            state.registry.is_subscribed(device)
        };

        if request.attribute != CCCD_UUID {
            tracing::debug!(device = %device, attribute = %request.attribute, "Read of unknown descriptor");
            inner.respond_failure(device, request.request_id, request.offset);
            return;
        }

        inner.respond_with_value(device, request, &CccdValue::encode(subscribed));
    }

    fn on_descriptor_write(&self, device: DeviceId, request: WriteRequest) {
        let inner = &self.inner;

        let decoded = CccdValue::decode(&request.value);
        let subscribed = decoded.notifications_enabled();

        let changed = {
            let mut state = inner.state.lock();
            if !state.registry.is_connected(device) {
                tracing::debug!(device = %device, "Descriptor write from unknown central ignored");
                return;
            }

            if request.attribute != CCCD_UUID {
                drop(state);
                tracing::debug!(device = %device, attribute = %request.attribute, "Write to unknown descriptor");
                if request.response_needed {
                    inner.respond_failure(device, request.request_id, 0);
                }
                return;
            }

            let previous = state.registry.is_subscribed(device);
            state.registry.set_subscribed(device, subscribed);
            previous != subscribed
        };

        match decoded {
            CccdValue::Unrecognized(raw) => {
                tracing::warn!(device = %device, value = raw, "Unrecognized CCCD value, notifications disabled");
            }
            CccdValue::Malformed { len } => {
                tracing::warn!(device = %device, len, "Malformed CCCD write, notifications disabled");
            }
            CccdValue::Disabled | CccdValue::Notify => {}
        }

        // The write is always accepted; the client's bytes are echoed back.
        if request.response_needed {
            inner.platform.send_response(
                device,
                request.request_id,
                GattStatus::Success,
                0,
                &request.value,
            );
        }

        if changed {
            tracing::info!(device = %device, subscribed, "Subscription changed");
            inner.event_bus.publish(ServerEvent::SubscriptionChanged {
                device_id: device,
                subscribed,
            });
        } else {
            tracing::debug!(device = %device, subscribed, "CCCD write left subscription unchanged");
        }
    }
}

impl<P, R> fmt::Debug for GattServer<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("GattServer")
            .field("service", &self.inner.definition.uuid)
            .field("lifecycle", &state.lifecycle)
            .field("connected", &state.registry.connected_count())
            .finish_non_exhaustive()
    }
}

/// Builder for a [`GattServer`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use gatt_notifier::server::{GattServer, ServerConfig};
/// # use gatt_notifier::platform::{GattPlatform, AdvertisingRadio};
/// # fn example(platform: impl GattPlatform + 'static, radio: impl AdvertisingRadio + 'static)
/// # -> gatt_notifier::Result<()> {
/// let server = GattServer::builder(platform, radio)
///     .config(ServerConfig::new().with_notify_period(Duration::from_secs(1)))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct GattServerBuilder<P, R> {
    platform: P,
    radio: R,
    config: ServerConfig,
    generator: PayloadGenerator,
}

impl<P, R> GattServerBuilder<P, R>
where
    P: GattPlatform + 'static,
    R: AdvertisingRadio + 'static,
{
    /// Sets the server configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the clock used for payload timestamps.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.generator = PayloadGenerator::with_clock(clock);
        self
    }

    /// Builds the server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration does not validate.
    pub fn build(self) -> Result<GattServer<P, R>> {
        self.config.validate()?;
        Ok(GattServer::from_parts(
            self.platform,
            self.radio,
            self.config,
            self.generator,
        ))
    }
}

impl<P, R> fmt::Debug for GattServerBuilder<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GattServerBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
