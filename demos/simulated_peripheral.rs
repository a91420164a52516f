// SPDX-License-Identifier: MPL-2.0

//! Demo program: Run the notifier against an in-process simulated BLE stack.
//!
//! A simulated central connects, reads the characteristic, enables
//! notifications, and later disconnects and reconnects without
//! re-subscribing. Notifications are printed until Ctrl-C.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example simulated_peripheral -- [period_secs]
//! ```
//!
//! # Example
//!
//! ```bash
//! # One notification per second, with debug logs
//! RUST_LOG=gatt_notifier=debug cargo run --example simulated_peripheral -- 1
//! ```

use std::env;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use gatt_notifier::{
    AdvertisementData, AdvertisingRadio, CCCD_UUID, CccdValue, ConnectionState, DeliveryError,
    DeviceId, GattEventHandler, GattPlatform, GattServer, GattStatus, Payload, PlatformError,
    ReadRequest, ServerConfig, ServerEvent, ServiceDefinition, WriteRequest,
};

/// Stack that prints what a real radio would send.
struct LoggingStack;

impl GattPlatform for LoggingStack {
    fn register_service(&self, definition: &ServiceDefinition) -> Result<(), PlatformError> {
        tracing::info!(service = %definition.uuid, "[stack] service registered");
        Ok(())
    }

    fn unregister_service(&self) {
        tracing::info!("[stack] service removed");
    }

    fn send_response(
        &self,
        device: DeviceId,
        request_id: u32,
        status: GattStatus,
        offset: u16,
        value: &[u8],
    ) {
        println!(
            "  -> response #{request_id} to {device}: {status:?} offset={offset} {}",
            String::from_utf8_lossy(value)
        );
    }

    fn notify(&self, device: DeviceId, _: Uuid, value: &[u8]) -> Result<(), DeliveryError> {
        match Payload::from_bytes(value) {
            Ok(payload) => println!("  -> notify {device}: {payload}"),
            Err(e) => println!("  -> notify {device}: <{e}>"),
        }
        Ok(())
    }
}

impl AdvertisingRadio for LoggingStack {
    fn start_advertising(&self, data: &AdvertisementData) -> Result<(), PlatformError> {
        tracing::info!(bytes = data.encode().len(), "[stack] advertising");
        Ok(())
    }

    fn stop_advertising(&self) {
        tracing::info!("[stack] advertising stopped");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let period = match env::args().nth(1) {
        Some(arg) => Duration::from_secs(arg.parse()?),
        None => Duration::from_secs(2),
    };

    let server = GattServer::builder(LoggingStack, LoggingStack)
        .config(
            ServerConfig::new()
                .with_notify_period(period)
                .with_initial_delay(period),
        )
        .build()?;

    let mut events = server.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let ServerEvent::NotificationCycle { count, delivered, failed } = event {
                tracing::info!(count, delivered, failed, "[event] cycle");
            } else {
                tracing::info!(?event, "[event]");
            }
        }
    });

    server.start()?;
    println!("Peripheral running, press Ctrl-C to stop");

    let central = DeviceId::from_bytes([0x5A, 0x11, 0x22, 0x33, 0x44, 0x55]);
    let characteristic = server.service_definition().characteristic_uuid();
    let simulation = {
        let server = server.clone();
        tokio::spawn(async move {
            println!("central {central} connects and reads");
            server.on_connection_state_change(central, ConnectionState::Connected);
            server.on_characteristic_read(central, ReadRequest::new(1, characteristic));

            println!("central {central} enables notifications");
            server.on_descriptor_write(central, WriteRequest::new(2, CCCD_UUID, CccdValue::ENABLE));

            tokio::time::sleep(period * 3 + period / 2).await;
            println!("central {central} drops and reconnects");
            server.on_connection_state_change(central, ConnectionState::Disconnected);
            server.on_connection_state_change(central, ConnectionState::Connected);

            tokio::time::sleep(period * 2).await;
            println!("central {central} reads again (no notifications since reconnect)");
            server.on_characteristic_read(central, ReadRequest::new(3, characteristic));
        })
    };

    tokio::signal::ctrl_c().await?;
    simulation.abort();

    println!("Stopping...");
    server.stop().await;

    Ok(())
}
