// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Characteristic payload generation.
//!
//! Every notification cycle produces a fresh [`Payload`]: a sequence number
//! and a capture timestamp, serialized as compact JSON.
//!
//! ```text
//! {"timestamp":1732000000123,"count":7}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Source of wall-clock time for payload timestamps.
pub trait Clock: Send {
    /// Milliseconds since the Unix epoch, or `None` if the clock is unusable.
    fn now_millis(&self) -> Option<u64>;
}

/// The system wall clock.
///
/// Reports `None` when the clock is set before the epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Option<u64> {
        u64::try_from(chrono::Utc::now().timestamp_millis()).ok()
    }
}

/// One generated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Sequence number, starting at 0.
    pub count: u64,
}

impl Payload {
    /// Serializes the record to its wire form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        // Two integer fields always serialize.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Parses a record from its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if `bytes` is not a valid record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        serde_json::from_slice(bytes).map_err(Into::into)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"timestamp\":{},\"count\":{}}}",
            self.timestamp, self.count
        )
    }
}

/// Produces successive [`Payload`]s.
///
/// `count` goes 0, 1, 2, ... and `timestamp` never decreases, even if the
/// wall clock steps backwards. If the clock is unavailable the generator
/// falls back to a logical clock that advances one millisecond per record.
///
/// # Examples
///
/// ```
/// use gatt_notifier::payload::{Payload, PayloadGenerator};
///
/// let mut generator = PayloadGenerator::new();
/// let first = Payload::from_bytes(&generator.next()).unwrap();
/// let second = Payload::from_bytes(&generator.next()).unwrap();
///
/// assert_eq!(first.count, 0);
/// assert_eq!(second.count, 1);
/// assert!(second.timestamp >= first.timestamp);
/// ```
pub struct PayloadGenerator {
    clock: Box<dyn Clock>,
    count: u64,
    last_timestamp: Option<u64>,
}

impl PayloadGenerator {
    /// Creates a generator backed by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates a generator backed by a custom clock.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            count: 0,
            last_timestamp: None,
        }
    }

    /// Generates the next record and returns its wire form.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Vec<u8> {
        self.next_payload().to_bytes()
    }

    /// Generates the next record.
    pub fn next_payload(&mut self) -> Payload {
        let timestamp = match (self.clock.now_millis(), self.last_timestamp) {
            (Some(now), Some(last)) => now.max(last),
            (Some(now), None) => now,
            (None, Some(last)) => {
                tracing::debug!("Wall clock unavailable, using logical clock");
                last.saturating_add(1)
            }
            (None, None) => 0,
        };

        let payload = Payload {
            timestamp,
            count: self.count,
        };

        self.count = self.count.wrapping_add(1);
        self.last_timestamp = Some(timestamp);
        payload
    }

    /// Returns the `count` the next record will carry.
    #[must_use]
    pub fn peek_count(&self) -> u64 {
        self.count
    }
}

impl Default for PayloadGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PayloadGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadGenerator")
            .field("count", &self.count)
            .field("last_timestamp", &self.last_timestamp)
            .finish_non_exhaustive()
    }
}
