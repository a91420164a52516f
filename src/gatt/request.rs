// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Requests delivered by the stack and the statuses used to answer them.

use uuid::Uuid;

/// Link state reported for a central.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// The link is up.
    Connected,
    /// The link is gone.
    Disconnected,
}

impl ConnectionState {
    /// Returns true if the link is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl From<bool> for ConnectionState {
    fn from(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

/// ATT/GATT status sent back with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GattStatus {
    /// The request succeeded.
    Success,
    /// The requested offset is past the end of the value.
    InvalidOffset,
    /// Generic failure.
    Failure,
}

impl GattStatus {
    /// Returns the numeric status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Success => 0x0000,
            Self::InvalidOffset => 0x0007,
            Self::Failure => 0x0101,
        }
    }

    /// Returns true for [`GattStatus::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// A read of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    /// Stack-assigned identifier echoed in the response.
    pub request_id: u32,
    /// The attribute being read.
    pub attribute: Uuid,
    /// Byte offset for long (blob) reads.
    pub offset: u16,
}

impl ReadRequest {
    /// Creates a read from offset zero.
    #[must_use]
    pub const fn new(request_id: u32, attribute: Uuid) -> Self {
        Self {
            request_id,
            attribute,
            offset: 0,
        }
    }

    /// Sets the blob-read offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: u16) -> Self {
        self.offset = offset;
        self
    }
}

/// A write to a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    /// Stack-assigned identifier echoed in the response.
    pub request_id: u32,
    /// The descriptor being written.
    pub attribute: Uuid,
    /// The bytes the central sent.
    pub value: Vec<u8>,
    /// `false` for write-without-response.
    pub response_needed: bool,
}

impl WriteRequest {
    /// Creates a write that expects a response.
    #[must_use]
    pub fn new(request_id: u32, attribute: Uuid, value: impl Into<Vec<u8>>) -> Self {
        Self {
            request_id,
            attribute,
            value: value.into(),
            response_needed: true,
        }
    }

    /// Marks the write as write-without-response.
    #[must_use]
    pub fn without_response(mut self) -> Self {
        self.response_needed = false;
        self
    }
}
