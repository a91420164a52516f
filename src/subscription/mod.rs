// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription tracking for connected centrals.
//!
//! A central subscribes by writing `0x0001` to the characteristic's CCCD and
//! unsubscribes by writing `0x0000`. The [`SubscriptionRegistry`] is the
//! authoritative record of who receives notifications.
//!
//! Subscriptions do not persist: a central that reconnects starts with
//! notifications off and has to write the descriptor again.

mod registry;

pub use registry::SubscriptionRegistry;
