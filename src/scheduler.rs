// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cancellable periodic timer.
//!
//! The timer runs a synchronous `tick` closure on a tokio task: first after
//! an initial delay, then once per period. [`TimerHandle::cancel`] waits for
//! the task to exit, so once it returns no tick is running and none will
//! start.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//!
//! use gatt_notifier::scheduler::PeriodicTimer;
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() -> gatt_notifier::Result<()> {
//!     let ticks = Arc::new(AtomicU32::new(0));
//!     let counter = Arc::clone(&ticks);
//!
//!     let timer = PeriodicTimer::new(Duration::from_secs(5), Duration::from_secs(5));
//!     let handle = timer.spawn(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })?;
//!
//!     tokio::time::sleep(Duration::from_secs(11)).await;
//!     handle.cancel().await;
//!
//!     assert_eq!(ticks.load(Ordering::SeqCst), 2);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{Error, Result};

/// Timing of a periodic timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTimer {
    initial_delay: Duration,
    period: Duration,
}

impl PeriodicTimer {
    /// Creates a timer firing first after `initial_delay`, then every `period`.
    ///
    /// A zero period is raised to one millisecond.
    #[must_use]
    pub fn new(initial_delay: Duration, period: Duration) -> Self {
        Self {
            initial_delay,
            period: period.max(Duration::from_millis(1)),
        }
    }

    /// Returns the delay before the first tick.
    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Returns the interval between ticks.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts ticking on the current tokio runtime.
    ///
    /// A tick that runs late delays the following ones rather than
    /// triggering a burst of catch-up ticks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] when called outside a tokio runtime.
    pub fn spawn<F>(&self, mut tick: F) -> Result<TimerHandle>
    where
        F: FnMut() + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let start = Instant::now() + self.initial_delay;
        let period = self.period;

        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut cancel_rx => break,
                    _ = interval.tick() => tick(),
                }
            }

            tracing::debug!("Periodic timer stopped");
        });

        tracing::debug!(
            initial_delay_ms = self.initial_delay.as_millis(),
            period_ms = period.as_millis(),
            "Periodic timer armed"
        );

        Ok(TimerHandle {
            cancel_tx: Some(cancel_tx),
            task: Some(task),
        })
    }
}

/// Owner of a running [`PeriodicTimer`] task.
///
/// Dropping the handle without calling [`cancel`](Self::cancel) aborts the
/// task without waiting for it.
#[derive(Debug)]
pub struct TimerHandle {
    cancel_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// Stops the timer and waits until its task has exited.
    pub async fn cancel(mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            // The receiver is gone only if the task already ended.
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take()
            && let Err(e) = task.await
            && e.is_panic()
        {
            tracing::warn!(error = %e, "Periodic timer task panicked");
        }
    }

    /// Returns true once the task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn counting() -> (Arc<AtomicU32>, impl FnMut() + Send + 'static) {
        let ticks = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&ticks);
        (ticks, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_after_initial_delay() {
        let (ticks, tick) = counting();
        let handle = PeriodicTimer::new(Duration::from_secs(5), Duration::from_secs(5))
            .spawn(tick)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(4_999)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        handle.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_after_cancel() {
        let (ticks, tick) = counting();
        let handle = PeriodicTimer::new(Duration::from_secs(1), Duration::from_secs(1))
            .spawn(tick)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        handle.cancel().await;
        let after_cancel = ticks.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
        assert_eq!(after_cancel, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_first_tick() {
        let (ticks, tick) = counting();
        let handle = PeriodicTimer::new(Duration::from_secs(5), Duration::from_secs(5))
            .spawn(tick)
            .unwrap();

        handle.cancel().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_task() {
        let (ticks, tick) = counting();
        let handle = PeriodicTimer::new(Duration::ZERO, Duration::from_secs(1))
            .spawn(tick)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(handle);
        let before = ticks.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), before);
    }

    #[test]
    fn spawn_outside_runtime_fails() {
        let result = PeriodicTimer::new(Duration::ZERO, Duration::from_secs(1)).spawn(|| {});
        assert!(matches!(result, Err(Error::NoRuntime)));
    }

    #[test]
    fn zero_period_is_clamped() {
        let timer = PeriodicTimer::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(timer.period(), Duration::from_millis(1));
    }
}
