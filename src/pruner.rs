//! End-of-day pruning of good-for-day orders.
//!
//! The pruner runs on its own thread and sleeps on a timed condition until
//! the configured local close of day, then takes the book lock and cancels
//! every resting good-for-day order through the standard cancel path. Any
//! wake-up other than the deadline elapsing is treated as shutdown.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use crate::matching::Matcher;

/// Close of the trading day when none is configured: 16:00 local time.
pub fn default_close() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 0, 0).expect("16:00:00 is a valid time")
}

/// Grace added to the computed wait so the sweep never fires early.
const SLACK: Duration = Duration::from_millis(100);

/// Time from `now` until the next occurrence of `close`.
///
/// A `now` at or past today's close rolls over to tomorrow.
fn time_until_close(now: NaiveDateTime, close: NaiveTime) -> Duration {
    let today = now.date().and_time(close);
    let target = if now >= today {
        today + chrono::Duration::days(1)
    } else {
        today
    };
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

/// Shutdown handshake between the facade and the pruner thread.
pub(crate) struct Shutdown {
    flag: Mutex<bool>,
    signal: Condvar,
}

impl Shutdown {
    pub(crate) fn new() -> Self {
        Self {
            flag: Mutex::new(false),
            signal: Condvar::new(),
        }
    }

    /// Raise the flag and wake the pruner. Safe to call more than once.
    pub(crate) fn trigger(&self) {
        *self.flag.lock().unwrap() = true;
        self.signal.notify_all();
    }
}

/// Pruner thread body: sleep until close, sweep, repeat until shutdown.
pub(crate) fn run(core: Arc<Mutex<Matcher>>, shutdown: Arc<Shutdown>, close: NaiveTime) {
    info!(%close, "good-for-day pruner started");

    loop {
        let wait = time_until_close(Local::now().naive_local(), close) + SLACK;
        debug!(?wait, "pruner sleeping until close of day");

        {
            let guard = shutdown.flag.lock().unwrap();
            if *guard {
                info!("good-for-day pruner shutting down");
                return;
            }
            let (guard, timeout) = shutdown.signal.wait_timeout(guard, wait).unwrap();
            // A notify (or anything else) before the deadline means shutdown
            if *guard || !timeout.timed_out() {
                info!("good-for-day pruner shutting down");
                return;
            }
        }

        let swept = core.lock().unwrap().sweep_day_orders();
        info!(swept, "end-of-day sweep complete");
    }
}
