//! Heartbeat manager
//!
//! Interval timer for keepalive frames plus round-trip measurement. The
//! manager never times a connection out; a dead link shows up as a socket close.

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Shortest period the timer will run at; a zero interval from the server is raised to this
pub const MIN_HEARTBEAT_PERIOD: Duration = Duration::from_millis(1);

/// Keepalive timer for one socket
#[derive(Debug, Default)]
pub struct Heartbeat {
    interval: Option<Interval>,
    period: Option<Duration>,
    last_sent: Option<Instant>,
}

impl Heartbeat {
    /// Create a stopped heartbeat
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `period`, first tick one full period from now
    ///
    /// Restarting replaces any running timer, so at most one exists.
    pub fn start(&mut self, period: Duration) {
        let period = period.max(MIN_HEARTBEAT_PERIOD);
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.interval = Some(interval);
        self.period = Some(period);
    }

    /// Cancel the timer; safe to call at any time
    pub fn stop(&mut self) {
        self.interval = None;
        self.period = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Current period, if running
    #[must_use]
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Wait for the next tick
    ///
    /// Pends forever while stopped so it can sit in a `select!` unconditionally.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Mark a heartbeat as just sent
    pub fn record_sent(&mut self) {
        self.last_sent = Some(Instant::now());
    }

    /// Latency since the last recorded send, for an incoming ack
    #[must_use]
    pub fn ack(&self) -> Option<Duration> {
        self.last_sent.map(|sent| sent.elapsed())
    }
}
