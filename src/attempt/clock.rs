//! Periodic tick sources for the countdown.

use std::future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Default countdown resolution.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A scheduling primitive with no state beyond running or stopped.
#[async_trait]
pub trait Clock: Send {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// Resolves on the next tick. Never resolves while stopped.
    async fn tick(&mut self);
}

/// Real-time clock backed by a tokio interval.
pub struct IntervalClock {
    period: Duration,
    interval: Option<Interval>,
}

impl IntervalClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

#[async_trait]
impl Clock for IntervalClock {
    fn start(&mut self) {
        // First tick is a full period away, not immediate.
        let mut interval = time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    fn stop(&mut self) {
        self.interval = None;
    }

    fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }
}

/// Virtual clock for tests: ticks only when advanced.
#[derive(Debug, Default)]
pub struct ManualClock {
    running: bool,
    queued: u32,
    delivered: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `ticks` virtual seconds. Dropped if the clock is stopped.
    pub fn advance(&mut self, ticks: u32) {
        if !self.running {
            return;
        }
        self.queued = self.queued.saturating_add(ticks);
    }

    pub fn queued(&self) -> u32 {
        self.queued
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
        self.queued = 0;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    async fn tick(&mut self) {
        if self.running && self.queued > 0 {
            self.queued -= 1;
            self.delivered += 1;
            return;
        }
        future::pending::<()>().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_interval_clock_is_pending_when_stopped() {
        let mut clock = IntervalClock::new(Duration::from_millis(5));
        assert!(!clock.is_running());
        let waited = time::timeout(Duration::from_millis(30), clock.tick()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_interval_clock_ticks_when_started() {
        let mut clock = IntervalClock::new(Duration::from_millis(5));
        clock.start();
        assert!(clock.is_running());
        let waited = time::timeout(Duration::from_millis(500), clock.tick()).await;
        assert!(waited.is_ok());
        clock.stop();
        assert!(!clock.is_running());
    }

    #[tokio::test]
    async fn test_manual_clock_delivers_queued_ticks() {
        let mut clock = ManualClock::new();
        clock.advance(2);
        assert_eq!(clock.queued(), 0, "stopped clock drops ticks");

        clock.start();
        clock.advance(2);
        clock.tick().await;
        clock.tick().await;
        assert_eq!(clock.delivered(), 2);

        let waited = time::timeout(Duration::from_millis(10), clock.tick()).await;
        assert!(waited.is_err());
    }

    #[test]
    fn test_manual_clock_stop_clears_queue() {
        let mut clock = ManualClock::new();
        clock.start();
        clock.advance(5);
        clock.stop();
        assert_eq!(clock.queued(), 0);
        assert!(!clock.is_running());
    }
}
