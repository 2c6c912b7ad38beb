//! Tick source and transition debounce owned by the store task.
//!
//! Both are polled from the store's select loop, so dropping or replacing
//! them takes effect before the loop can observe another tick.

use std::future::{pending, Future};
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior, Sleep};

/// Cancellable periodic tick handle. At most one interval exists at a time.
#[derive(Debug, Default)]
pub struct Ticker {
    interval: Option<Interval>,
    period: Option<Duration>,
}

impl Ticker {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Start ticking every `period`, replacing any running interval. The first
    /// tick arrives one full period from now.
    pub fn start(&mut self, period: Duration) {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        self.period = Some(period);
    }

    pub fn cancel(&mut self) {
        self.interval = None;
        self.period = None;
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Resolve at the next tick. Never resolves while idle.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => pending::<()>().await,
        }
    }
}

/// One-shot delay between a session expiring and its transition running.
#[derive(Debug, Default)]
pub struct Debounce {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl Debounce {
    /// Arm the delay. An already armed delay is left untouched.
    pub fn arm(&mut self, delay: Duration) {
        if self.sleep.is_none() {
            self.sleep = Some(Box::pin(tokio::time::sleep(delay)));
        }
    }

    pub fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    /// Resolve once the armed delay elapses, disarming it. Never resolves
    /// while unarmed.
    pub async fn fired(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.sleep = None;
            }
            None => pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let mut ticker = Ticker::idle();
        ticker.start(Duration::from_secs(1));
        let started = Instant::now();
        ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_ticker_never_fires() {
        let mut ticker = Ticker::idle();
        ticker.start(Duration::from_millis(10));
        ticker.cancel();
        assert!(!ticker.is_active());
        let fired = tokio::time::timeout(Duration::from_secs(5), ticker.tick()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_period() {
        let mut ticker = Ticker::idle();
        ticker.start(Duration::from_secs(1));
        ticker.start(Duration::from_millis(100));
        assert_eq!(ticker.period(), Some(Duration::from_millis(100)));
        let started = Instant::now();
        ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_fires_once() {
        let mut debounce = Debounce::default();
        debounce.arm(Duration::from_millis(100));
        debounce.arm(Duration::from_secs(10));
        let started = Instant::now();
        debounce.fired().await;
        assert_eq!(started.elapsed(), Duration::from_millis(100));
        assert!(!debounce.is_armed());
    }
}
