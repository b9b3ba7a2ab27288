//! Circuit breaker guarding geocoding provider calls.
//!
//! ```text
//! Closed --[failures >= threshold]--> Open
//! Open --[cool-down elapsed, next caller]--> HalfOpen (one trial permit)
//! HalfOpen --[trial succeeds]--> Closed
//! HalfOpen --[trial fails]--> Open (cool-down restarts)
//! ```
//!
//! Callers take a [`BreakerPermit`] before each provider attempt and settle it
//! with the outcome. A trial permit dropped without an outcome (deadline hit,
//! task cancelled) frees the trial slot so the next caller can try.
//!
//! Timing uses `tokio::time::Instant` so paused-clock tests can drive the
//! cool-down.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the breaker (default: 5).
    pub failure_threshold: u32,
    /// Time spent open before a trial call is allowed (default: 60s).
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Point-in-time view of the breaker for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub opened_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct CircuitBreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    opened_at_wall: Option<DateTime<Utc>>,
    trial_in_flight: bool,
}

impl CircuitBreakerInner {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            opened_at_wall: None,
            trial_in_flight: false,
        }
    }

    fn open(&mut self) {
        self.state = CircuitState::Open;
        self.opened_at = Some(Instant::now());
        self.opened_at_wall = Some(Utc::now());
        self.trial_in_flight = false;
    }
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<CircuitBreakerInner>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(CircuitBreakerInner::new()),
        }
    }

    // State stays consistent across a panic in another holder, so recover
    // from poisoning instead of propagating it.
    fn lock(&self) -> MutexGuard<'_, CircuitBreakerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Ask for permission to call the provider. `None` means the breaker is
    /// open (or a half-open trial is already running) and the caller should
    /// fall back immediately.
    pub fn try_acquire(&self) -> Option<BreakerPermit<'_>> {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Some(BreakerPermit::new(self, false)),
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|at| at.elapsed()).unwrap_or_default();
                if elapsed < self.config.cooldown {
                    return None;
                }
                info!(
                    cooldown_secs = self.config.cooldown.as_secs(),
                    "Geocoder circuit half-open, allowing one trial call"
                );
                inner.state = CircuitState::HalfOpen;
                inner.trial_in_flight = true;
                Some(BreakerPermit::new(self, true))
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    None
                } else {
                    inner.trial_in_flight = true;
                    Some(BreakerPermit::new(self, true))
                }
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        BreakerSnapshot {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            opened_at: inner.opened_at_wall,
        }
    }

    fn on_success(&self, trial: bool) {
        let mut inner = self.lock();
        inner.consecutive_failures = 0;
        if trial {
            inner.trial_in_flight = false;
        }
        if inner.state != CircuitState::Closed {
            info!(previous = ?inner.state, "Geocoder circuit closed");
            inner.state = CircuitState::Closed;
            inner.opened_at = None;
            inner.opened_at_wall = None;
            inner.trial_in_flight = false;
        }
    }

    fn on_failure(&self, trial: bool) {
        let mut inner = self.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);

        match inner.state {
            CircuitState::Closed if inner.consecutive_failures >= self.config.failure_threshold => {
                warn!(
                    failures = inner.consecutive_failures,
                    cooldown_secs = self.config.cooldown.as_secs(),
                    "Geocoder circuit opened"
                );
                inner.open();
            }
            CircuitState::HalfOpen if trial => {
                warn!("Geocoder trial call failed, circuit re-opened");
                inner.open();
            }
            _ => {}
        }
    }

    fn on_abandoned(&self, trial: bool) {
        if trial {
            let mut inner = self.lock();
            if inner.state == CircuitState::HalfOpen {
                inner.trial_in_flight = false;
            }
        }
    }
}

/// Permission for a single provider attempt.
#[must_use = "settle the permit with record_success or record_failure"]
#[derive(Debug)]
pub struct BreakerPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl<'a> BreakerPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: bool) -> Self {
        Self {
            breaker,
            trial,
            settled: false,
        }
    }

    /// True for the single half-open trial permit.
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn record_success(mut self) {
        self.settled = true;
        self.breaker.on_success(self.trial);
    }

    pub fn record_failure(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.trial);
    }
}

impl Drop for BreakerPermit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.on_abandoned(self.trial);
        }
    }
}
