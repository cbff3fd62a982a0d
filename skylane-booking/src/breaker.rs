use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation: calls pass through, outcomes are recorded in the
    /// sliding window.
    Closed,
    /// Tripped: calls short-circuit to the fallback without a network
    /// attempt.
    Open,
    /// Probing: a limited number of trial calls are allowed through.
    HalfOpen,
}

/// Transition thresholds. These are configuration, not policy baked into
/// the state machine.
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Failure-rate percentage (0-100) that trips the breaker once the
    /// window is full.
    pub failure_rate_threshold: f64,
    pub sliding_window_size: usize,
    /// How long the breaker stays open before admitting trial calls.
    pub wait_duration: Duration,
    /// Trial calls admitted while half-open.
    pub half_open_max_calls: usize,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 50.0,
            sliding_window_size: 10,
            wait_duration: Duration::from_secs(30),
            half_open_max_calls: 3,
        }
    }
}

struct Inner {
    state: CircuitState,
    // true = failure
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    half_open_permits: usize,
    half_open_successes: usize,
}

/// Call-guarding state machine for the inventory authority.
///
/// One instance is shared by every call site that talks to the authority,
/// so a spike of failures degrades booking and cancellation together.
/// Callers ask for a permit with [`try_acquire`], then report the outcome
/// with [`record_success`] / [`record_failure`].
///
/// [`try_acquire`]: CircuitBreaker::try_acquire
/// [`record_success`]: CircuitBreaker::record_success
/// [`record_failure`]: CircuitBreaker::record_failure
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: &str, config: BreakerConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                window: VecDeque::new(),
                opened_at: None,
                half_open_permits: 0,
                half_open_successes: 0,
            }),
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    /// Whether a call may proceed. Open circuits transition to half-open
    /// once the wait duration has elapsed; the transitioning call takes the
    /// first trial permit.
    pub async fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let waited = inner
                    .opened_at
                    .map(|at| at.elapsed() >= self.config.wait_duration)
                    .unwrap_or(true);
                if waited {
                    inner.state = CircuitState::HalfOpen;
                    inner.half_open_permits = 1;
                    inner.half_open_successes = 0;
                    info!("Circuit breaker [{}] moving to half-open", self.name);
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_permits < self.config.half_open_max_calls {
                    inner.half_open_permits += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => {
                Self::push(&mut inner.window, false, self.config.sliding_window_size);
            }
            CircuitState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.half_open_max_calls {
                    inner.state = CircuitState::Closed;
                    inner.window.clear();
                    inner.opened_at = None;
                    info!("Circuit breaker [{}] recovered to closed", self.name);
                }
            }
            CircuitState::Open => {}
        }
    }

    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => {
                Self::push(&mut inner.window, true, self.config.sliding_window_size);
                if inner.window.len() >= self.config.sliding_window_size {
                    let failures = inner.window.iter().filter(|failed| **failed).count();
                    let rate = failures as f64 * 100.0 / inner.window.len() as f64;
                    if rate >= self.config.failure_rate_threshold {
                        inner.state = CircuitState::Open;
                        inner.opened_at = Some(Instant::now());
                        error!(
                            "Circuit breaker [{}] tripped to open: failure rate {:.0}%",
                            self.name, rate
                        );
                    }
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.window.clear();
                error!(
                    "Circuit breaker [{}] reopened: trial call failed",
                    self.name
                );
            }
            CircuitState::Open => {}
        }
    }

    fn push(window: &mut VecDeque<bool>, failed: bool, size: usize) {
        window.push_back(failed);
        while window.len() > size {
            window.pop_front();
        }
    }
}
