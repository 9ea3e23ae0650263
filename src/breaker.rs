use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::engine::EngineError;
use crate::observability;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Circuit breaker guarding the booking commit path.
///
/// Closed → Open after `fail_max` consecutive failures. Open rejects every
/// call until `reset_timeout` elapses, then the next caller runs as a single
/// half-open probe: success closes the circuit, failure reopens it and
/// restarts the timeout.
///
/// One instance is shared by every booking-create call going through an
/// [`Engine`](crate::engine::Engine). Construct it at the composition root
/// and hand it in — there is no ambient global.
pub struct CircuitBreaker {
    fail_max: u32,
    reset_timeout: Duration,
    inner: Mutex<Inner>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FAIL_MAX, Self::DEFAULT_RESET_TIMEOUT)
    }
}

impl CircuitBreaker {
    pub const DEFAULT_FAIL_MAX: u32 = 3;
    pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(fail_max: u32, reset_timeout: Duration) -> Self {
        Self {
            fail_max,
            reset_timeout,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    /// Admission check, called before the downstream write.
    ///
    /// While open, flips to half-open once the reset timeout has elapsed and
    /// admits exactly one probe; every other caller is rejected until the
    /// probe's outcome is recorded.
    pub fn admit(&self) -> Result<(), EngineError> {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => Ok(()),
            BreakerState::HalfOpen => {
                // A probe is already in flight.
                metrics::counter!(observability::BREAKER_REJECTED_TOTAL).increment(1);
                Err(EngineError::CircuitOpen)
            }
            BreakerState::Open => {
                let opened_at = inner.opened_at.expect("open breaker has a trip timestamp");
                if opened_at.elapsed() >= self.reset_timeout {
                    inner.state = BreakerState::HalfOpen;
                    info!("circuit breaker half-open, admitting trial call");
                    Ok(())
                } else {
                    metrics::counter!(observability::BREAKER_REJECTED_TOTAL).increment(1);
                    Err(EngineError::CircuitOpen)
                }
            }
        }
    }

    /// Record a successful downstream write. Closes the circuit and resets
    /// the consecutive-failure counter.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        if inner.state == BreakerState::HalfOpen {
            info!("trial call succeeded, closing circuit breaker");
        }
        inner.state = BreakerState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    /// Record a downstream failure. Trips the breaker after `fail_max`
    /// consecutive failures; a failed half-open probe reopens immediately.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::HalfOpen => {
                warn!("trial call failed, reopening circuit breaker");
                self.trip(&mut inner);
            }
            BreakerState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.fail_max {
                    warn!(
                        failures = inner.consecutive_failures,
                        "circuit breaker open after consecutive downstream failures"
                    );
                    self.trip(&mut inner);
                }
            }
            // Failures cannot be recorded while open: nothing was admitted.
            BreakerState::Open => {}
        }
    }

    fn trip(&self, inner: &mut Inner) {
        inner.state = BreakerState::Open;
        inner.opened_at = Some(Instant::now());
        metrics::counter!(observability::BREAKER_TRIPS_TOTAL).increment(1);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("breaker lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail_n(breaker: &CircuitBreaker, n: u32) {
        for _ in 0..n {
            breaker.admit().unwrap();
            breaker.record_failure();
        }
    }

    #[test]
    fn stays_closed_below_threshold() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(60));
        fail_n(&breaker, 2);
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert!(breaker.admit().is_ok());
    }

    #[test]
    fn opens_after_fail_max() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(60));
        fail_n(&breaker, 3);
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(matches!(breaker.admit(), Err(EngineError::CircuitOpen)));
    }

    #[test]
    fn success_resets_failure_counter() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(60));
        fail_n(&breaker, 2);
        breaker.admit().unwrap();
        breaker.record_success();
        fail_n(&breaker, 2);
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn half_open_after_timeout_admits_single_probe() {
        let breaker = CircuitBreaker::new(3, Duration::ZERO);
        fail_n(&breaker, 3);
        // Zero timeout: the next admit runs as the probe.
        assert!(breaker.admit().is_ok());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        // Concurrent caller during the probe is rejected.
        assert!(matches!(breaker.admit(), Err(EngineError::CircuitOpen)));
    }

    #[test]
    fn probe_success_closes() {
        let breaker = CircuitBreaker::new(3, Duration::ZERO);
        fail_n(&breaker, 3);
        breaker.admit().unwrap();
        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert!(breaker.admit().is_ok());
    }

    #[test]
    fn probe_failure_reopens() {
        let breaker = CircuitBreaker::new(3, Duration::from_millis(20));
        fail_n(&breaker, 3);
        std::thread::sleep(Duration::from_millis(30));
        breaker.admit().unwrap();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        // Timeout restarted: rejected again until it elapses.
        assert!(matches!(breaker.admit(), Err(EngineError::CircuitOpen)));
        std::thread::sleep(Duration::from_millis(30));
        assert!(breaker.admit().is_ok());
    }

    #[test]
    fn rejects_while_open_within_timeout() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(60));
        fail_n(&breaker, 1);
        for _ in 0..5 {
            assert!(matches!(breaker.admit(), Err(EngineError::CircuitOpen)));
        }
    }
}
