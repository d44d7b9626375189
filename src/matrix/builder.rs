//! Matrix construction with bounded retries and haversine degradation.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::types::{HaversineProvider, Leg, TravelMatrix, TravelProvider, DEFAULT_SPEED_MPS};
use crate::error::FleetError;
use crate::models::GeoPoint;

/// Retry behaviour for a failing [`TravelProvider`].
///
/// Attempt `k` (0-based) is followed by a pause of
/// `initial_backoff_ms * backoff_factor^k`, capped at `max_backoff_ms`.
/// After `breaker_threshold` consecutive pairs exhaust their retries the
/// provider is no longer called for the rest of the matrix.
///
/// # Examples
///
/// ```
/// use u_fleet::matrix::RetryPolicy;
///
/// let policy = RetryPolicy::default().with_max_retries(5).with_initial_backoff_ms(10);
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_factor: f64,
    pub max_backoff_ms: u64,
    /// Consecutive failed pairs that open the circuit; 0 never opens it.
    pub breaker_threshold: u32,
    /// Speed used for fallback travel times.
    pub fallback_speed_mps: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 100,
            backoff_factor: 2.0,
            max_backoff_ms: 2_000,
            breaker_threshold: 3,
            fallback_speed_mps: DEFAULT_SPEED_MPS,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn with_initial_backoff_ms(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    pub fn with_breaker_threshold(mut self, pairs: u32) -> Self {
        self.breaker_threshold = pairs;
        self
    }

    pub fn with_fallback_speed_mps(mut self, speed: f64) -> Self {
        self.fallback_speed_mps = speed;
        self
    }

    /// Pause after the `attempt`-th failure.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ms = self.initial_backoff_ms as f64 * self.backoff_factor.powi(attempt as i32);
        Duration::from_millis(ms.min(self.max_backoff_ms as f64) as u64)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.backoff_factor < 1.0 {
            return Err(format!("backoff_factor must be >= 1, got {}", self.backoff_factor));
        }
        if self.fallback_speed_mps.is_nan() || self.fallback_speed_mps <= 0.0 {
            return Err("fallback_speed_mps must be positive".into());
        }
        Ok(())
    }
}

/// Builds a [`TravelMatrix`] from a provider.
///
/// Every failed pair is retried up to `max_retries` times with backoff, then
/// replaced by a haversine estimate and flagged as degraded. Once the circuit
/// opens, the remaining pairs are estimated and flagged without calling the
/// provider. The failures are returned alongside the matrix so the caller
/// can report them.
pub struct MatrixBuilder<'a, P: TravelProvider> {
    provider: &'a P,
    policy: RetryPolicy,
    depots: usize,
}

impl<'a, P: TravelProvider> MatrixBuilder<'a, P> {
    pub fn new(provider: &'a P, policy: RetryPolicy) -> Self {
        Self {
            provider,
            policy,
            depots: 0,
        }
    }

    /// Marks the first `n` points as depots. No route travels between two
    /// depots, so those cells are estimated without calling the provider and
    /// are not flagged.
    pub fn with_depots(mut self, n: usize) -> Self {
        self.depots = n;
        self
    }

    /// Builds the matrix over `points`.
    pub fn build(&self, points: &[GeoPoint]) -> (TravelMatrix, Vec<FleetError>) {
        let fallback = HaversineProvider {
            speed_mps: self.policy.fallback_speed_mps,
        };
        let estimate = |i: usize, j: usize| {
            fallback
                .leg(&points[i], &points[j])
                .unwrap_or(Leg { meters: 0.0, seconds: 0.0 })
        };
        let mut failed: Vec<(usize, usize)> = Vec::new();
        let mut failures = Vec::new();
        let mut consecutive = 0u32;
        let mut open = false;

        let mut matrix = TravelMatrix::from_fn(points.len(), |i, j| {
            if i < self.depots && j < self.depots {
                return estimate(i, j);
            }
            if open {
                failed.push((i, j));
                failures.push(FleetError::Provider {
                    from: i,
                    to: j,
                    attempts: 0,
                    message: "circuit open".into(),
                });
                return estimate(i, j);
            }
            match self.fetch(&points[i], &points[j]) {
                Ok(leg) => {
                    consecutive = 0;
                    leg
                }
                Err((attempts, message)) => {
                    warn!(from = i, to = j, attempts, %message, "travel provider failed; using haversine estimate");
                    consecutive += 1;
                    if self.policy.breaker_threshold > 0 && consecutive >= self.policy.breaker_threshold {
                        warn!(failed_pairs = consecutive, "travel provider circuit open; estimating remaining cells");
                        open = true;
                    }
                    failed.push((i, j));
                    failures.push(FleetError::Provider {
                        from: i,
                        to: j,
                        attempts,
                        message,
                    });
                    estimate(i, j)
                }
            }
        });

        for (i, j) in failed {
            matrix.set_degraded(i, j);
        }
        debug!(points = points.len(), degraded = matrix.degraded_count(), "travel matrix built");
        (matrix, failures)
    }

    fn fetch(&self, from: &GeoPoint, to: &GeoPoint) -> Result<Leg, (u32, String)> {
        let mut last_error = String::new();
        for attempt in 0..=self.policy.max_retries {
            match self.provider.leg(from, to) {
                Ok(leg)
                    if leg.meters.is_finite() && leg.seconds.is_finite() && leg.meters >= 0.0 && leg.seconds >= 0.0 =>
                {
                    return Ok(leg)
                }
                Ok(leg) => last_error = format!("invalid leg {leg:?}"),
                Err(e) => last_error = e,
            }
            if attempt < self.policy.max_retries {
                let pause = self.policy.backoff(attempt);
                if !pause.is_zero() {
                    thread::sleep(pause);
                }
            }
        }
        Err((self.policy.max_retries + 1, last_error))
    }
}
