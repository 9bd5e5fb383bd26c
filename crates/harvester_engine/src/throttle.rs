use std::time::Duration;

use rand::Rng;

/// Fixed delay with optional symmetric jitter, used to pace external calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    base: Duration,
    jitter: f64,
}

impl Throttle {
    /// `jitter` is the relative spread, clamped to `0.0..=1.0`.
    pub fn new(base: Duration, jitter: f64) -> Self {
        let jitter = if jitter.is_finite() {
            jitter.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { base, jitter }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }

    /// The next delay: `base * (1 ± jitter * u)` with `u` uniform in `[0, 1]`.
    pub fn delay(&self) -> Duration {
        if self.base.is_zero() || self.jitter == 0.0 {
            return self.base;
        }
        let spread = rand::rng().random_range(-self.jitter..=self.jitter);
        self.base.mul_f64(1.0 + spread)
    }

    pub async fn pause(&self) {
        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
