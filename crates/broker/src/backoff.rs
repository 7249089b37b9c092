// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jittered exponential backoff, shared by connection recovery (C2) and the
//! retry middleware (C3)'s own delay computation.

use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub exponent: f64,
    /// Maximum jitter applied in either direction, as a fraction of the
    /// un-jittered delay (e.g. `0.2` means ±20%).
    pub jitter_fraction: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(30),
            exponent: 2.0,
            jitter_fraction: 0.2,
        }
    }
}

impl BackoffConfig {
    /// `delay = min(base_delay * exponent^attempt ± jitter, max_delay)`.
    ///
    /// `attempt` is zero-based: the first retry uses `attempt = 0`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let unjittered = self.base_delay.as_secs_f64() * self.exponent.powi(attempt as i32);
        let capped = unjittered.min(self.max_delay.as_secs_f64());

        let jitter_span = capped * self.jitter_fraction;
        let jitter = if jitter_span > 0.0 {
            rand::rng().random_range(-jitter_span..=jitter_span)
        } else {
            0.0
        };

        let jittered = (capped + jitter).max(0.0).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(jittered)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
