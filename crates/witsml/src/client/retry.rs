// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Retry policy for read-only Store calls.
//!
//! The policy only answers "how many times" and "how long to wait". Whether a
//! call may be retried at all is decided by the executor from the method
//! and the error.

use std::time::Duration;

use rand::Rng;

// =============================================================================
// RetryConfig
// =============================================================================

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first one (0 = no retries).
    pub max_retries: u32,
    /// Delay strategy between attempts.
    pub strategy: RetryStrategy,
}

impl RetryConfig {
    /// Creates a configuration with the default strategy.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            strategy: RetryStrategy::default(),
        }
    }

    /// Creates a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            strategy: RetryStrategy::Immediate,
        }
    }

    /// Creates a configuration with exponential backoff.
    pub fn exponential(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            strategy: RetryStrategy::Exponential(ExponentialBackoff::new(initial_delay, max_delay)),
        }
    }

    /// Creates a configuration with a fixed delay.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            strategy: RetryStrategy::Fixed(delay),
        }
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

// =============================================================================
// RetryStrategy
// =============================================================================

/// Strategy for calculating retry delays.
#[derive(Debug, Clone)]
pub enum RetryStrategy {
    /// No delay between retries.
    Immediate,
    /// Fixed delay between retries.
    Fixed(Duration),
    /// Exponential backoff with optional jitter.
    Exponential(ExponentialBackoff),
}

impl RetryStrategy {
    /// Calculates the delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Immediate => Duration::ZERO,
            Self::Fixed(duration) => *duration,
            Self::Exponential(exp) => exp.delay(attempt),
        }
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::Exponential(ExponentialBackoff::default())
    }
}

// =============================================================================
// ExponentialBackoff
// =============================================================================

/// Exponential backoff: `initial_delay * multiplier^attempt`, capped, with
/// optional jitter.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
    /// Growth factor per attempt.
    pub multiplier: f64,
    /// Jitter factor (0.0 = none, 1.0 = up to 100%).
    pub jitter_factor: f64,
}

impl ExponentialBackoff {
    /// Creates a backoff without jitter.
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
            multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }

    /// Sets the multiplier.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the jitter factor.
    pub fn with_jitter(mut self, jitter_factor: f64) -> Self {
        self.jitter_factor = jitter_factor.clamp(0.0, 1.0);
        self
    }

    /// Calculates the delay for the given attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        let final_delay = if self.jitter_factor > 0.0 {
            let jitter_range = capped * self.jitter_factor;
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped + jitter).max(0.0)
        } else {
            capped
        };

        Duration::from_secs_f64(final_delay)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
