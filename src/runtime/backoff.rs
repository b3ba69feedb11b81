//! # Fibonacci Backoff
//!
//! Retry delays that grow along the Fibonacci sequence (1, 1, 2, 3, 5, ...)
//! times a base delay, capped at a maximum.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    base_ms: u64,
    max_ms: u64,
    previous: u64,
    current: u64,
}

impl FibonacciBackoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms: max_ms.max(base_ms),
            previous: 0,
            current: 1,
        }
    }

    /// Delay before the next retry; advances the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let delay = self.base_ms.saturating_mul(self.current).min(self.max_ms);
        let next = self.previous.saturating_add(self.current);
        self.previous = self.current;
        self.current = next;
        Duration::from_millis(delay)
    }
}
