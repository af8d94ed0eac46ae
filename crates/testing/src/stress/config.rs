//! Stress test configuration.

use core::time::Duration;

/// Configuration for a producer/consumer stress run.
#[derive(Debug, Clone, Copy)]
pub struct StressConfig {
    /// Number of producer threads
    producers: usize,
    /// Number of consumer threads
    consumers: usize,
    /// Values pushed by each producer
    values_per_producer: usize,
    /// Bound passed to every consumer `pop`
    consumer_wait: Duration,
}

impl StressConfig {
    /// Creates a new stress test configuration with default values.
    ///
    /// Defaults:
    /// - `producers`: 4
    /// - `consumers`: 4
    /// - `values_per_producer`: 1000
    /// - `consumer_wait`: 1 second
    #[must_use]
    pub const fn new() -> Self {
        Self {
            producers: 4,
            consumers: 4,
            values_per_producer: 1000,
            consumer_wait: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub const fn producers(mut self, count: usize) -> Self {
        self.producers = count;
        self
    }

    #[must_use]
    pub const fn consumers(mut self, count: usize) -> Self {
        self.consumers = count;
        self
    }

    #[must_use]
    pub const fn values_per_producer(mut self, count: usize) -> Self {
        self.values_per_producer = count;
        self
    }

    /// Sets how long each consumer blocks in a single `pop`.
    #[must_use]
    pub const fn consumer_wait(mut self, wait: Duration) -> Self {
        self.consumer_wait = wait;
        self
    }

    #[must_use]
    pub const fn get_producers(&self) -> usize {
        self.producers
    }

    #[must_use]
    pub const fn get_consumers(&self) -> usize {
        self.consumers
    }

    #[must_use]
    pub const fn get_values_per_producer(&self) -> usize {
        self.values_per_producer
    }

    #[must_use]
    pub const fn get_consumer_wait(&self) -> Duration {
        self.consumer_wait
    }

    /// Total number of values a run pushes, `None` when it does not fit in a
    /// `usize`.
    #[must_use]
    pub const fn total_values(&self) -> Option<usize> {
        self.producers.checked_mul(self.values_per_producer)
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self::new()
    }
}
