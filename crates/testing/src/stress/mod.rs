//! Producer/consumer stress runs against a [`SharedBuffer`].
//!
//! A run spawns producers pushing distinct values and consumers draining
//! them with timed pops, stops the consumers with a completion flag plus a
//! halt once every producer is done, then checks that each value was handed
//! to exactly one consumer.

use core::time::Duration;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use shared_buffer::SharedBuffer;

pub mod config;

pub use config::StressConfig;

/// Result of a stress run.
#[derive(Debug, Clone)]
pub struct StressResult {
    /// Values pushed by all producers
    pub pushed: usize,
    /// Values received by all consumers
    pub delivered: usize,
    /// Extra deliveries of values already received once
    pub duplicates: usize,
    /// Pushed values no consumer received
    pub missing: usize,
    /// Values still queued after every consumer stopped
    pub left_behind: usize,
    /// Values received by each consumer, indexed by consumer id
    pub per_consumer: Vec<usize>,
    /// Wall-clock time of the whole run
    pub duration: Duration,
}

impl StressResult {
    /// True when every pushed value reached exactly one consumer.
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        self.delivered == self.pushed && self.duplicates == 0 && self.missing == 0
    }

    /// Returns delivered values per second.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn values_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.delivered as f64 / secs
        }
    }
}

/// Drives producers and consumers over a shared buffer.
pub struct StressHarness {
    config: StressConfig,
}

impl StressHarness {
    #[must_use]
    pub const fn new(config: StressConfig) -> Self {
        Self { config }
    }

    /// Runs against a fresh [`SharedBuffer`].
    ///
    /// # Examples
    ///
    /// ```
    /// use shared_buffer_testing::{StressConfig, StressHarness};
    ///
    /// let config = StressConfig::new()
    ///     .producers(2)
    ///     .consumers(3)
    ///     .values_per_producer(100);
    /// let result = StressHarness::new(config).run();
    ///
    /// assert_eq!(result.pushed, 200);
    /// assert!(result.is_conserved());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the configured values do not fit in a `usize`
    /// (see [`StressConfig::total_values`]), or if any producer or consumer
    /// thread panics.
    #[must_use]
    pub fn run(self) -> StressResult {
        let buffer = SharedBuffer::with_capacity(self.config.total_values().unwrap_or_default());
        self.run_with(&buffer)
    }

    /// Runs against an existing buffer, for instance one built from a
    /// [`shared_buffer::BufferConfig`].
    ///
    /// Values already queued in `buffer` are delivered too and will show up
    /// as unexpected deliveries, so pass an empty one.
    ///
    /// # Panics
    ///
    /// Panics if the configured values do not fit in a `usize`
    /// (see [`StressConfig::total_values`]), or if any producer or consumer
    /// thread panics.
    #[must_use]
    pub fn run_with(self, buffer: &SharedBuffer<u64>) -> StressResult {
        let start = std::time::Instant::now();
        let config = self.config;

        // bounds every producer's range, so the arithmetic below cannot overflow.
        let pushed = config
            .total_values()
            .expect("stress run pushes more values than fit in usize");
        let finished = Arc::new(AtomicBool::new(false));

        tracing::debug!(?config, "starting shared buffer stress run");

        let mut consumers = Vec::with_capacity(config.get_consumers());
        for _ in 0..config.get_consumers() {
            let buffer = buffer.clone();
            let finished = Arc::clone(&finished);
            let wait = config.get_consumer_wait();

            consumers.push(thread::spawn(move || {
                let mut received = Vec::new();
                loop {
                    if finished.load(Ordering::Acquire) && buffer.is_empty() {
                        break;
                    }

                    match buffer.pop(wait) {
                        Some(value) => received.push(value),
                        None if finished.load(Ordering::Acquire) => break,
                        None => {}
                    }
                }
                received
            }));
        }

        let mut producers = Vec::with_capacity(config.get_producers());
        for producer_id in 0..config.get_producers() {
            let buffer = buffer.clone();
            let values_per_producer = config.get_values_per_producer();

            producers.push(thread::spawn(move || {
                let first = producer_id * values_per_producer;
                for value in first..first + values_per_producer {
                    buffer.push(value as u64);
                }
            }));
        }

        for producer in producers {
            producer
                .join()
                .expect("producer panicked during stress run");
        }

        // consumers read the flag after the halt wakes them.
        finished.store(true, Ordering::Release);
        buffer.halt();

        let mut delivered_counts: HashMap<u64, usize> = HashMap::new();
        let mut per_consumer = Vec::with_capacity(consumers.len());
        for consumer in consumers {
            let received = consumer
                .join()
                .expect("consumer panicked during stress run");
            per_consumer.push(received.len());
            for value in received {
                *delivered_counts.entry(value).or_default() += 1;
            }
        }

        let mut left_behind = 0;
        while buffer.try_pop().is_some() {
            left_behind += 1;
        }

        let delivered = per_consumer.iter().sum();
        let duplicates = delivered_counts
            .values()
            .map(|count| count.saturating_sub(1))
            .sum();
        let missing = (0..pushed)
            .filter(|value| !delivered_counts.contains_key(&(*value as u64)))
            .count();

        let result = StressResult {
            pushed,
            delivered,
            duplicates,
            missing,
            left_behind,
            per_consumer,
            duration: start.elapsed(),
        };

        tracing::debug!(
            pushed = result.pushed,
            delivered = result.delivered,
            duplicates = result.duplicates,
            missing = result.missing,
            left_behind = result.left_behind,
            "finished shared buffer stress run"
        );
        result
    }
}
