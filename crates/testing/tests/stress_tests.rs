//! Conservation checks for `SharedBuffer` under contention.

use ntest::timeout;
use serial_test::serial;
use shared_buffer::{BufferConfig, SharedBuffer};
use shared_buffer_testing::{StressConfig, StressHarness};
use std::time::Duration;
use tracing_test::traced_test;

#[test]
fn test_stress_config_defaults() {
    let config = StressConfig::default();

    assert_eq!(4, config.get_producers());
    assert_eq!(4, config.get_consumers());
    assert_eq!(1000, config.get_values_per_producer());
    assert_eq!(Duration::from_secs(1), config.get_consumer_wait());
    assert_eq!(Some(4000), config.total_values());
}

#[test]
fn test_total_values_reports_overflow() {
    let config = StressConfig::new()
        .producers(usize::MAX / 2 + 1)
        .values_per_producer(2);

    assert_eq!(None, config.total_values());
}

#[test]
#[should_panic(expected = "stress run pushes more values than fit in usize")]
fn test_overflowing_run_is_refused_before_spawning() {
    let config = StressConfig::new()
        .producers(usize::MAX)
        .consumers(1)
        .values_per_producer(2);

    let _ = StressHarness::new(config).run();
}

#[test]
#[serial]
#[timeout(20000)]
fn test_every_value_delivered_exactly_once() {
    let config = StressConfig::new()
        .producers(10)
        .consumers(20)
        .values_per_producer(100)
        .consumer_wait(Duration::from_secs(1));

    let result = StressHarness::new(config).run();

    assert_eq!(1000, result.pushed);
    assert_eq!(1000, result.delivered);
    assert_eq!(0, result.duplicates);
    assert_eq!(0, result.missing);
    assert_eq!(0, result.left_behind);
    assert_eq!(20, result.per_consumer.len());
    assert!(result.is_conserved());
}

#[test]
#[serial]
#[timeout(20000)]
fn test_single_consumer_drains_many_producers() {
    let config = StressConfig::new()
        .producers(8)
        .consumers(1)
        .values_per_producer(500);

    let result = StressHarness::new(config).run();

    assert!(result.is_conserved());
    assert_eq!(vec![4000], result.per_consumer);
    assert!(result.values_per_second() > 0.0);
}

#[test]
#[serial]
#[traced_test]
fn test_runs_against_configured_buffer() {
    let buffer_config = BufferConfig::default()
        .with_wait_timeout(Duration::from_millis(50))
        .with_initial_capacity(256);
    let buffer = SharedBuffer::from_config(&buffer_config);

    let config = StressConfig::new()
        .producers(3)
        .consumers(5)
        .values_per_producer(300)
        .consumer_wait(buffer.default_wait());

    let result = StressHarness::new(config).run_with(&buffer);

    assert!(result.is_conserved());
    assert!(buffer.is_empty());
    assert!(logs_contain("finished shared buffer stress run"));
}

#[test]
#[serial]
#[timeout(20000)]
fn test_values_without_consumers_are_left_behind() {
    let config = StressConfig::new()
        .producers(2)
        .consumers(0)
        .values_per_producer(10);

    let result = StressHarness::new(config).run();

    assert_eq!(20, result.pushed);
    assert_eq!(0, result.delivered);
    assert_eq!(20, result.missing);
    assert_eq!(20, result.left_behind);
    assert!(!result.is_conserved());
}
