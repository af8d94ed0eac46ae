//! Reusable stress testing for [`shared_buffer::SharedBuffer`].
//!
//! # Examples
//!
//! ```rust
//! use shared_buffer_testing::{StressConfig, StressHarness};
//! use std::time::Duration;
//!
//! let config = StressConfig::new()
//!     .producers(4)
//!     .consumers(8)
//!     .values_per_producer(250)
//!     .consumer_wait(Duration::from_millis(200));
//!
//! let result = StressHarness::new(config).run();
//!
//! assert_eq!(result.delivered, 1000);
//! assert!(result.is_conserved());
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod stress;

pub use stress::{StressConfig, StressHarness, StressResult};
