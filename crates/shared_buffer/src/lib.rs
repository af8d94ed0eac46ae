//! A generic buffer for pushing values from one thread to another.
//!
//! [`SharedBuffer`] is a first-in first-out queue guarded by a mutex and a
//! condition variable. Any number of producers push, any number of consumers
//! pop, either without waiting or blocking for a bounded time, and a halt
//! releases every blocked consumer at once.
//!
//! ```
//! use shared_buffer::SharedBuffer;
//! use std::time::Duration;
//!
//! let buffer = SharedBuffer::new();
//! buffer.push("hello");
//!
//! assert_eq!(Some("hello"), buffer.pop(Duration::from_millis(10)));
//!
//! buffer.halt();
//! assert_eq!(None, buffer.pop(Duration::from_secs(1)));
//! ```

mod buffer;
pub mod config;

pub use buffer::SharedBuffer;
pub use config::{BufferConfig, ConfigError, ConfigResult};
