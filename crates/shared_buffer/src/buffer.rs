// Implements a FIFO hand-off buffer shared between producer and consumer threads.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::BufferConfig;

const POISONED: &str = "shared buffer lock poisoned";

/// `BufferState` is everything the buffer's mutex protects.
struct BufferState<T> {
    values: VecDeque<T>,

    /// Set by a push or a halt, cleared by a successful extraction.
    ///
    /// A `ready` flag on an empty buffer means a halt is pending.
    ready: bool,
}

impl<T> BufferState<T> {
    /// Starts with room for `capacity` values, or none at all when the
    /// allocation cannot be made.
    fn with_capacity(capacity: usize) -> Self {
        let mut values = VecDeque::new();
        if let Err(err) = values.try_reserve(capacity) {
            tracing::warn!(capacity, %err, "could not pre-allocate shared buffer");
        }

        Self {
            values,
            ready: false,
        }
    }

    /// Wake predicate for consumers blocked in [`SharedBuffer::pop`].
    fn should_wake(&self) -> bool {
        self.ready || !self.values.is_empty()
    }

    fn take_front(&mut self) -> Option<T> {
        let value = self.values.pop_front()?;
        self.ready = false;
        Some(value)
    }
}

struct Inner<T> {
    /// The mutex guarding the queued values and the ready flag.
    state: Mutex<BufferState<T>>,

    /// Signalled once per push, broadcast on halt.
    event: Condvar,

    /// Wait bound used by [`SharedBuffer::pop_wait`].
    default_wait: Duration,
}

/// `SharedBuffer` hands values of `T` from producer threads to consumer
/// threads in the order they were pushed.
///
/// The buffer is a handle: cloning it gives another handle onto the same
/// queue, which is how producers and consumers on different threads share it.
///
/// Consumers either poll with [`SharedBuffer::try_pop`] or block for a bounded
/// time with [`SharedBuffer::pop`]. A [`SharedBuffer::halt`] wakes every
/// blocked consumer at once; it does not close the buffer, later pushes are
/// delivered as usual.
///
/// # Examples
///
/// ```
/// use shared_buffer::SharedBuffer;
/// use std::thread;
/// use std::time::Duration;
///
/// let buffer = SharedBuffer::new();
///
/// let consumer_buffer = buffer.clone();
/// let consumer = thread::spawn(move || {
///     let mut received = vec![];
///     while let Some(value) = consumer_buffer.pop(Duration::from_secs(1)) {
///         received.push(value);
///     }
///     received
/// });
///
/// for i in 0..5 {
///     buffer.push(i);
/// }
///
/// // wait for the consumer to drain what was pushed, then release it.
/// while !buffer.is_empty() {
///     thread::yield_now();
/// }
/// buffer.halt();
///
/// assert_eq!(consumer.join().unwrap(), vec![0, 1, 2, 3, 4]);
/// ```
pub struct SharedBuffer<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SharedBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SharedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SharedBuffer")
            .field("len", &state.values.len())
            .field("ready", &state.ready)
            .field("default_wait", &self.inner.default_wait)
            .finish()
    }
}

impl<T> SharedBuffer<T> {
    /// Creates an empty buffer using [`BufferConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&BufferConfig::default())
    }

    /// Creates an empty buffer with room for `capacity` values before it
    /// needs to grow.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_config(&BufferConfig::default().with_initial_capacity(capacity))
    }

    #[must_use]
    pub fn from_config(config: &BufferConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(BufferState::with_capacity(config.initial_capacity)),
                event: Condvar::new(),
                default_wait: config.wait_timeout,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BufferState<T>> {
        self.inner.state.lock().expect(POISONED)
    }

    /// Appends `value` to the tail of the buffer and wakes one waiting
    /// consumer, if there is one.
    ///
    /// # Panics
    ///
    /// Panics if the buffer's mutex is poisoned.
    pub fn push(&self, value: T) {
        let mut state = self.lock();
        state.values.push_back(value);
        state.ready = true;
        drop(state);

        self.inner.event.notify_one();
    }

    /// Removes and returns the value at the head of the buffer without
    /// waiting, or `None` if the buffer is empty.
    ///
    /// # Panics
    ///
    /// Panics if the buffer's mutex is poisoned.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().take_front()
    }

    /// [`SharedBuffer::pop`] removes and returns the value at the head of
    /// the buffer, blocking the current thread for at most `timeout` until
    /// one is pushed.
    ///
    /// Returns `None` when the timeout runs out with nothing pushed, or when
    /// a [`SharedBuffer::halt`] wakes the thread and there is still nothing
    /// to take. The two cases are not told apart; callers that need to know
    /// should keep their own completion flag alongside `halt`.
    ///
    /// Without a push or halt this never returns before `timeout` has
    /// elapsed, spurious wake-ups are waited out.
    ///
    /// # Panics
    ///
    /// Panics if the buffer's mutex is poisoned.
    pub fn pop(&self, timeout: Duration) -> Option<T> {
        if let Some(value) = self.try_pop() {
            return Some(value);
        }

        let state = self.lock();
        let (mut state, _) = self
            .inner
            .event
            .wait_timeout_while(state, timeout, |state| !state.should_wake())
            .expect(POISONED);

        if !state.should_wake() {
            tracing::debug!(?timeout, "pop timed out with no values");
            return None;
        }

        // a halt with nothing queued must return rather than wait again.
        let value = state.take_front();
        if value.is_none() {
            tracing::debug!("pop woken by halt with no values");
        }
        value
    }

    /// Same as [`SharedBuffer::pop`] with the wait bound the buffer was
    /// configured with.
    ///
    /// # Panics
    ///
    /// Panics if the buffer's mutex is poisoned.
    pub fn pop_wait(&self) -> Option<T> {
        self.pop(self.inner.default_wait)
    }

    /// Wakes every consumer blocked in [`SharedBuffer::pop`].
    ///
    /// Woken consumers still take a value if one is queued. The halt stays
    /// pending until the next successful extraction, so a `pop` on an empty
    /// buffer after a halt returns `None` straight away. Halting again, or
    /// halting a non-empty buffer, only repeats the wake-up.
    ///
    /// # Panics
    ///
    /// Panics if the buffer's mutex is poisoned.
    pub fn halt(&self) {
        let mut state = self.lock();
        state.ready = true;
        let pending = state.values.len();
        drop(state);

        tracing::debug!(pending, "halting shared buffer, waking all consumers");
        self.inner.event.notify_all();
    }

    /// Number of values currently queued.
    ///
    /// # Panics
    ///
    /// Panics if the buffer's mutex is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    /// # Panics
    ///
    /// Panics if the buffer's mutex is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn default_wait(&self) -> Duration {
        self.inner.default_wait
    }
}
