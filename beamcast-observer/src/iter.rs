//! Blocking iterator over coordinator-emitted events
//!
//! The coordinator's outward events cross from its execution context to the
//! host over a plain channel; this wrapper gives hosts a sync, iterator-shaped
//! way to drain them without async/await.

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

/// Blocking iterator over events of type `T`
///
/// `next()` blocks until an event is available or the coordinator goes away.
/// Use [`try_recv`](EventIterator::try_recv) for non-blocking access, or the
/// timeout variants to poll with a bound.
pub struct EventIterator<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> EventIterator<T> {
    /// Wrap a shared receiver
    pub fn new(rx: Arc<Mutex<mpsc::Receiver<T>>>) -> Self {
        Self { rx }
    }

    /// Block until an event is available
    ///
    /// Returns `None` once the emitting side is gone.
    pub fn recv(&self) -> Option<T> {
        self.rx.lock().ok()?.recv().ok()
    }

    /// Receive without blocking
    ///
    /// Returns `None` when no event is queued or the emitter is gone.
    pub fn try_recv(&self) -> Option<T> {
        self.rx.lock().ok()?.try_recv().ok()
    }

    /// Block until an event is available or the timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        self.rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    /// Non-blocking iterator over currently queued events
    pub fn try_iter(&self) -> TryIter<'_, T> {
        TryIter { inner: self }
    }

    /// Iterator that blocks up to `timeout` per event
    pub fn timeout_iter(&self, timeout: Duration) -> TimeoutIter<'_, T> {
        TimeoutIter {
            inner: self,
            timeout,
        }
    }
}

impl<T> Iterator for EventIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.recv()
    }
}

impl<T> Clone for EventIterator<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

/// Non-blocking iterator over currently queued events
pub struct TryIter<'a, T> {
    inner: &'a EventIterator<T>,
}

impl<'a, T> Iterator for TryIter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.try_recv()
    }
}

/// Iterator that blocks up to a fixed timeout per event
pub struct TimeoutIter<'a, T> {
    inner: &'a EventIterator<T>,
    timeout: Duration,
}

impl<'a, T> Iterator for TimeoutIter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.recv_timeout(self.timeout)
    }
}
