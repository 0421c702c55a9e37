use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Single-shot completion signal shared between a waiter and a host callback.
///
/// Only the first `complete` call takes effect; later calls are ignored and
/// reported as `false`. A host that never calls back is handled by the
/// timeout on `wait`.
#[derive(Debug)]
pub struct Completion<T> {
    inner: Arc<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    resolved: bool,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Completion<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Completion<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot {
                    value: None,
                    resolved: false,
                }),
                ready: Condvar::new(),
            }),
        }
    }

    /// Resolve with `value`. Returns `false` if already resolved.
    pub fn complete(&self, value: T) -> bool {
        let mut slot = self.inner.slot.lock();
        if slot.resolved {
            return false;
        }
        slot.value = Some(value);
        slot.resolved = true;
        drop(slot);
        self.inner.ready.notify_all();
        true
    }

    pub fn is_complete(&self) -> bool {
        self.inner.slot.lock().resolved
    }

    /// Block until resolved or `timeout` elapses. The value is handed out
    /// once; later waiters on an already-consumed completion get `None`.
    pub fn wait(&self, timeout: Duration) -> Option<T> {
        let mut slot = self.inner.slot.lock();
        if !slot.resolved {
            let result = self
                .inner
                .ready
                .wait_while_for(&mut slot, |s| !s.resolved, timeout);
            if result.timed_out() && !slot.resolved {
                return None;
            }
        }
        slot.value.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn resolves_once() {
        let done = Completion::new();
        assert!(done.complete(1));
        assert!(!done.complete(2));
        assert_eq!(done.wait(Duration::from_millis(10)), Some(1));
    }

    #[test]
    fn times_out_when_never_resolved() {
        let done: Completion<()> = Completion::new();
        assert_eq!(done.wait(Duration::from_millis(20)), None);
        assert!(!done.is_complete());
    }

    #[test]
    fn wakes_waiter_from_other_thread() {
        let done = Completion::new();
        let remote = done.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.complete("flushed");
            remote.complete("again");
        });

        assert_eq!(done.wait(Duration::from_secs(2)), Some("flushed"));
        handle.join().unwrap();
        assert!(done.is_complete());
    }
}
