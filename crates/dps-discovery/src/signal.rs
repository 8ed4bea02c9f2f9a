// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Change notification for the discovery registry.
//!
//! The registry only needs a single fallible `trigger` operation. Hosts plug
//! in their own graph guard condition through [`ChangeSignal`]; [`GraphGuard`]
//! is a self-contained implementation with waitset-style blocking.

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// Notifiable handle triggered when the registry content changes.
///
/// Implementations must not block on the registry that triggers them; the
/// registry releases its lock before calling `trigger`, so reading it back is
/// allowed.
pub trait ChangeSignal: Send + Sync {
    fn trigger(&self) -> Result<()>;
}

impl<S: ChangeSignal + ?Sized> ChangeSignal for Arc<S> {
    fn trigger(&self) -> Result<()> {
        (**self).trigger()
    }
}

/// Non-owning reference: fails once the target has been dropped.
impl<S: ChangeSignal> ChangeSignal for Weak<S> {
    fn trigger(&self) -> Result<()> {
        self.upgrade().ok_or(Error::SignalReleased)?.trigger()
    }
}

/// Manually triggered graph guard condition.
///
/// Mirrors a DDS GuardCondition: the trigger value stays set until the
/// consumer resets it, and waiters are woken on every trigger.
pub struct GraphGuard {
    trigger_value: AtomicBool,
    trigger_count: AtomicU64,
    wake_lock: Mutex<()>,
    wake: Condvar,
}

impl GraphGuard {
    pub fn new() -> Self {
        Self {
            trigger_value: AtomicBool::new(false),
            trigger_count: AtomicU64::new(0),
            wake_lock: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    /// Set the trigger value; `true` wakes every waiter.
    pub fn set_trigger_value(&self, value: bool) {
        if value {
            let _guard = self.wake_lock.lock();
            self.trigger_value.store(true, Ordering::Release);
            self.trigger_count.fetch_add(1, Ordering::Relaxed);
            self.wake.notify_all();
        } else {
            self.trigger_value.store(false, Ordering::Release);
        }
    }

    pub fn get_trigger_value(&self) -> bool {
        self.trigger_value.load(Ordering::Acquire)
    }

    /// Read and reset the trigger value.
    pub fn take_trigger(&self) -> bool {
        self.trigger_value.swap(false, Ordering::AcqRel)
    }

    /// Number of times the guard has been triggered since creation.
    pub fn trigger_count(&self) -> u64 {
        self.trigger_count.load(Ordering::Relaxed)
    }

    /// Block until the guard is triggered or `timeout` elapses.
    ///
    /// Returns the trigger value observed on exit; an already-set guard
    /// returns immediately.
    pub fn wait_triggered(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.wake_lock.lock();
        while !self.get_trigger_value() {
            if self.wake.wait_until(&mut guard, deadline).timed_out() {
                return self.get_trigger_value();
            }
        }
        true
    }
}

impl Default for GraphGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeSignal for GraphGuard {
    fn trigger(&self) -> Result<()> {
        self.set_trigger_value(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn trigger_sets_value_and_counts() {
        let guard = GraphGuard::new();
        assert!(!guard.get_trigger_value());

        guard.trigger().expect("trigger");
        guard.trigger().expect("trigger");
        assert!(guard.get_trigger_value());
        assert_eq!(guard.trigger_count(), 2);

        assert!(guard.take_trigger());
        assert!(!guard.get_trigger_value());
        assert!(!guard.take_trigger());
    }

    #[test]
    fn wait_times_out_when_untriggered() {
        let guard = GraphGuard::new();
        assert!(!guard.wait_triggered(Duration::from_millis(10)));
    }

    #[test]
    fn wait_wakes_on_trigger_from_other_thread() {
        let guard = Arc::new(GraphGuard::new());
        let remote = Arc::clone(&guard);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.set_trigger_value(true);
        });

        assert!(guard.wait_triggered(Duration::from_secs(5)));
        handle.join().expect("join");
    }

    #[test]
    fn weak_signal_fails_after_release() {
        let guard = Arc::new(GraphGuard::new());
        let weak = Arc::downgrade(&guard);

        weak.trigger().expect("live target");
        assert_eq!(guard.trigger_count(), 1);

        drop(guard);
        assert_eq!(weak.trigger(), Err(Error::SignalReleased));
    }
}
