#![forbid(unsafe_code)]

//! Single-threaded change notification.
//!
//! A [`Notifier`] holds callbacks keyed by an id. [`Notifier::subscribe`]
//! returns a [`Subscription`] guard; dropping the guard detaches the
//! callback. Callbacks are invoked in subscription order.
//!
//! Callbacks may subscribe or drop other subscriptions while a notification
//! is running: the callback list is snapshotted before dispatch, so changes
//! take effect from the next notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Registry<T> {
    next_id: u64,
    callbacks: Vec<(u64, Callback<T>)>,
}

/// Callback list for values of type `T`.
pub struct Notifier<T> {
    registry: Rc<RefCell<Registry<T>>>,
    version: u64,
}

impl<T: 'static> Notifier<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                callbacks: Vec::new(),
            })),
            version: 0,
        }
    }

    /// Register `callback`. It stays registered while the guard lives.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id = registry.next_id.wrapping_add(1);
            registry.callbacks.push((id, Rc::new(callback)));
            id
        };
        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.borrow_mut().callbacks.retain(|(cb_id, _)| *cb_id != id);
                }
            })),
        }
    }

    /// Invoke every live callback with `value`.
    pub fn notify(&mut self, value: &T) {
        self.version = self.version.wrapping_add(1);
        let callbacks: Vec<Callback<T>> = self
            .registry
            .borrow()
            .callbacks
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(value);
        }
    }

    /// Number of notifications sent so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().callbacks.len()
    }
}

impl<T: 'static> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.registry.borrow().callbacks.len())
            .field("version", &self.version)
            .finish()
    }
}

/// RAII guard for a registered callback.
#[must_use = "dropping this guard unsubscribes the callback"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Keep the callback registered for the notifier's whole lifetime.
    pub fn forget(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn subscribers_receive_values() {
        let mut notifier = Notifier::<u32>::new();
        let seen = Rc::new(Cell::new(0));
        let seen_cb = Rc::clone(&seen);
        let _sub = notifier.subscribe(move |v| seen_cb.set(*v));

        notifier.notify(&7);
        assert_eq!(seen.get(), 7);
        assert_eq!(notifier.version(), 1);
    }

    #[test]
    fn drop_detaches() {
        let mut notifier = Notifier::<u32>::new();
        let calls = Rc::new(Cell::new(0));
        let calls_cb = Rc::clone(&calls);
        let sub = notifier.subscribe(move |_| calls_cb.set(calls_cb.get() + 1));
        assert_eq!(notifier.subscriber_count(), 1);

        notifier.notify(&1);
        drop(sub);
        notifier.notify(&2);
        assert_eq!(calls.get(), 1);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn forget_keeps_callback() {
        let mut notifier = Notifier::<u32>::new();
        let calls = Rc::new(Cell::new(0));
        let calls_cb = Rc::clone(&calls);
        notifier
            .subscribe(move |_| calls_cb.set(calls_cb.get() + 1))
            .forget();
        notifier.notify(&1);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn guard_outliving_notifier_is_harmless() {
        let notifier = Notifier::<u32>::new();
        let sub = notifier.subscribe(|_| {});
        drop(notifier);
        drop(sub);
    }

    #[test]
    fn callbacks_run_in_subscription_order() {
        let mut notifier = Notifier::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&log);
        let b = Rc::clone(&log);
        let _s1 = notifier.subscribe(move |_| a.borrow_mut().push("first"));
        let _s2 = notifier.subscribe(move |_| b.borrow_mut().push("second"));
        notifier.notify(&0);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }
}
