//! Change subscriptions.
//!
//! UI layers register a callback with a store and are handed the committed
//! state after every mutation that actually changed it. Callbacks run
//! synchronously, in registration order, after the snapshot has been
//! written.

use std::fmt;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Callback<S> = Box<dyn Fn(&S) + Send>;

/// Registered callbacks for one store.
pub struct Listeners<S> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback<S>)>,
}

impl<S> Default for Listeners<S> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<S> fmt::Debug for Listeners<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<S> Listeners<S> {
    /// Register a callback.
    pub fn subscribe(&mut self, callback: impl Fn(&S) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if the ID is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Invoke every callback with `state`.
    pub fn notify(&self, state: &S) {
        for (_, callback) in &self.entries {
            callback(state);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_notify_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::<u32>::default();

        let first = Arc::clone(&seen);
        listeners.subscribe(move |v| first.lock().unwrap().push(("first", *v)));
        let second = Arc::clone(&seen);
        listeners.subscribe(move |v| second.lock().unwrap().push(("second", *v)));

        listeners.notify(&7);

        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let calls = Arc::new(Mutex::new(0));
        let mut listeners = Listeners::<()>::default();

        let counter = Arc::clone(&calls);
        let id = listeners.subscribe(move |()| *counter.lock().unwrap() += 1);

        listeners.notify(&());
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.notify(&());

        assert_eq!(*calls.lock().unwrap(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut listeners = Listeners::<()>::default();
        let a = listeners.subscribe(|()| {});
        listeners.unsubscribe(a);
        let b = listeners.subscribe(|()| {});
        assert_ne!(a, b);
    }
}
