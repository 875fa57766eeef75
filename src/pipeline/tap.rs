//! Taps: fixed, named publish points for external consumers.
//!
//! The pipeline never holds a reference to a renderer or a log file;
//! instead it owns one subscriber list per tap, and consumers register
//! closures. Publication is synchronous, on the processing thread, in
//! subscription order.

/// A publish/subscribe list for one named output point.
pub struct Tap<T: ?Sized> {
    subscribers: Vec<Box<dyn FnMut(&T) + Send>>,
}

impl<T: ?Sized> Tap<T> {
    /// Create a tap with no subscribers.
    pub const fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Register a subscriber. Subscribers are invoked in registration order
    /// and cannot be removed individually.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&T) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether the tap has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Publish a value to every subscriber.
    pub(crate) fn publish(&mut self, value: &T) {
        for subscriber in &mut self.subscribers {
            subscriber(value);
        }
    }
}

impl<T: ?Sized> Default for Tap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for Tap<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tap")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
