//! Observable values and event emitters
//!
//! Consumers (views, reporters, tests) observe the model through [`Property`] values and
//! [`Emitter`] event streams. Listeners only ever receive shared references to the new
//! value or event, so they cannot reach back into the model while it is stepping.

use std::fmt;

/// Handle returned when registering a listener, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type PropertyListener<T> = Box<dyn FnMut(&T, &T)>;

/// A value that notifies listeners whenever it changes
///
/// Listeners are called with `(new_value, old_value)` in registration order.
///
/// # Example
/// ```
/// use greenhouse_core::observable::Property;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(Cell::new(0.0));
/// let mut temperature = Property::new(245.0);
/// let sink = Rc::clone(&seen);
/// temperature.lazy_link(move |new, _old| sink.set(*new));
///
/// temperature.set(250.0);
/// assert_eq!(seen.get(), 250.0);
/// ```
pub struct Property<T> {
    value: T,
    initial_value: T,
    listeners: Vec<(ListenerId, PropertyListener<T>)>,
    next_listener_id: u64,
}

impl<T: Clone + PartialEq> Property<T> {
    /// Create a property whose initial (reset) value is `value`
    pub fn new(value: T) -> Self {
        Self {
            initial_value: value.clone(),
            value,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Current value
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Value the property was constructed with
    pub fn initial_value(&self) -> &T {
        &self.initial_value
    }

    /// Replace the value, notifying listeners if it changed
    pub fn set(&mut self, value: T) {
        if value == self.value {
            return;
        }
        let old_value = std::mem::replace(&mut self.value, value);
        for (_, listener) in &mut self.listeners {
            listener(&self.value, &old_value);
        }
    }

    /// Register a listener and call it immediately with the current value
    pub fn link(&mut self, mut listener: impl FnMut(&T, &T) + 'static) -> ListenerId {
        listener(&self.value, &self.value);
        self.lazy_link(listener)
    }

    /// Register a listener that is only called on future changes
    pub fn lazy_link(&mut self, listener: impl FnMut(&T, &T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unlink(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Restore the initial value, notifying listeners if that is a change
    pub fn reset(&mut self) {
        self.set(self.initial_value.clone());
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

type EventListener<E> = Box<dyn FnMut(&E)>;

/// A stream of events delivered synchronously to subscribers
///
/// Unsubscribing is the cancellation mechanism: a removed listener receives nothing further.
pub struct Emitter<E> {
    listeners: Vec<(ListenerId, EventListener<E>)>,
    next_listener_id: u64,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }
}

impl<E> Emitter<E> {
    /// Create an emitter with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every future event
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener in registration order
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
