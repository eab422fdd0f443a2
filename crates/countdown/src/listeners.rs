//! Edit-event listener registrations that are undone on drop.

use crate::event::EditEvent;
use std::fmt;

/// Something edit listeners can be registered on, such as a DOM event target.
pub trait ListenerTarget {
    type Listener;
    type Error: fmt::Display;

    fn add_listener(&self, event: EditEvent, listener: &Self::Listener) -> Result<(), Self::Error>;

    fn remove_listener(&self, event: EditEvent, listener: &Self::Listener)
    -> Result<(), Self::Error>;
}

/// Listeners currently registered on one target. Dropping the set removes
/// every one of them.
pub struct ListenerSet<T: ListenerTarget> {
    target: T,
    listeners: Vec<(EditEvent, T::Listener)>,
}

impl<T: ListenerTarget> ListenerSet<T> {
    /// Register one listener per event, each built by `make`.
    ///
    /// When a registration fails the listeners already added are removed
    /// again before the error is returned.
    pub fn register(
        target: T,
        events: impl IntoIterator<Item = EditEvent>,
        mut make: impl FnMut(EditEvent) -> T::Listener,
    ) -> Result<Self, T::Error> {
        let mut set = Self {
            target,
            listeners: Vec::new(),
        };
        for event in events {
            let listener = make(event);
            set.target.add_listener(event, &listener)?;
            set.listeners.push((event, listener));
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Hand the listeners out without removing them; they stay registered.
    pub fn into_listeners(mut self) -> Vec<(EditEvent, T::Listener)> {
        std::mem::take(&mut self.listeners)
    }
}

impl<T: ListenerTarget> Drop for ListenerSet<T> {
    fn drop(&mut self) {
        for (event, listener) in self.listeners.drain(..) {
            if let Err(err) = self.target.remove_listener(event, &listener) {
                log::warn!(
                    target: "countdown.listeners",
                    "could not remove {event} listener: {err}"
                );
            }
        }
    }
}
