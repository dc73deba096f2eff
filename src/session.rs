//! Notifications for when a user signs in or out.
//!
//! Observers register a callback with [SessionHub::subscribe] and get a
//! [Subscription] back. The callback stays registered until the subscription
//! is unsubscribed or dropped, whichever happens first.

use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex, Weak},
};

use email_address::EmailAddress;

use crate::UserID;

/// A change in who is signed in.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A user signed in, either by logging in or registering.
    SignedIn {
        /// The ID of the user that signed in.
        user_id: UserID,
        /// The email address of the user that signed in.
        email: EmailAddress,
    },
    /// A user signed out.
    SignedOut {
        /// The ID of the user that signed out, if the session was still valid.
        user_id: Option<UserID>,
    },
}

type Callback = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: HashMap<u64, Callback>,
}

/// Fans out [SessionEvent]s to every registered callback.
///
/// Cloning the hub gives another handle to the same set of subscribers.
#[derive(Clone, Default)]
pub struct SessionHub {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl Debug for SessionHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHub")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl SessionHub {
    /// Create a hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` to be called with every future session event.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let mut subscribers = match self.subscribers.lock() {
            Ok(subscribers) => subscribers,
            Err(poisoned) => poisoned.into_inner(),
        };

        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.callbacks.insert(id, Arc::new(callback));

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Call every registered callback with `event`.
    ///
    /// The callbacks run after the subscriber list has been unlocked, so a
    /// callback may itself subscribe or unsubscribe.
    pub fn publish(&self, event: SessionEvent) {
        let callbacks: Vec<Callback> = match self.subscribers.lock() {
            Ok(subscribers) => subscribers.callbacks.values().cloned().collect(),
            Err(error) => {
                tracing::error!("could not acquire the session subscriber lock: {error}");
                return;
            }
        };

        tracing::debug!(
            "Publishing session event {event:?} to {} subscriber(s)",
            callbacks.len()
        );

        for callback in callbacks {
            callback(&event);
        }
    }

    /// The number of callbacks currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .map(|subscribers| subscribers.callbacks.len())
            .unwrap_or_default()
    }
}

/// A handle to a callback registered with a [SessionHub].
///
/// Dropping the handle unsubscribes the callback.
#[must_use = "the callback is unsubscribed as soon as the subscription is dropped"]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    /// Stop receiving session events.
    pub fn unsubscribe(self) {
        // Removal happens in `drop`.
    }

    fn remove(&self) {
        let Some(subscribers) = self.subscribers.upgrade() else {
            return;
        };

        let mut subscribers = match subscribers.lock() {
            Ok(subscribers) => subscribers,
            Err(poisoned) => poisoned.into_inner(),
        };

        subscribers.callbacks.remove(&self.id);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
