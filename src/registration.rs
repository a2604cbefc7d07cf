//! Per-event-type subscriber registry
//!
//! Each `Registration` holds the ordered subscriber list for one event key.
//! The list is copy-on-write: readers load the current `Arc` in one atomic
//! step and iterate a value that never changes underneath them, while
//! mutations build a new sorted list under a reentrant lock and swap it in.

use crate::error::{DispatchError, Result};
use crate::key::EventKey;
use crate::subscription::{Subscriber, Subscription};
use crate::types::{is_cancelled, Event};
use arc_swap::ArcSwap;
use parking_lot::ReentrantMutex;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Immutable, point-in-time view of a registration's subscribers
pub type Snapshot<E> = Arc<Vec<Subscription<E>>>;

/// Ordered subscribers for one event type
pub struct Registration<E> {
    key: EventKey,
    event_type: &'static str,
    subscribers: ArcSwap<Vec<Subscription<E>>>,
    /// Serializes writers; reentrant so a handler may mutate its own registration
    write_lock: ReentrantMutex<()>,
    next_sequence: AtomicU64,
}

impl<E: Event> Registration<E> {
    pub(crate) fn new(key: EventKey) -> Self {
        Self {
            key,
            event_type: type_name::<E>(),
            subscribers: ArcSwap::from_pointee(Vec::new()),
            write_lock: ReentrantMutex::new(()),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Current subscribers in dispatch order
    pub fn snapshot(&self) -> Snapshot<E> {
        self.subscribers.load_full()
    }

    /// Add a subscriber
    ///
    /// The new subscription runs after every existing subscription with the
    /// same priority.
    pub fn subscribe(&self, subscriber: Subscriber<E>, priority: i32, accepts_cancelled: bool) {
        let _guard = self.write_lock.lock();

        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let current = self.subscribers.load();
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(Subscription::new(
            priority,
            accepts_cancelled,
            sequence,
            subscriber,
        ));
        next.sort_by_key(Subscription::order_key);
        self.subscribers.store(Arc::new(next));

        tracing::debug!(
            key = %self.key,
            priority,
            accepts_cancelled,
            subscribers = self.len(),
            "Subscriber added"
        );
    }

    /// Remove every subscription of `subscriber`
    ///
    /// Returns `false` and leaves the current snapshot untouched when the
    /// subscriber was never registered.
    pub fn unsubscribe(&self, subscriber: &Subscriber<E>) -> bool {
        let _guard = self.write_lock.lock();

        let current = self.subscribers.load();
        if !current.iter().any(|s| s.subscriber().same_as(subscriber)) {
            return false;
        }

        let mut next: Vec<Subscription<E>> = current
            .iter()
            .filter(|s| !s.subscriber().same_as(subscriber))
            .cloned()
            .collect();
        next.sort_by_key(Subscription::order_key);
        self.subscribers.store(Arc::new(next));

        tracing::debug!(
            key = %self.key,
            subscribers = self.len(),
            "Subscriber removed"
        );
        true
    }

    /// Deliver `event` to a snapshot of the subscribers
    ///
    /// Cancellation is checked before every subscription, so a handler that
    /// cancels only affects the handlers after it. The first handler error
    /// aborts the pass.
    pub(crate) fn dispatch(&self, event: &mut E) -> Result<()> {
        let snapshot = self.snapshot();
        tracing::trace!(key = %self.key, subscribers = snapshot.len(), "Dispatching event");

        for subscription in snapshot.iter() {
            if is_cancelled(event) && !subscription.accepts_cancelled() {
                tracing::trace!(
                    key = %self.key,
                    priority = subscription.priority(),
                    "Skipping subscriber for cancelled event"
                );
                continue;
            }

            if let Err(source) = subscription.subscriber().handle(event) {
                tracing::warn!(
                    key = %self.key,
                    priority = subscription.priority(),
                    error = %source,
                    "Handler failed, aborting dispatch"
                );
                return Err(DispatchError::Handler {
                    key: self.key.clone(),
                    source,
                });
            }
        }

        Ok(())
    }
}

impl<E> Registration<E> {
    /// Key this registration is indexed under
    pub fn key(&self) -> &EventKey {
        &self.key
    }

    /// Rust type name of the registered event type
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    /// Number of current subscriptions
    pub fn len(&self) -> usize {
        self.subscribers.load().len()
    }

    /// Whether there are no subscriptions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> fmt::Debug for Registration<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("event_type", &self.event_type)
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Type-erased view of a `Registration`, as stored in the bus indices
pub trait AnyRegistration: Send + Sync + fmt::Debug {
    /// Key this registration is indexed under
    fn key(&self) -> &EventKey;

    /// Rust type name of the registered event type
    fn event_type(&self) -> &'static str;

    /// Number of current subscriptions
    fn len(&self) -> usize;

    /// Whether there are no subscriptions
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upcast for downcasting to the concrete `Registration<E>`
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<E: Event> AnyRegistration for Registration<E> {
    fn key(&self) -> &EventKey {
        &self.key
    }

    fn event_type(&self) -> &'static str {
        self.event_type
    }

    fn len(&self) -> usize {
        Registration::len(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Recover the typed registration from an erased one
///
/// Returns `None` when the registration belongs to a different event type.
pub fn downcast<E: Event>(registration: Arc<dyn AnyRegistration>) -> Option<Arc<Registration<E>>> {
    registration.into_any().downcast::<Registration<E>>().ok()
}
