//! Subscribers and their subscriptions
//!
//! A `Subscriber` is a shared handler whose identity survives cloning, so
//! the same handle used to subscribe can later unsubscribe. A `Subscription`
//! pairs a subscriber with its priority and cancellation policy.

use crate::types::HandlerResult;
use std::fmt;
use std::sync::Arc;

type Handler<E> = dyn Fn(&mut E) -> HandlerResult + Send + Sync;

/// Shared event handler with pointer identity
pub struct Subscriber<E> {
    handler: Arc<Handler<E>>,
}

impl<E> Subscriber<E> {
    /// Wrap a fallible handler
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&mut E) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Wrap a handler that never fails
    pub fn infallible<F>(handler: F) -> Self
    where
        F: Fn(&mut E) + Send + Sync + 'static,
        E: 'static,
    {
        Self::new(move |event: &mut E| {
            handler(event);
            Ok(())
        })
    }

    /// Invoke the handler
    pub fn handle(&self, event: &mut E) -> HandlerResult {
        (self.handler)(event)
    }

    /// Whether both handles refer to the same handler
    pub fn same_as(&self, other: &Subscriber<E>) -> bool {
        // Compare data pointers only; vtable pointers may differ across
        // codegen units for the same closure.
        std::ptr::eq(
            Arc::as_ptr(&self.handler) as *const (),
            Arc::as_ptr(&other.handler) as *const (),
        )
    }
}

impl<E> Clone for Subscriber<E> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<E> PartialEq for Subscriber<E> {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl<E> Eq for Subscriber<E> {}

impl<E> fmt::Debug for Subscriber<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("handler", &(Arc::as_ptr(&self.handler) as *const ()))
            .finish()
    }
}

/// A subscriber registered at a priority
///
/// Lower priorities run first; equal priorities run in subscription order.
pub struct Subscription<E> {
    priority: i32,
    accepts_cancelled: bool,
    sequence: u64,
    subscriber: Subscriber<E>,
}

impl<E> Subscription<E> {
    pub(crate) fn new(
        priority: i32,
        accepts_cancelled: bool,
        sequence: u64,
        subscriber: Subscriber<E>,
    ) -> Self {
        Self {
            priority,
            accepts_cancelled,
            sequence,
            subscriber,
        }
    }

    /// Dispatch priority (ascending)
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether the handler still runs once the event is cancelled
    pub fn accepts_cancelled(&self) -> bool {
        self.accepts_cancelled
    }

    /// Insertion order within the owning registration
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The subscribed handler
    pub fn subscriber(&self) -> &Subscriber<E> {
        &self.subscriber
    }

    pub(crate) fn order_key(&self) -> (i32, u64) {
        (self.priority, self.sequence)
    }
}

impl<E> Clone for Subscription<E> {
    fn clone(&self) -> Self {
        Self {
            priority: self.priority,
            accepts_cancelled: self.accepts_cancelled,
            sequence: self.sequence,
            subscriber: self.subscriber.clone(),
        }
    }
}

impl<E> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("priority", &self.priority)
            .field("accepts_cancelled", &self.accepts_cancelled)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
