//! Core event capabilities for the a3s-dispatch system
//!
//! Event types are plain Rust values. They opt into dispatch by implementing
//! `Event`, which ties the type to exactly one `EventKey` and names its
//! cancellation policy, and optionally `Cancellable`, which adds a mutable
//! cancelled flag.

use crate::bus::EventBus;
use crate::error::{BoxError, Result};
use crate::key::KeyDecl;
use std::any::Any;

/// Result returned by every handler
pub type HandlerResult = std::result::Result<(), BoxError>;

/// A value that can be published on an `EventBus`
///
/// The key and cancellation policy are declared once per type:
///
/// ```rust
/// use a3s_dispatch::{Event, KeyDecl, Uncancellable};
///
/// struct Deployed {
///     version: String,
/// }
///
/// impl Event for Deployed {
///     const KEY: Option<KeyDecl> = Some(KeyDecl::new("a3s", "deploy.completed"));
///     type Cancellation = Uncancellable;
/// }
/// ```
///
/// Declaring `None` compiles but every bus operation on the type fails with
/// `DispatchError::MissingKey`.
pub trait Event: Any {
    /// Static key declaration for this event type
    const KEY: Option<KeyDecl>;

    /// How the bus reads the cancelled state of this event
    ///
    /// `Uncancellable` for plain events; `CancelFlag` is required by
    /// `Cancellable`.
    type Cancellation: CancelPolicy<Self>;

    /// Publish this event on the process-wide bus
    fn post(&mut self) -> Result<()>
    where
        Self: Sized,
    {
        EventBus::global().publish(self)
    }
}

/// Capability for events carrying a mutable cancelled flag
///
/// The `Event` impl of a cancellable type must declare
/// `type Cancellation = CancelFlag`, so every publish path filters on the
/// flag. Declaring anything else does not compile:
///
/// ```compile_fail
/// use a3s_dispatch::{Cancellable, Event, KeyDecl, Uncancellable};
///
/// struct Forgot {
///     cancelled: bool,
/// }
///
/// impl Event for Forgot {
///     const KEY: Option<KeyDecl> = Some(KeyDecl::new("a3s", "forgot"));
///     type Cancellation = Uncancellable;
/// }
///
/// impl Cancellable for Forgot {
///     fn is_cancelled(&self) -> bool {
///         self.cancelled
///     }
///
///     fn set_cancelled(&mut self, cancelled: bool) {
///         self.cancelled = cancelled;
///     }
/// }
/// ```
///
/// An event instance is expected to be mutated only by handlers running
/// inside a single `publish` call; concurrent publishes must use distinct
/// instances.
pub trait Cancellable: Event<Cancellation = CancelFlag> {
    /// Whether the event has been cancelled
    fn is_cancelled(&self) -> bool;

    /// Set the cancelled flag
    fn set_cancelled(&mut self, cancelled: bool);

    /// Publish this event on the process-wide bus, returning `true` if it
    /// was not cancelled after every handler ran
    fn post_checked(&mut self) -> Result<bool>
    where
        Self: Sized,
    {
        EventBus::global().publish_cancellable(self)
    }
}

/// Reads the cancelled state of an event during dispatch
pub trait CancelPolicy<E: ?Sized> {
    /// Whether handlers that reject cancelled events must be skipped
    fn is_cancelled(event: &E) -> bool;
}

/// Policy for events that can never be cancelled
#[derive(Debug, Clone, Copy, Default)]
pub struct Uncancellable;

impl<E: ?Sized> CancelPolicy<E> for Uncancellable {
    fn is_cancelled(_event: &E) -> bool {
        false
    }
}

/// Policy for `Cancellable` events: reads the event's own flag
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelFlag;

impl<E: Cancellable + ?Sized> CancelPolicy<E> for CancelFlag {
    fn is_cancelled(event: &E) -> bool {
        event.is_cancelled()
    }
}

/// Cancelled state of `event` as seen by the bus
pub fn is_cancelled<E: Event>(event: &E) -> bool {
    <E::Cancellation as CancelPolicy<E>>::is_cancelled(event)
}
