//! # a3s-dispatch
//!
//! In-process, priority-ordered event dispatch for the A3S ecosystem.
//!
//! ## Overview
//!
//! `a3s-dispatch` delivers typed event values to handlers registered on an
//! `EventBus`. Handlers run synchronously on the publishing thread, ordered
//! by ascending priority with ties broken by subscription order. Events that
//! implement `Cancellable` skip handlers that do not accept cancelled events
//! once a handler cancels them.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_dispatch::{BusConfig, CancelFlag, Cancellable, Event, EventBus, KeyDecl, Subscriber};
//!
//! #[derive(Default)]
//! struct OrderPlaced {
//!     total: u64,
//!     cancelled: bool,
//! }
//!
//! impl Event for OrderPlaced {
//!     const KEY: Option<KeyDecl> = Some(KeyDecl::new("commerce", "order.placed"));
//!     type Cancellation = CancelFlag;
//! }
//!
//! impl Cancellable for OrderPlaced {
//!     fn is_cancelled(&self) -> bool {
//!         self.cancelled
//!     }
//!
//!     fn set_cancelled(&mut self, cancelled: bool) {
//!         self.cancelled = cancelled;
//!     }
//! }
//!
//! # fn main() -> a3s_dispatch::Result<()> {
//! let bus = EventBus::new(BusConfig::default());
//!
//! // Reject empty orders before anyone else sees them
//! bus.subscribe_with_priority(
//!     Subscriber::infallible(|order: &mut OrderPlaced| {
//!         if order.total == 0 {
//!             order.set_cancelled(true);
//!         }
//!     }),
//!     -10,
//! )?;
//!
//! let mut order = OrderPlaced::default();
//! assert!(!bus.publish_cancellable(&mut order)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **EventKey** — validated `namespace:value` identity of an event type
//! - **KeyResolver** — memoized event type → key resolution
//! - **Registration** — copy-on-write, priority-ordered subscriber list
//! - **EventBus** — key/type indices and the publish algorithm

pub mod bus;
pub mod config;
pub mod error;
pub mod key;
pub mod registration;
pub mod resolver;
pub mod subscription;
pub mod types;

// Re-export core types
pub use bus::EventBus;
pub use config::{BusConfig, BusConfigBuilder};
pub use error::{BoxError, DispatchError, Result};
pub use key::{EventKey, KeyDecl};
pub use registration::{AnyRegistration, Registration, Snapshot};
pub use resolver::KeyResolver;
pub use subscription::{Subscriber, Subscription};
pub use types::{CancelFlag, CancelPolicy, Cancellable, Event, HandlerResult, Uncancellable};
