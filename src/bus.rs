//! In-process event bus
//!
//! `EventBus` owns one `Registration` per event key, indexed both by key and
//! by Rust type, and implements the publish algorithm on top of them.
//! Handlers run synchronously on the publishing thread in priority order.

use crate::config::BusConfig;
use crate::error::{DispatchError, Result};
use crate::key::EventKey;
use crate::registration::{downcast, AnyRegistration, Registration};
use crate::resolver::KeyResolver;
use crate::subscription::Subscriber;
use crate::types::{Cancellable, Event};
use dashmap::DashMap;
use std::any::{type_name, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

static GLOBAL: LazyLock<EventBus> = LazyLock::new(|| EventBus::new(BusConfig::default()));

/// Priority-ordered, in-process event dispatcher
///
/// Thread-safe: registrations are created at most once per key, and the
/// subscriber lists are copy-on-write, so publishing never blocks on a
/// concurrent subscribe or unsubscribe.
pub struct EventBus {
    config: BusConfig,
    resolver: Arc<KeyResolver>,

    /// Event key → registration
    by_key: DashMap<EventKey, Arc<dyn AnyRegistration>>,

    /// Event type → registration, filled by whoever creates the registration
    by_type: DashMap<TypeId, Arc<dyn AnyRegistration>>,
}

impl EventBus {
    /// Create a bus using the process-wide key resolver
    pub fn new(config: BusConfig) -> Self {
        Self::with_resolver(config, KeyResolver::shared())
    }

    /// Create a bus with its own key resolver
    pub fn with_resolver(config: BusConfig, resolver: Arc<KeyResolver>) -> Self {
        Self {
            config,
            resolver,
            by_key: DashMap::new(),
            by_type: DashMap::new(),
        }
    }

    /// Process-wide bus, created on first use with the default config
    pub fn global() -> &'static EventBus {
        &GLOBAL
    }

    /// Bus configuration
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Key resolver used by this bus
    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    /// Get the registration for `E`, creating it on first use
    ///
    /// Concurrent first calls for the same type all receive the same
    /// registration. Fails if `E` has no valid key, or if its key is already
    /// registered to another type.
    pub fn registration<E: Event>(&self) -> Result<Arc<Registration<E>>> {
        let key = self.resolver.resolve::<E>()?;

        let existing = self.by_key.get(&key).map(|r| Arc::clone(r.value()));
        if let Some(existing) = existing {
            return typed::<E>(existing);
        }

        let erased = {
            let entry = self.by_key.entry(key.clone()).or_insert_with(|| {
                let created: Arc<dyn AnyRegistration> =
                    Arc::new(Registration::<E>::new(key.clone()));
                self.by_type
                    .entry(TypeId::of::<E>())
                    .or_insert_with(|| Arc::clone(&created));
                tracing::debug!(
                    key = %key,
                    event_type = type_name::<E>(),
                    "Registration created"
                );
                created
            });
            Arc::clone(entry.value())
        };

        typed::<E>(erased)
    }

    /// Subscribe with the configured default priority and cancellation policy
    pub fn subscribe<E: Event>(&self, subscriber: Subscriber<E>) -> Result<()> {
        self.subscribe_with(
            subscriber,
            self.config.priority(),
            self.config.accepts_cancelled(),
        )
    }

    /// Subscribe at `priority` with the configured cancellation policy
    pub fn subscribe_with_priority<E: Event>(
        &self,
        subscriber: Subscriber<E>,
        priority: i32,
    ) -> Result<()> {
        self.subscribe_with(subscriber, priority, self.config.accepts_cancelled())
    }

    /// Subscribe at `priority`, optionally receiving cancelled events
    pub fn subscribe_with<E: Event>(
        &self,
        subscriber: Subscriber<E>,
        priority: i32,
        accepts_cancelled: bool,
    ) -> Result<()> {
        self.registration::<E>()?
            .subscribe(subscriber, priority, accepts_cancelled);
        Ok(())
    }

    /// Remove every subscription of `subscriber`
    ///
    /// Unknown subscribers are ignored.
    pub fn unsubscribe<E: Event>(&self, subscriber: &Subscriber<E>) -> Result<()> {
        self.registration::<E>()?.unsubscribe(subscriber);
        Ok(())
    }

    /// Deliver `event` to its subscribers in priority order
    ///
    /// For cancellable events, subscribers that do not accept cancelled
    /// events are skipped once the event is cancelled. The first handler
    /// error stops the dispatch and is returned.
    pub fn publish<E: Event>(&self, event: &mut E) -> Result<()> {
        self.registration::<E>()?.dispatch(event)
    }

    /// Publish a cancellable event, returning `true` if it was not cancelled
    /// after every subscriber ran
    pub fn publish_cancellable<E: Cancellable>(&self, event: &mut E) -> Result<bool> {
        self.publish(event)?;
        Ok(!event.is_cancelled())
    }

    /// Existing registration for `E`, without creating one
    pub fn get<E: Event>(&self) -> Option<Arc<Registration<E>>> {
        let erased = self
            .by_type
            .get(&TypeId::of::<E>())
            .map(|r| Arc::clone(r.value()))?;
        downcast::<E>(erased)
    }

    /// Existing registration for `key`, without creating one
    pub fn get_by_key(&self, key: &EventKey) -> Option<Arc<dyn AnyRegistration>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Keys that currently have a registration
    pub fn keys(&self) -> HashSet<EventKey> {
        self.by_key.iter().map(|r| r.key().clone()).collect()
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether no registration exists yet
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.config)
            .field("registrations", &self.by_key.len())
            .finish()
    }
}

fn typed<E: Event>(erased: Arc<dyn AnyRegistration>) -> Result<Arc<Registration<E>>> {
    let key = erased.key().clone();
    let existing = erased.event_type();
    downcast::<E>(erased).ok_or_else(|| {
        tracing::warn!(
            key = %key,
            existing,
            requested = type_name::<E>(),
            "Event key already registered to another type"
        );
        DispatchError::KeyConflict {
            key,
            existing,
            requested: type_name::<E>(),
        }
    })
}
