//! Key resolution — map event types to their `EventKey`
//!
//! Resolution validates the type's `KeyDecl` once and memoizes the result
//! per `TypeId`. Failed resolutions are not cached; they are deterministic
//! and will fail again the same way.

use crate::error::{DispatchError, Result};
use crate::key::EventKey;
use crate::types::Event;
use dashmap::DashMap;
use std::any::{type_name, TypeId};
use std::sync::{Arc, LazyLock};

static SHARED: LazyLock<Arc<KeyResolver>> = LazyLock::new(|| Arc::new(KeyResolver::new()));

/// Memoizing resolver from event type to `EventKey`
#[derive(Debug, Default)]
pub struct KeyResolver {
    /// TypeId → resolved key
    cache: DashMap<TypeId, EventKey>,
}

impl KeyResolver {
    /// Create a resolver with an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide resolver shared by buses created with `EventBus::new`
    pub fn shared() -> Arc<KeyResolver> {
        Arc::clone(&SHARED)
    }

    /// Resolve the key of `E`, validating its declaration on first use
    pub fn resolve<E: Event>(&self) -> Result<EventKey> {
        let type_id = TypeId::of::<E>();
        if let Some(key) = self.cache.get(&type_id) {
            return Ok(key.clone());
        }

        let key = compute_key::<E>()?;
        // A concurrent resolver may have won; both computed equal keys.
        let key = self.cache.entry(type_id).or_insert(key).clone();
        tracing::trace!(event_type = type_name::<E>(), key = %key, "Event key resolved");
        Ok(key)
    }

    /// Forget every memoized key
    ///
    /// Keys already handed out stay valid; only future lookups recompute.
    pub fn clear(&self) {
        let count = self.cache.len();
        self.cache.clear();
        tracing::debug!(count, "Event key cache cleared");
    }

    /// Number of memoized event types
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no event type has been resolved yet
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn compute_key<E: Event>() -> Result<EventKey> {
    let decl = E::KEY.ok_or(DispatchError::MissingKey {
        event_type: type_name::<E>(),
    })?;
    decl.to_key()
}
