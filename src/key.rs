//! Event keys — stable identity of an event type
//!
//! An `EventKey` is a `(namespace, value)` pair written as `namespace:value`.
//! Both components are non-empty and limited to lowercase ASCII letters,
//! digits, `.`, `_` and `-`.

use crate::error::{DispatchError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Separator between namespace and value in the textual form
pub const KEY_SEPARATOR: char = ':';

/// Validated, immutable identifier of an event type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    namespace: Arc<str>,
    value: Arc<str>,
}

impl EventKey {
    /// Build a key from its two components, validating both
    pub fn new(namespace: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let namespace = namespace.as_ref();
        let value = value.as_ref();
        let input = format!("{}{}{}", namespace, KEY_SEPARATOR, value);

        validate_component(namespace).map_err(|reason| DispatchError::InvalidKey {
            input: input.clone(),
            reason: format!("namespace {}", reason),
        })?;
        validate_component(value).map_err(|reason| DispatchError::InvalidKey {
            input: input.clone(),
            reason: format!("value {}", reason),
        })?;

        Ok(Self {
            namespace: Arc::from(namespace),
            value: Arc::from(value),
        })
    }

    /// Namespace component
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Value component
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.namespace, KEY_SEPARATOR, self.value)
    }
}

impl FromStr for EventKey {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        let (namespace, value) =
            s.split_once(KEY_SEPARATOR)
                .ok_or_else(|| DispatchError::InvalidKey {
                    input: s.to_string(),
                    reason: format!("missing '{}' separator", KEY_SEPARATOR),
                })?;
        Self::new(namespace, value)
    }
}

impl Serialize for EventKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw key declaration attached to an event type at compile time
///
/// Unlike `EventKey`, a declaration is not validated until the type's key
/// is first resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDecl {
    pub namespace: &'static str,
    pub value: &'static str,
}

impl KeyDecl {
    /// Declare a key for an event type
    pub const fn new(namespace: &'static str, value: &'static str) -> Self {
        Self { namespace, value }
    }

    /// Validate the declaration into an `EventKey`
    pub fn to_key(&self) -> Result<EventKey> {
        EventKey::new(self.namespace, self.value)
    }
}

fn is_allowed(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '.' | '_' | '-')
}

fn validate_component(component: &str) -> std::result::Result<(), String> {
    if component.is_empty() {
        return Err("must not be empty".to_string());
    }
    match component.chars().find(|c| !is_allowed(*c)) {
        Some(c) => Err(format!("contains illegal character {:?}", c)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_and_parse() {
        let key = EventKey::new("a3s", "order.placed").unwrap();
        assert_eq!(key.namespace(), "a3s");
        assert_eq!(key.value(), "order.placed");
        assert_eq!(key.to_string(), "a3s:order.placed");

        let parsed: EventKey = "a3s:order.placed".parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_key_equality_requires_both_components() {
        let a = EventKey::new("a3s", "tick").unwrap();
        let b = EventKey::new("a3s", "tock").unwrap();
        let c = EventKey::new("other", "tick").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, EventKey::new("a3s", "tick").unwrap());
    }

    #[test]
    fn test_key_allows_full_charset() {
        assert!(EventKey::new("my_ns-2.0", "value_1-x.y").is_ok());
    }

    #[test]
    fn test_key_rejects_empty_components() {
        let err = EventKey::new("", "value").unwrap_err();
        assert!(matches!(err, DispatchError::InvalidKey { .. }));
        assert!(err.to_string().contains("namespace must not be empty"));

        let err = EventKey::new("ns", "").unwrap_err();
        assert!(err.to_string().contains("value must not be empty"));
    }

    #[test]
    fn test_key_rejects_illegal_characters() {
        for (ns, value) in [("A3S", "x"), ("ns", "has space"), ("ns", "a/b"), ("n:s", "x")] {
            let err = EventKey::new(ns, value).unwrap_err();
            assert!(err.is_configuration(), "{}:{} should be rejected", ns, value);
        }
    }

    #[test]
    fn test_parse_requires_separator() {
        let err = "no-separator".parse::<EventKey>().unwrap_err();
        assert!(err.to_string().contains("missing ':' separator"));
    }

    #[test]
    fn test_parse_rejects_extra_separator_in_value() {
        assert!("a:b:c".parse::<EventKey>().is_err());
    }

    #[test]
    fn test_key_serializes_as_string() {
        let key = EventKey::new("a3s", "deploy").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"a3s:deploy\"");

        let parsed: EventKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn test_key_deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<EventKey>("\"Bad:Key\"").is_err());
    }

    #[test]
    fn test_key_decl_validation() {
        const GOOD: KeyDecl = KeyDecl::new("a3s", "good");
        const BAD: KeyDecl = KeyDecl::new("a3s", "Bad");
        assert_eq!(GOOD.to_key().unwrap().to_string(), "a3s:good");
        assert!(BAD.to_key().is_err());
    }
}
