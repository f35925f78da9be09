//! Opaque entity identifiers and the injectable ID source.
//!
//! Entities are identified by opaque string ids assigned once at creation.
//! Id generation is a service injected into the engine so tests can use a
//! deterministic counter while production uses random UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a raw id string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Opaque identifier of a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Wraps a raw id string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Opaque identifier of a notification entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    /// Wraps a raw id string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Source of fresh entity ids.
///
/// Every id handed out must be unique for the lifetime of the state it
/// feeds. The engine owns exactly one source and threads it through all
/// entity-creating operations.
pub trait IdSource {
    /// Returns the next fresh id.
    fn next_id(&mut self) -> String;
}

/// Deterministic monotonic id source.
///
/// Produces `"1"`, `"2"`, `"3"`, ... in order. Used by tests and anywhere
/// reproducible ids matter.
#[derive(Debug, Default)]
pub struct CounterIds {
    next: u64,
}

impl CounterIds {
    /// Creates a counter starting at 1.
    pub fn new() -> Self {
        Self { next: 0 }
    }
}

impl IdSource for CounterIds {
    fn next_id(&mut self) -> String {
        self.next += 1;
        self.next.to_string()
    }
}

/// Random id source backed by UUID v4.
#[derive(Debug, Default)]
pub struct UuidIds;

impl UuidIds {
    /// Creates a new UUID source.
    pub fn new() -> Self {
        Self
    }
}

impl IdSource for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_ids_are_sequential() {
        let mut ids = CounterIds::new();
        assert_eq!(ids.next_id(), "1");
        assert_eq!(ids.next_id(), "2");
        assert_eq!(ids.next_id(), "3");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let mut ids = UuidIds::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = PostId::new("p42");
        let json = serde_json::to_string(&id).expect("Failed to serialize");
        assert_eq!(json, "\"p42\"");

        let back: PostId = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(back, id);
    }
}
