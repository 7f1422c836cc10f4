//! # Identifier Generation
//!
//! Temporary object ids and per-request idempotency keys.
//!
//! ## Identifier Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Local entity                                                           │
//! │       │  new_temporary_id()  →  "#6f1c…"  (sentinel prefix)            │
//! │       ▼                                                                 │
//! │  Upsert { idempotency_key: new_idempotency_key(), object: {id:"#6f1c…"}}│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store assigns permanent id "ITEM_456"                                 │
//! │       │  the temporary id is dropped and never sent again              │
//! │       ▼                                                                 │
//! │  Later writes use "ITEM_456" and a fresh idempotency key each          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both generators are backed by UUID v4 (122 random bits from the OS
//! CSPRNG), so collisions within a process lifetime are not a practical
//! concern.

use uuid::Uuid;

/// Leading marker distinguishing temporary ids from store-assigned ones.
pub const TEMPORARY_ID_PREFIX: char = '#';

/// Returns a fresh, process-unique temporary object id.
///
/// ## Example
/// ```rust
/// use catalog_core::ids::{is_temporary_id, new_temporary_id};
///
/// let id = new_temporary_id();
/// assert!(id.starts_with('#'));
/// assert!(is_temporary_id(&id));
/// ```
pub fn new_temporary_id() -> String {
    format!("{}{}", TEMPORARY_ID_PREFIX, Uuid::new_v4())
}

/// Returns a fresh idempotency key for one logical write.
///
/// Resending the same write after an ambiguous failure must reuse its key;
/// a new logical write always gets a new one.
pub fn new_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}

/// Returns true if `id` carries the temporary-id sentinel.
#[inline]
pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMPORARY_ID_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_temporary_ids_are_unique_and_prefixed() {
        let ids: HashSet<String> = (0..10_000).map(|_| new_temporary_id()).collect();
        assert_eq!(ids.len(), 10_000);
        assert!(ids.iter().all(|id| is_temporary_id(id)));
    }

    #[test]
    fn test_idempotency_keys_are_unique() {
        let keys: HashSet<String> = (0..1_000).map(|_| new_idempotency_key()).collect();
        assert_eq!(keys.len(), 1_000);
        assert!(keys.iter().all(|k| !is_temporary_id(k)));
    }

    #[test]
    fn test_permanent_ids_are_not_temporary() {
        assert!(!is_temporary_id("ITEM_456"));
        assert!(!is_temporary_id(""));
    }
}
