//! # catalog-sync: Catalog Reconciliation Protocol
//!
//! This crate keeps locally declared catalog entities in step with a remote
//! versioned catalog store that only offers create / retrieve / update /
//! delete by id.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Reconciliation Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  EntityReconciler<E, A>   (Category, Item, ItemVariation, …)     │  │
//! │  │                                                                  │  │
//! │  │  default currency → validate → encode → store → decode           │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │  ┌────────────────────────────▼─────────────────────────────────────┐  │
//! │  │  VersionedObjectStore<A>                                         │  │
//! │  │                                                                  │  │
//! │  │  create:  temp id + fresh idempotency key                        │  │
//! │  │  update:  retrieve current version, then write against it        │  │
//! │  │  delete:  first reported id; empty report is an error            │  │
//! │  │  batch:   atomic, size-limited, temp-id references resolved      │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │ CatalogApi                              │
//! │         ┌─────────────────────┴─────────────────────┐                  │
//! │         ▼                                           ▼                   │
//! │  ┌────────────────────────┐              ┌────────────────────────┐    │
//! │  │ HTTP transport         │              │ InMemoryCatalog        │    │
//! │  │ (caller supplied)      │              │ (reference / tests)    │    │
//! │  └────────────────────────┘              └────────────────────────┘    │
//! │                                                                         │
//! │  No retries happen here. Conflicts, not-found and transport failures   │
//! │  are returned to the caller with operation, kind and id attached.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - `CatalogConfig` (default currency, batch limits)
//! - [`error`] - `TransportError`, `SyncError`, operation context
//! - [`protocol`] - Request/response bodies of the catalog store
//! - [`transport`] - The `CatalogApi` trait
//! - [`store`] - `VersionedObjectStore`, prepared writes
//! - [`reconciler`] - `EntityReconciler` and per-kind aliases
//! - [`memory`] - `InMemoryCatalog`
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use catalog_core::{Category, Item};
//! use catalog_sync::{CatalogConfig, CategoryReconciler, InMemoryCatalog, ItemReconciler};
//!
//! let api = Arc::new(InMemoryCatalog::new());
//! let config = Arc::new(CatalogConfig::default());
//!
//! let categories = CategoryReconciler::new(api.clone(), config.clone());
//! let items = ItemReconciler::new(api.clone(), config);
//!
//! let beverages = categories.create(&Category::new("Beverages")).unwrap();
//! let latte = items
//!     .create(&Item::new("Latte").in_category(beverages.id.clone()))
//!     .unwrap();
//! assert_eq!(latte.version, 1);
//!
//! let iced = items.update(&latte.id, &Item::new("Iced Latte").in_category(beverages.id)).unwrap();
//! assert_eq!(iced.version, 2);
//!
//! items.delete(&latte.id).unwrap();
//! assert!(items.retrieve(&latte.id).unwrap_err().is_not_found());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod memory;
pub mod protocol;
pub mod reconciler;
pub mod store;
pub mod transport;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CatalogConfig, CatalogSettings};
pub use error::{Context, Operation, SyncError, SyncResult, TransportError, TransportResult};
pub use memory::InMemoryCatalog;
pub use reconciler::{
    CategoryReconciler, DiscountReconciler, EntityReconciler, ItemReconciler,
    ItemVariationReconciler, Reconciled, Saved, SavedItem, TaxReconciler,
};
pub use store::{BatchOutcome, Deletion, PreparedBatch, PreparedWrite, VersionedObjectStore};
pub use transport::CatalogApi;
