//! # catalog-core: Pure Catalog Object Logic
//!
//! This crate holds everything about catalog objects that does not touch the
//! network: the typed entities, the wire envelope, the codec between them,
//! identifier generation and local validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Catalog Reconciliation Layers                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        Declarative resource framework (external caller)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ create / retrieve / update / delete   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │      catalog-sync: EntityReconciler ─► VersionedObjectStore     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ catalog-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌────────────┐     │   │
//! │  │   │  types   │  │  object  │  │  codec   │  │ validation │     │   │
//! │  │   │ Category │  │ Catalog  │  │ encode   │  │  bounds    │     │   │
//! │  │   │ Item …   │  │ Object   │  │ decode   │  │  formats   │     │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └────────────┘     │   │
//! │  │   ┌──────────┐  ┌────────────┐  ┌──────────┐                   │   │
//! │  │   │  money   │  │ percentage │  │   ids    │                   │   │
//! │  │   └──────────┘  └────────────┘  └──────────┘                   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Typed entities (Category, Item, ItemVariation, Discount, Tax)
//! - [`object`] - Wire envelope (`CatalogObject`) and variant payloads
//! - [`codec`] - `CatalogEntity` trait, `encode`, `decode`
//! - [`ids`] - Temporary ids and idempotency keys
//! - [`money`] - Integer money with currency
//! - [`percentage`] - Exact decimal percentages
//! - [`validation`] - Field constraint checks
//! - [`error`] - `ValidationError`, `DecodeError`
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_core::codec::{decode, encode};
//! use catalog_core::ids::new_temporary_id;
//! use catalog_core::{ItemVariation, Money};
//!
//! let variation = ItemVariation::fixed("ITEM_456", "Large", Money::new(525, "USD"));
//! let object = encode(new_temporary_id(), None, &variation).unwrap();
//!
//! let back: ItemVariation = decode(&object).unwrap();
//! assert_eq!(back, variation);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod codec;
pub mod error;
pub mod ids;
pub mod money;
pub mod object;
pub mod percentage;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use codec::CatalogEntity;
pub use error::{CoreError, CoreResult, DecodeError, DecodeResult, ValidationError};
pub use money::Money;
pub use object::{CatalogObject, ObjectData, ObjectType};
pub use percentage::Percentage;
pub use types::*;
pub use validation::ValidationResult;
