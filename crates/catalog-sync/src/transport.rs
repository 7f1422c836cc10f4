//! # Catalog Transport
//!
//! The seam between the reconciliation protocol and the outside world.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  VersionedObjectStore                                                   │
//! │        │  CatalogApi::{retrieve, upsert, batch_upsert, delete}         │
//! │        ▼                                                                │
//! │  ┌────────────────────────────┐    ┌──────────────────────────────┐    │
//! │  │ authenticated HTTP client  │ or │ InMemoryCatalog (reference)  │    │
//! │  │ (supplied by the caller)   │    │                              │    │
//! │  └────────────────────────────┘    └──────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Calls are synchronous and blocking. Timeouts, TLS, authentication and
//! cancellation belong to the implementation, not to this crate.

use std::sync::Arc;

use crate::error::TransportResult;
use crate::protocol::{
    BatchUpsertRequest, BatchUpsertResponse, DeleteObjectResponse, RetrieveObjectResponse,
    UpsertObjectRequest, UpsertObjectResponse,
};

/// The four primitives the remote catalog store offers.
///
/// Implementations report failures as [`TransportError`](crate::error::TransportError);
/// a 404 should become `NotFound` and a version mismatch `Conflict`, though
/// an `Http` error with status 409 is also recognised as a conflict.
pub trait CatalogApi: Send + Sync {
    /// Fetches one object by id.
    fn retrieve(&self, object_id: &str) -> TransportResult<RetrieveObjectResponse>;

    /// Creates or updates one object.
    fn upsert(&self, request: &UpsertObjectRequest) -> TransportResult<UpsertObjectResponse>;

    /// Creates or updates several objects atomically.
    fn batch_upsert(&self, request: &BatchUpsertRequest) -> TransportResult<BatchUpsertResponse>;

    /// Deletes one object and anything that depends on it.
    fn delete(&self, object_id: &str) -> TransportResult<DeleteObjectResponse>;
}

impl<T: CatalogApi + ?Sized> CatalogApi for &T {
    fn retrieve(&self, object_id: &str) -> TransportResult<RetrieveObjectResponse> {
        (**self).retrieve(object_id)
    }

    fn upsert(&self, request: &UpsertObjectRequest) -> TransportResult<UpsertObjectResponse> {
        (**self).upsert(request)
    }

    fn batch_upsert(&self, request: &BatchUpsertRequest) -> TransportResult<BatchUpsertResponse> {
        (**self).batch_upsert(request)
    }

    fn delete(&self, object_id: &str) -> TransportResult<DeleteObjectResponse> {
        (**self).delete(object_id)
    }
}

impl<T: CatalogApi + ?Sized> CatalogApi for Arc<T> {
    fn retrieve(&self, object_id: &str) -> TransportResult<RetrieveObjectResponse> {
        (**self).retrieve(object_id)
    }

    fn upsert(&self, request: &UpsertObjectRequest) -> TransportResult<UpsertObjectResponse> {
        (**self).upsert(request)
    }

    fn batch_upsert(&self, request: &BatchUpsertRequest) -> TransportResult<BatchUpsertResponse> {
        (**self).batch_upsert(request)
    }

    fn delete(&self, object_id: &str) -> TransportResult<DeleteObjectResponse> {
        (**self).delete(object_id)
    }
}

impl<T: CatalogApi + ?Sized> CatalogApi for Box<T> {
    fn retrieve(&self, object_id: &str) -> TransportResult<RetrieveObjectResponse> {
        (**self).retrieve(object_id)
    }

    fn upsert(&self, request: &UpsertObjectRequest) -> TransportResult<UpsertObjectResponse> {
        (**self).upsert(request)
    }

    fn batch_upsert(&self, request: &BatchUpsertRequest) -> TransportResult<BatchUpsertResponse> {
        (**self).batch_upsert(request)
    }

    fn delete(&self, object_id: &str) -> TransportResult<DeleteObjectResponse> {
        (**self).delete(object_id)
    }
}
