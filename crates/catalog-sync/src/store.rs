//! # Versioned Object Store
//!
//! The optimistic-concurrency protocol every entity kind goes through.
//!
//! ## Object Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog Object States                                │
//! │                                                                         │
//! │  ┌─────────┐   create()    ┌──────────────────┐                        │
//! │  │ Unsaved │ ────────────► │ Saved(id, v = 1) │ ◄──┐                   │
//! │  │ #temp   │               └────────┬─────────┘    │                   │
//! │  └─────────┘                        │              │ retrieve()        │
//! │       ▲                             │              │ (no change)       │
//! │       │ failure                     │ update()     │                   │
//! │       │ (stays unsaved)             ▼              │                   │
//! │                           ┌──────────────────┐     │                   │
//! │                           │ Saved(id, v + 1) │ ────┘                   │
//! │                           └────────┬─────────┘                         │
//! │                                    │ delete()                          │
//! │                                    ▼                                    │
//! │                           ┌──────────────────┐                         │
//! │                           │ Deleted          │  every later call on    │
//! │                           └──────────────────┘  the id → NotFound      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Update Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. retrieve(id)                → current version V from the store     │
//! │  2. upsert { key, id, data, V } → store checks V == current            │
//! │  3a. accepted                   → version V + 1                        │
//! │  3b. mismatch                   → SyncError::Conflict, not retried     │
//! │                                                                         │
//! │  A caller-supplied version is never used: it may be stale.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes go through a [`PreparedWrite`], which fixes the idempotency key.
//! Submitting the same prepared write twice is recognised by the store as
//! one logical write; every new `prepare_*` call gets a fresh key.

use catalog_core::ids::{is_temporary_id, new_idempotency_key, new_temporary_id};
use catalog_core::{CatalogObject, DecodeError, ObjectData, ObjectType, ValidationError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::error::{Context, Operation, SyncError, SyncResult, TransportError};
use crate::protocol::{
    permanent_id, BatchUpsertRequest, IdMapping, ObjectBatch, UpsertObjectRequest,
};
use crate::transport::CatalogApi;

// =============================================================================
// Prepared Writes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Create,
    Update,
}

/// One logical write with its idempotency key fixed.
///
/// Resubmit the same `PreparedWrite` after an ambiguous failure; build a new
/// one for a new intent.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedWrite {
    kind: WriteKind,
    idempotency_key: String,
    object: CatalogObject,
}

impl PreparedWrite {
    pub fn operation(&self) -> Operation {
        match self.kind {
            WriteKind::Create => Operation::Create,
            WriteKind::Update => Operation::Update,
        }
    }

    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    /// The envelope that will be sent: a temporary id for creates, the
    /// freshly retrieved version for updates.
    pub fn object(&self) -> &CatalogObject {
        &self.object
    }

    fn context(&self) -> Context {
        let context = Context::new(self.operation(), self.object.object_type());
        match self.kind {
            WriteKind::Create => context,
            WriteKind::Update => context.with_id(self.object.id.clone()),
        }
    }
}

/// An atomic batch upsert with its idempotency key fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBatch {
    request: BatchUpsertRequest,
}

impl PreparedBatch {
    pub fn idempotency_key(&self) -> &str {
        &self.request.idempotency_key
    }

    pub fn request(&self) -> &BatchUpsertRequest {
        &self.request
    }
}

// =============================================================================
// Results
// =============================================================================

/// Result of a delete: the requested object plus any dependents removed
/// with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    /// First id the store reported deleted.
    pub id: String,
    /// Every id the store reported deleted, in store order.
    pub deleted_ids: Vec<String>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Committed objects of a batch upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub objects: Vec<CatalogObject>,
    pub id_mappings: Vec<IdMapping>,
}

impl BatchOutcome {
    /// Returns the permanent id assigned to a submitted temporary id.
    pub fn permanent_id(&self, temporary_id: &str) -> Option<&str> {
        permanent_id(&self.id_mappings, temporary_id)
    }

    /// Finds the committed object for an id as it was submitted, temporary
    /// or permanent.
    pub fn resolve(&self, submitted_id: &str) -> Option<&CatalogObject> {
        let id = self.permanent_id(submitted_id).unwrap_or(submitted_id);
        self.objects.iter().find(|o| o.id == id)
    }
}

// =============================================================================
// Versioned Object Store
// =============================================================================

/// Retrieve / upsert / delete against the remote store with version checks.
///
/// Holds no cache: every update re-retrieves the object first.
pub struct VersionedObjectStore<A> {
    api: A,
    config: Arc<CatalogConfig>,
}

impl<A: CatalogApi> VersionedObjectStore<A> {
    pub fn new(api: A, config: Arc<CatalogConfig>) -> Self {
        VersionedObjectStore { api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // =========================================================================
    // Retrieve
    // =========================================================================

    /// Fetches the current envelope of `id`, which must be an `object_type`.
    ///
    /// ## Errors
    /// - `NotFound` if the id is unknown or the object is deleted
    /// - `Decode` if the store holds a different kind under this id
    pub fn retrieve(&self, object_type: ObjectType, id: &str) -> SyncResult<CatalogObject> {
        let context = Context::new(Operation::Retrieve, object_type).with_id(id);
        self.fetch(context, object_type, id)
    }

    fn fetch(&self, context: Context, object_type: ObjectType, id: &str) -> SyncResult<CatalogObject> {
        debug!(
            operation = %context.operation,
            object_type = %object_type,
            id = %id,
            "Retrieving catalog object"
        );

        let object = self
            .api
            .retrieve(id)
            .map_err(|e| transport_failure(context.clone(), None, e))?
            .object;

        if object.is_deleted {
            warn!(object_type = %object_type, id = %id, "Catalog object is deleted");
            return Err(SyncError::NotFound { context });
        }
        if object.id != id {
            return Err(unexpected(
                context,
                format!("asked for '{}', store returned '{}'", id, object.id),
            ));
        }
        if object.object_type() != object_type {
            return Err(SyncError::decode(
                context,
                DecodeError::TypeMismatch {
                    expected: object_type,
                    actual: object.object_type(),
                },
            ));
        }

        Ok(object)
    }

    // =========================================================================
    // Create / Update
    // =========================================================================

    /// Prepares a create under a fresh temporary id and idempotency key.
    pub fn prepare_create(&self, data: ObjectData) -> PreparedWrite {
        PreparedWrite {
            kind: WriteKind::Create,
            idempotency_key: new_idempotency_key(),
            object: CatalogObject::new(new_temporary_id(), None, data),
        }
    }

    /// Retrieves `id` and prepares an update stamped with its current version.
    pub fn prepare_update(&self, id: &str, data: ObjectData) -> SyncResult<PreparedWrite> {
        let object_type = data.object_type();
        let context = Context::new(Operation::Update, object_type).with_id(id);

        if is_temporary_id(id) {
            return Err(SyncError::validation(
                context,
                ValidationError::invalid_format("id", "a temporary id has never been saved"),
            ));
        }

        let current = self.fetch(context, object_type, id)?;
        debug!(
            object_type = %object_type,
            id = %id,
            version = ?current.version,
            "Retrieved current version for update"
        );

        Ok(self.prepare_update_from(&current, data))
    }

    /// Prepares an update against an envelope that was just retrieved.
    pub(crate) fn prepare_update_from(&self, current: &CatalogObject, data: ObjectData) -> PreparedWrite {
        PreparedWrite {
            kind: WriteKind::Update,
            idempotency_key: new_idempotency_key(),
            object: CatalogObject::new(current.id.clone(), current.version, data),
        }
    }

    /// Creates a new object. The store assigns its permanent id.
    pub fn create(&self, data: ObjectData) -> SyncResult<CatalogObject> {
        let write = self.prepare_create(data);
        self.submit(&write)
    }

    /// Replaces the payload of `id`, writing against its current version.
    pub fn update(&self, id: &str, data: ObjectData) -> SyncResult<CatalogObject> {
        let write = self.prepare_update(id, data)?;
        self.submit(&write)
    }

    /// Sends a prepared write. Safe to call again with the same write.
    ///
    /// ## Response Checks
    /// - The returned object has the submitted type and carries a version
    /// - Create: the returned id is permanent
    /// - Update: the id is unchanged and the version advanced
    pub fn submit(&self, write: &PreparedWrite) -> SyncResult<CatalogObject> {
        let context = write.context();
        let submitted = &write.object;

        debug!(
            operation = %context.operation,
            object_type = %submitted.object_type(),
            id = %submitted.id,
            version = ?submitted.version,
            idempotency_key = %write.idempotency_key,
            "Submitting upsert"
        );

        let request = UpsertObjectRequest {
            idempotency_key: write.idempotency_key.clone(),
            object: submitted.clone(),
        };
        let response = self
            .api
            .upsert(&request)
            .map_err(|e| transport_failure(context.clone(), submitted.version, e))?;

        let saved = response.catalog_object;
        let context = match write.kind {
            WriteKind::Create => context.with_id(saved.id.clone()),
            WriteKind::Update => context,
        };

        if saved.object_type() != submitted.object_type() {
            return Err(SyncError::decode(
                context,
                DecodeError::TypeMismatch {
                    expected: submitted.object_type(),
                    actual: saved.object_type(),
                },
            ));
        }
        let Some(version) = saved.version else {
            return Err(unexpected(context, "response carries no version"));
        };

        match write.kind {
            WriteKind::Create => {
                if is_temporary_id(&saved.id) {
                    return Err(unexpected(context, "store returned a temporary id"));
                }
                info!(
                    object_type = %saved.object_type(),
                    id = %saved.id,
                    version,
                    "Created catalog object"
                );
            }
            WriteKind::Update => {
                if saved.id != submitted.id {
                    return Err(unexpected(
                        context,
                        format!("store returned id '{}'", saved.id),
                    ));
                }
                if submitted.version.is_some_and(|previous| version <= previous) {
                    return Err(unexpected(
                        context,
                        format!(
                            "version did not advance past {:?} (got {})",
                            submitted.version, version
                        ),
                    ));
                }
                info!(
                    object_type = %saved.object_type(),
                    id = %saved.id,
                    version,
                    "Updated catalog object"
                );
            }
        }

        Ok(saved)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Deletes `id`. The store may remove dependents along with it.
    ///
    /// The object is retrieved first so that an id of another kind is never
    /// deleted through this `object_type`.
    ///
    /// ## Errors
    /// - `NotFound` if the id is unknown or already deleted
    /// - `Decode` if the store holds a different kind under this id
    /// - `UnexpectedResponse` if the store reports nothing deleted
    pub fn delete(&self, object_type: ObjectType, id: &str) -> SyncResult<Deletion> {
        let context = Context::new(Operation::Delete, object_type).with_id(id);
        self.fetch(context.clone(), object_type, id)?;
        debug!(object_type = %object_type, id = %id, "Deleting catalog object");

        let response = self
            .api
            .delete(id)
            .map_err(|e| transport_failure(context.clone(), None, e))?;

        let Some(first) = response.deleted_object_ids.first().cloned() else {
            return Err(unexpected(context, "store reported no deleted ids"));
        };
        if first != id {
            warn!(requested = %id, reported = %first, "Store reported a different id deleted first");
        }

        info!(
            object_type = %object_type,
            id = %first,
            deleted = response.deleted_object_ids.len(),
            "Deleted catalog object"
        );

        Ok(Deletion {
            id: first,
            deleted_ids: response.deleted_object_ids,
            deleted_at: response.deleted_at,
        })
    }

    // =========================================================================
    // Batch Upsert
    // =========================================================================

    /// Checks batch limits and fixes an idempotency key for the batch.
    ///
    /// Objects may reference each other's temporary ids.
    pub fn prepare_batch(&self, batches: Vec<Vec<CatalogObject>>) -> SyncResult<PreparedBatch> {
        let per_batch = self.config.max_objects_per_batch();
        let total_limit = self.config.max_total_objects();

        if batches.is_empty() || batches.iter().any(Vec::is_empty) {
            return Err(SyncError::EmptyBatch);
        }
        if let Some(batch) = batches.iter().find(|b| b.len() > per_batch) {
            return Err(SyncError::BatchTooLarge {
                count: batch.len(),
                limit: per_batch,
                scope: "per-batch",
            });
        }
        let total: usize = batches.iter().map(Vec::len).sum();
        if total > total_limit {
            return Err(SyncError::BatchTooLarge {
                count: total,
                limit: total_limit,
                scope: "total",
            });
        }

        Ok(PreparedBatch {
            request: BatchUpsertRequest {
                idempotency_key: new_idempotency_key(),
                batches: batches
                    .into_iter()
                    .map(|objects| ObjectBatch { objects })
                    .collect(),
            },
        })
    }

    /// Upserts all objects atomically in one request.
    pub fn batch_upsert(&self, batches: Vec<Vec<CatalogObject>>) -> SyncResult<BatchOutcome> {
        let batch = self.prepare_batch(batches)?;
        self.submit_batch(&batch)
    }

    /// Sends a prepared batch. Safe to call again with the same batch.
    ///
    /// A failure applies to the whole batch; no per-object results exist.
    pub fn submit_batch(&self, batch: &PreparedBatch) -> SyncResult<BatchOutcome> {
        let context = Context::batch();
        let request = &batch.request;
        let submitted = request.object_count();

        debug!(
            objects = submitted,
            batches = request.batches.len(),
            idempotency_key = %request.idempotency_key,
            "Submitting batch upsert"
        );

        let response = self
            .api
            .batch_upsert(request)
            .map_err(|e| transport_failure(context.clone(), None, e))?;

        if response.objects.len() != submitted {
            return Err(unexpected(
                context,
                format!(
                    "submitted {} objects, store returned {}",
                    submitted,
                    response.objects.len()
                ),
            ));
        }
        for object in request.objects().filter(|o| is_temporary_id(&o.id)) {
            if permanent_id(&response.id_mappings, &object.id).is_none() {
                return Err(unexpected(
                    context,
                    format!("no id mapping for '{}'", object.id),
                ));
            }
        }
        if let Some(object) = response
            .objects
            .iter()
            .find(|o| o.version.is_none() || is_temporary_id(&o.id))
        {
            return Err(unexpected(
                context,
                format!("object '{}' was not committed", object.id),
            ));
        }

        info!(
            objects = response.objects.len(),
            created = response.id_mappings.len(),
            "Batch upsert committed"
        );

        Ok(BatchOutcome {
            objects: response.objects,
            id_mappings: response.id_mappings,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn transport_failure(context: Context, version: Option<i64>, err: TransportError) -> SyncError {
    let err = SyncError::from_transport(context, version, err);
    match &err {
        SyncError::Conflict { .. } => warn!(error = %err, "Version conflict"),
        SyncError::NotFound { .. } => warn!(error = %err, "Catalog object not found"),
        _ => warn!(error = %err, "Catalog store request failed"),
    }
    err
}

fn unexpected(context: Context, reason: impl Into<String>) -> SyncError {
    let err = SyncError::unexpected(context, reason);
    warn!(error = %err, "Unexpected catalog store response");
    err
}

// =============================================================================
// Unit Tests
// =============================================================================
