//! # In-Memory Catalog Store
//!
//! A complete implementation of the remote store's contract, held in memory.
//! Used as the test double for the protocol and for local tooling.
//!
//! ## Store Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store-Side Contract                                  │
//! │                                                                         │
//! │  UPSERT                                                                │
//! │  • temporary id (#…)    → new permanent id, version 1, id mapping      │
//! │  • permanent id         → request version must equal current version   │
//! │                           else VERSION_MISMATCH (Conflict)             │
//! │  • references to other objects must resolve (category, taxes, item)    │
//! │                                                                         │
//! │  IDEMPOTENCY                                                           │
//! │  • same key + same body → replay the first response, apply nothing     │
//! │  • same key + new body  → IDEMPOTENCY_KEY_REUSED                       │
//! │                                                                         │
//! │  BATCH                                                                 │
//! │  • temporary ids resolve across the whole request                      │
//! │  • any failure → nothing committed                                     │
//! │                                                                         │
//! │  DELETE                                                                │
//! │  • tombstones the object (is_deleted = true)                           │
//! │  • deleting an ITEM also deletes its ITEM_VARIATIONs                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Responses are remembered for replay under the most recent
//! [`DEFAULT_REPLAY_CAPACITY`] idempotency keys; older keys are forgotten and
//! a resubmission under one of them is treated as a new request.
//!
//! Fault injection (`fail_next`, `lose_next_response`) lets tests exercise
//! error paths and ambiguous failures where the write committed but the
//! response never arrived.

use catalog_core::ids::is_temporary_id;
use catalog_core::{CatalogObject, ObjectData, ObjectType};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use tracing::debug;
use uuid::Uuid;

use crate::error::{TransportError, TransportResult};
use crate::protocol::{
    permanent_id, BatchUpsertRequest, BatchUpsertResponse, DeleteObjectResponse, IdMapping,
    RetrieveObjectResponse, UpsertObjectRequest, UpsertObjectResponse,
};
use crate::transport::CatalogApi;

/// Idempotency keys remembered for replay unless configured otherwise.
pub const DEFAULT_REPLAY_CAPACITY: usize = 1024;

// =============================================================================
// Internal State
// =============================================================================

#[derive(Debug, Clone)]
enum Replay {
    Upsert {
        request: UpsertObjectRequest,
        response: UpsertObjectResponse,
    },
    Batch {
        request: BatchUpsertRequest,
        response: BatchUpsertResponse,
    },
}

#[derive(Debug, Default)]
struct State {
    /// Live objects and tombstones, by id.
    objects: BTreeMap<String, CatalogObject>,
    replays: HashMap<String, Replay>,
    /// Keys in `replays`, oldest first.
    replay_order: VecDeque<String>,
    replay_capacity: usize,
    upserts: Vec<UpsertObjectRequest>,
    batches: Vec<BatchUpsertRequest>,
    reserved_ids: VecDeque<String>,
    failures: VecDeque<TransportError>,
    lose_next_response: bool,
}

impl State {
    fn take_failure(&mut self) -> TransportResult<()> {
        match self.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn take_lost_response(&mut self) -> TransportResult<()> {
        if std::mem::take(&mut self.lose_next_response) {
            return Err(TransportError::Network(
                "connection reset after the request was sent".into(),
            ));
        }
        Ok(())
    }

    fn remember(&mut self, key: &str, replay: Replay) {
        if self.replay_capacity == 0 {
            return;
        }
        while self.replay_order.len() >= self.replay_capacity {
            if let Some(oldest) = self.replay_order.pop_front() {
                self.replays.remove(&oldest);
            }
        }
        self.replay_order.push_back(key.to_string());
        self.replays.insert(key.to_string(), replay);
    }

    /// Applies `objects` as one atomic unit.
    fn commit(
        &mut self,
        objects: &[CatalogObject],
        now: DateTime<Utc>,
    ) -> TransportResult<(Vec<CatalogObject>, Vec<IdMapping>)> {
        let mut mappings: Vec<IdMapping> = Vec::new();
        let mut seen = HashSet::new();
        // Reserved ids are only used up once the commit succeeds
        let mut reserved = self.reserved_ids.iter();
        let mut claimed = 0;
        for object in objects {
            if !seen.insert(object.id.as_str()) {
                return Err(invalid_value(format!(
                    "object '{}' appears twice in one request",
                    object.id
                )));
            }
            if is_temporary_id(&object.id) {
                let object_id = match reserved.next() {
                    Some(id) => {
                        claimed += 1;
                        id.clone()
                    }
                    None => Uuid::new_v4().simple().to_string().to_uppercase(),
                };
                mappings.push(IdMapping {
                    client_object_id: object.id.clone(),
                    object_id,
                });
            }
        }

        let mut working = self.objects.clone();
        let mut saved = Vec::with_capacity(objects.len());

        for object in objects {
            let created = is_temporary_id(&object.id);
            let mut object = object.clone();
            resolve_references(&mut object, &mappings)?;

            let version = match working.get(&object.id).filter(|o| !o.is_deleted) {
                _ if created => 1,
                Some(existing) => {
                    if existing.object_type() != object.object_type() {
                        return Err(invalid_value(format!(
                            "object '{}' is a {}, not a {}",
                            object.id,
                            existing.object_type(),
                            object.object_type()
                        )));
                    }
                    if object.version != existing.version {
                        return Err(TransportError::Conflict(format!(
                            "VERSION_MISMATCH: object '{}' is at version {:?}, request carried {:?}",
                            object.id, existing.version, object.version
                        )));
                    }
                    existing.version.unwrap_or(0) + 1
                }
                None => return Err(TransportError::NotFound),
            };

            object.version = Some(version);
            object.updated_at = Some(now);
            object.is_deleted = false;
            working.insert(object.id.clone(), object.clone());
            saved.push(object);
        }

        for object in &saved {
            check_references(&working, object)?;
        }

        self.objects = working;
        self.reserved_ids = self.reserved_ids.split_off(claimed);
        Ok((saved, mappings))
    }
}

fn invalid_value(detail: String) -> TransportError {
    TransportError::Http {
        status: 400,
        message: format!("INVALID_VALUE: {}", detail),
    }
}

fn resolve_id(id: &mut String, mappings: &[IdMapping]) -> TransportResult<()> {
    if is_temporary_id(id) {
        match permanent_id(mappings, id) {
            Some(permanent) => *id = permanent.to_string(),
            None => {
                return Err(invalid_value(format!(
                    "temporary id '{}' is not part of this request",
                    id
                )))
            }
        }
    }
    Ok(())
}

/// Rewrites the object's own id and every reference it holds.
fn resolve_references(object: &mut CatalogObject, mappings: &[IdMapping]) -> TransportResult<()> {
    resolve_id(&mut object.id, mappings)?;
    match &mut object.data {
        ObjectData::Item(data) => {
            if let Some(category_id) = data.category_id.as_mut() {
                resolve_id(category_id, mappings)?;
            }
            for tax_id in data.tax_ids.iter_mut().flatten() {
                resolve_id(tax_id, mappings)?;
            }
        }
        ObjectData::ItemVariation(data) => {
            if let Some(item_id) = data.item_id.as_mut() {
                resolve_id(item_id, mappings)?;
            }
        }
        ObjectData::Category(_) | ObjectData::Discount(_) | ObjectData::Tax(_) => {}
    }
    Ok(())
}

fn check_references(
    objects: &BTreeMap<String, CatalogObject>,
    object: &CatalogObject,
) -> TransportResult<()> {
    let exists = |id: &str, object_type: ObjectType| {
        objects
            .get(id)
            .is_some_and(|o| !o.is_deleted && o.object_type() == object_type)
    };
    let missing = |id: &str, object_type: ObjectType| {
        invalid_value(format!(
            "{} '{}' references unknown {} '{}'",
            object.object_type(),
            object.id,
            object_type,
            id
        ))
    };

    match &object.data {
        ObjectData::Item(data) => {
            if let Some(category_id) = &data.category_id {
                if !exists(category_id, ObjectType::Category) {
                    return Err(missing(category_id, ObjectType::Category));
                }
            }
            for tax_id in data.tax_ids.iter().flatten() {
                if !exists(tax_id, ObjectType::Tax) {
                    return Err(missing(tax_id, ObjectType::Tax));
                }
            }
        }
        ObjectData::ItemVariation(data) => {
            if let Some(item_id) = &data.item_id {
                if !exists(item_id, ObjectType::Item) {
                    return Err(missing(item_id, ObjectType::Item));
                }
            }
        }
        ObjectData::Category(_) | ObjectData::Discount(_) | ObjectData::Tax(_) => {}
    }
    Ok(())
}

// =============================================================================
// In-Memory Catalog
// =============================================================================

/// Thread-safe in-memory catalog store.
#[derive(Debug)]
pub struct InMemoryCatalog {
    state: Mutex<State>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::with_replay_capacity(DEFAULT_REPLAY_CAPACITY)
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that remembers the last `capacity` idempotency keys.
    pub fn with_replay_capacity(capacity: usize) -> Self {
        InMemoryCatalog {
            state: Mutex::new(State {
                replay_capacity: capacity,
                ..State::default()
            }),
        }
    }

    /// Queues permanent ids to hand out, in order, before random ones.
    pub fn reserve_ids<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .reserved_ids
            .extend(ids.into_iter().map(Into::into));
    }

    /// Makes the next call fail with `err` without touching any object.
    pub fn fail_next(&self, err: TransportError) {
        self.state.lock().failures.push_back(err);
    }

    /// Makes the next upsert or batch upsert commit, then report a network
    /// failure instead of its response.
    pub fn lose_next_response(&self) {
        self.state.lock().lose_next_response = true;
    }

    /// Simulates another writer saving `id`: bumps its version.
    ///
    /// Returns the new version, or `None` if the object is unknown or deleted.
    pub fn touch(&self, id: &str) -> Option<i64> {
        let mut state = self.state.lock();
        let object = state.objects.get_mut(id).filter(|o| !o.is_deleted)?;
        let version = object.version.unwrap_or(0) + 1;
        object.version = Some(version);
        object.updated_at = Some(Utc::now());
        Some(version)
    }

    /// Returns the stored envelope, including tombstones.
    pub fn object(&self, id: &str) -> Option<CatalogObject> {
        self.state.lock().objects.get(id).cloned()
    }

    /// Number of live (not deleted) objects.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .objects
            .values()
            .filter(|o| !o.is_deleted)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every single-object upsert received, in order, replays included.
    pub fn upsert_requests(&self) -> Vec<UpsertObjectRequest> {
        self.state.lock().upserts.clone()
    }

    /// Every batch upsert received, in order, replays included.
    pub fn batch_requests(&self) -> Vec<BatchUpsertRequest> {
        self.state.lock().batches.clone()
    }

    /// Idempotency keys of all upserts and batch upserts, in arrival order.
    pub fn idempotency_keys(&self) -> Vec<String> {
        let state = self.state.lock();
        state
            .upserts
            .iter()
            .map(|r| r.idempotency_key.clone())
            .chain(state.batches.iter().map(|r| r.idempotency_key.clone()))
            .collect()
    }
}

fn key_reused(key: &str) -> TransportError {
    TransportError::Http {
        status: 400,
        message: format!(
            "IDEMPOTENCY_KEY_REUSED: key '{}' was used for a different request",
            key
        ),
    }
}

impl CatalogApi for InMemoryCatalog {
    fn retrieve(&self, object_id: &str) -> TransportResult<RetrieveObjectResponse> {
        let mut state = self.state.lock();
        state.take_failure()?;

        let object = state
            .objects
            .get(object_id)
            .cloned()
            .ok_or(TransportError::NotFound)?;
        Ok(RetrieveObjectResponse { object })
    }

    fn upsert(&self, request: &UpsertObjectRequest) -> TransportResult<UpsertObjectResponse> {
        let mut state = self.state.lock();
        state.take_failure()?;
        state.upserts.push(request.clone());

        if let Some(replay) = state.replays.get(&request.idempotency_key) {
            return match replay {
                Replay::Upsert {
                    request: first,
                    response,
                } if first == request => {
                    debug!(idempotency_key = %request.idempotency_key, "Replaying upsert");
                    Ok(response.clone())
                }
                _ => Err(key_reused(&request.idempotency_key)),
            };
        }

        let (mut saved, id_mappings) =
            state.commit(std::slice::from_ref(&request.object), Utc::now())?;
        let response = UpsertObjectResponse {
            catalog_object: saved.remove(0),
            id_mappings,
        };
        state.remember(
            &request.idempotency_key,
            Replay::Upsert {
                request: request.clone(),
                response: response.clone(),
            },
        );

        state.take_lost_response()?;
        Ok(response)
    }

    fn batch_upsert(&self, request: &BatchUpsertRequest) -> TransportResult<BatchUpsertResponse> {
        let mut state = self.state.lock();
        state.take_failure()?;
        state.batches.push(request.clone());

        if let Some(replay) = state.replays.get(&request.idempotency_key) {
            return match replay {
                Replay::Batch {
                    request: first,
                    response,
                } if first == request => {
                    debug!(idempotency_key = %request.idempotency_key, "Replaying batch upsert");
                    Ok(response.clone())
                }
                _ => Err(key_reused(&request.idempotency_key)),
            };
        }

        let objects: Vec<CatalogObject> = request.objects().cloned().collect();
        if objects.is_empty() {
            return Err(invalid_value("batch contains no objects".into()));
        }

        let now = Utc::now();
        let (saved, id_mappings) = state.commit(&objects, now)?;
        let response = BatchUpsertResponse {
            objects: saved,
            id_mappings,
            updated_at: Some(now),
        };
        state.remember(
            &request.idempotency_key,
            Replay::Batch {
                request: request.clone(),
                response: response.clone(),
            },
        );

        state.take_lost_response()?;
        Ok(response)
    }

    fn delete(&self, object_id: &str) -> TransportResult<DeleteObjectResponse> {
        let mut state = self.state.lock();
        state.take_failure()?;

        let object_type = match state.objects.get(object_id) {
            Some(object) if !object.is_deleted => object.object_type(),
            _ => return Err(TransportError::NotFound),
        };

        let mut deleted = vec![object_id.to_string()];
        if object_type == ObjectType::Item {
            deleted.extend(
                state
                    .objects
                    .values()
                    .filter(|o| !o.is_deleted)
                    .filter(|o| match &o.data {
                        ObjectData::ItemVariation(data) => {
                            data.item_id.as_deref() == Some(object_id)
                        }
                        _ => false,
                    })
                    .map(|o| o.id.clone()),
            );
        }

        let now = Utc::now();
        for id in &deleted {
            if let Some(object) = state.objects.get_mut(id) {
                object.is_deleted = true;
                object.version = Some(object.version.unwrap_or(0) + 1);
                object.updated_at = Some(now);
            }
        }

        Ok(DeleteObjectResponse {
            deleted_object_ids: deleted,
            deleted_at: Some(now),
        })
    }
}
