//! Properties of the versioned upsert protocol.

use std::sync::Arc;

use catalog_core::{Category, Item, ObjectType, Tax};
use catalog_sync::protocol::{
    BatchUpsertRequest, BatchUpsertResponse, DeleteObjectResponse, RetrieveObjectResponse,
    UpsertObjectRequest, UpsertObjectResponse,
};
use catalog_sync::{
    CatalogApi, CatalogConfig, CategoryReconciler, InMemoryCatalog, ItemReconciler, Operation,
    SyncError, TaxReconciler, TransportError, TransportResult,
};
use proptest::prelude::*;

fn config() -> Arc<CatalogConfig> {
    Arc::new(CatalogConfig::default())
}

// =============================================================================
// Misbehaving stores
// =============================================================================

/// Delegates to an in-memory catalog but reports deletes as removing nothing.
struct EmptyDeleteStore(InMemoryCatalog);

impl CatalogApi for EmptyDeleteStore {
    fn retrieve(&self, object_id: &str) -> TransportResult<RetrieveObjectResponse> {
        self.0.retrieve(object_id)
    }

    fn upsert(&self, request: &UpsertObjectRequest) -> TransportResult<UpsertObjectResponse> {
        self.0.upsert(request)
    }

    fn batch_upsert(&self, request: &BatchUpsertRequest) -> TransportResult<BatchUpsertResponse> {
        self.0.batch_upsert(request)
    }

    fn delete(&self, _object_id: &str) -> TransportResult<DeleteObjectResponse> {
        Ok(DeleteObjectResponse {
            deleted_object_ids: vec![],
            deleted_at: None,
        })
    }
}

/// Accepts updates but echoes the submitted version back unchanged.
struct FrozenVersionStore(InMemoryCatalog);

impl CatalogApi for FrozenVersionStore {
    fn retrieve(&self, object_id: &str) -> TransportResult<RetrieveObjectResponse> {
        self.0.retrieve(object_id)
    }

    fn upsert(&self, request: &UpsertObjectRequest) -> TransportResult<UpsertObjectResponse> {
        let mut response = self.0.upsert(request)?;
        if request.object.version.is_some() {
            response.catalog_object.version = request.object.version;
        }
        Ok(response)
    }

    fn batch_upsert(&self, request: &BatchUpsertRequest) -> TransportResult<BatchUpsertResponse> {
        self.0.batch_upsert(request)
    }

    fn delete(&self, object_id: &str) -> TransportResult<DeleteObjectResponse> {
        self.0.delete(object_id)
    }
}

/// Lets another writer bump the object between the caller's retrieve and its
/// versioned write.
struct RacingWriterStore(Arc<InMemoryCatalog>);

impl CatalogApi for RacingWriterStore {
    fn retrieve(&self, object_id: &str) -> TransportResult<RetrieveObjectResponse> {
        self.0.retrieve(object_id)
    }

    fn upsert(&self, request: &UpsertObjectRequest) -> TransportResult<UpsertObjectResponse> {
        if request.object.version.is_some() {
            self.0.touch(&request.object.id);
        }
        self.0.upsert(request)
    }

    fn batch_upsert(&self, request: &BatchUpsertRequest) -> TransportResult<BatchUpsertResponse> {
        self.0.batch_upsert(request)
    }

    fn delete(&self, object_id: &str) -> TransportResult<DeleteObjectResponse> {
        self.0.delete(object_id)
    }
}

// =============================================================================
// Versioning
// =============================================================================

#[test]
fn test_versions_increase_by_one_per_update() {
    let api = Arc::new(InMemoryCatalog::new());
    let categories = CategoryReconciler::new(api.clone(), config());

    let created = categories.create(&Category::new("Beverages")).unwrap();
    let first = categories
        .update(&created.id, &Category::new("Drinks"))
        .unwrap();
    let second = categories
        .update(&created.id, &Category::new("Cold Drinks"))
        .unwrap();

    assert_eq!(created.version, 1);
    assert_eq!(first.version, 2);
    assert_eq!(second.version, 3);
}

#[test]
fn test_update_writes_against_latest_remote_version() {
    let api = Arc::new(InMemoryCatalog::new());
    let categories = CategoryReconciler::new(api.clone(), config());

    let stale = categories.create(&Category::new("Beverages")).unwrap();
    // Another writer moves the object on twice
    api.touch(&stale.id);
    api.touch(&stale.id);

    let updated = categories
        .update(&stale.id, &Category::new("Drinks"))
        .unwrap();
    assert_eq!(updated.version, 4);

    let submitted = api.upsert_requests().pop().unwrap();
    assert_eq!(submitted.object.version, Some(3));
    assert_ne!(submitted.object.version, Some(stale.version));
}

#[test]
fn test_concurrent_writer_between_retrieve_and_write_is_conflict() {
    let api = Arc::new(InMemoryCatalog::new());
    let categories = CategoryReconciler::new(api.clone(), config());
    let saved = categories.create(&Category::new("Beverages")).unwrap();

    let write = categories
        .prepare_update(&saved.id, &Category::new("Drinks"))
        .unwrap();
    api.touch(&saved.id);

    let err = categories.submit(&write).unwrap_err();
    assert!(err.is_conflict());
    assert!(!err.is_retryable());
    match err {
        SyncError::Conflict { version, .. } => assert_eq!(version, Some(1)),
        other => panic!("expected conflict, got {:?}", other),
    }

    // A fresh update picks up the new version
    assert_eq!(
        categories
            .update(&saved.id, &Category::new("Drinks"))
            .unwrap()
            .version,
        3
    );
}

#[test]
fn test_update_loses_race_with_concurrent_writer() {
    let api = Arc::new(InMemoryCatalog::new());
    let saved = CategoryReconciler::new(api.clone(), config())
        .create(&Category::new("Beverages"))
        .unwrap();

    let racing = RacingWriterStore(api.clone());
    let categories = CategoryReconciler::new(&racing, config());
    let err = categories
        .update(&saved.id, &Category::new("Drinks"))
        .unwrap_err();

    match err {
        SyncError::Conflict {
            context, version, ..
        } => {
            assert_eq!(context.operation, Operation::Update);
            assert_eq!(context.object_type, Some(ObjectType::Category));
            assert_eq!(context.id.as_deref(), Some(saved.id.as_str()));
            assert_eq!(version, Some(1));
        }
        other => panic!("expected conflict, got {:?}", other),
    }
    // Only the other writer's change landed
    let current = api.object(&saved.id).unwrap();
    assert_eq!(current.version, Some(2));
}

#[test]
fn test_reconcile_reports_conflict_from_concurrent_writer() {
    let api = Arc::new(InMemoryCatalog::new());
    let saved = TaxReconciler::new(api.clone(), config())
        .create(&Tax::new("Sales tax", "8.25".parse().unwrap()))
        .unwrap();

    let racing = RacingWriterStore(api.clone());
    let taxes = TaxReconciler::new(&racing, config());

    // Matching state never writes, so there is nothing to race
    let unchanged = taxes
        .reconcile(&saved.id, &Tax::new("Sales tax", "8.25".parse().unwrap()))
        .unwrap();
    assert!(!unchanged.was_updated());

    let err = taxes
        .reconcile(&saved.id, &Tax::new("Sales tax", "9.5".parse().unwrap()))
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(!err.is_retryable());
    let context = err.context().unwrap();
    assert_eq!(context.operation, Operation::Update);
    assert_eq!(context.object_type, Some(ObjectType::Tax));
}

#[test]
fn test_update_response_must_advance_version() {
    let store = FrozenVersionStore(InMemoryCatalog::new());
    let categories = CategoryReconciler::new(&store, config());
    let saved = categories.create(&Category::new("Beverages")).unwrap();

    let err = categories
        .update(&saved.id, &Category::new("Drinks"))
        .unwrap_err();
    assert!(matches!(err, SyncError::UnexpectedResponse { .. }));
}

// =============================================================================
// Idempotency
// =============================================================================

#[test]
fn test_distinct_writes_use_distinct_keys() {
    let api = Arc::new(InMemoryCatalog::new());
    let categories = CategoryReconciler::new(api.clone(), config());

    let a = categories.create(&Category::new("Beverages")).unwrap();
    categories.create(&Category::new("Beverages")).unwrap();
    categories.update(&a.id, &Category::new("Drinks")).unwrap();

    let keys = api.idempotency_keys();
    assert_eq!(keys.len(), 3);
    let unique: std::collections::HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), 3);
}

#[test]
fn test_resubmitting_after_lost_response_applies_once() {
    let api = Arc::new(InMemoryCatalog::new());
    let categories = CategoryReconciler::new(api.clone(), config());

    let write = categories.prepare_create(&Category::new("Beverages")).unwrap();
    api.lose_next_response();

    let err = categories.submit(&write).unwrap_err();
    assert!(err.is_retryable());

    let saved = categories.submit(&write).unwrap();
    assert_eq!(saved.version, 1);
    assert_eq!(api.len(), 1);

    let keys = api.idempotency_keys();
    assert_eq!(keys, vec![write.idempotency_key(); 2]);
}

#[test]
fn test_transport_failure_is_not_retried_internally() {
    let api = Arc::new(InMemoryCatalog::new());
    let taxes = TaxReconciler::new(api.clone(), config());
    api.fail_next(TransportError::Http {
        status: 503,
        message: "unavailable".into(),
    });

    let err = taxes
        .create(&Tax::new("Sales tax", "8.25".parse().unwrap()))
        .unwrap_err();
    assert!(matches!(err, SyncError::Transport { .. }));
    assert!(err.to_string().contains("create TAX"));
    assert!(api.is_empty());
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_empty_delete_result_is_an_error() {
    let store = EmptyDeleteStore(InMemoryCatalog::new());
    let categories = CategoryReconciler::new(&store, config());
    let saved = categories.create(&Category::new("Beverages")).unwrap();

    let err = categories.delete(&saved.id).unwrap_err();
    match err {
        SyncError::UnexpectedResponse { context, .. } => {
            assert_eq!(context.object_type, Some(ObjectType::Category));
            assert_eq!(context.id.as_deref(), Some(saved.id.as_str()));
        }
        other => panic!("expected unexpected-response error, got {:?}", other),
    }
}

#[test]
fn test_conflict_reported_as_http_409() {
    let api = Arc::new(InMemoryCatalog::new());
    let items = ItemReconciler::new(api.clone(), config());
    let saved = items.create(&Item::new("Latte")).unwrap();

    let write = items.prepare_update(&saved.id, &Item::new("Mocha")).unwrap();
    api.fail_next(TransportError::Http {
        status: 409,
        message: "conflict".into(),
    });

    let err = items.submit(&write).unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(api.object(&saved.id).unwrap().version, Some(1));
}

// =============================================================================
// Property: version monotonicity
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_each_update_advances_version_by_one(names in prop::collection::vec("[A-Za-z]{1,20}", 1..8)) {
        let api = Arc::new(InMemoryCatalog::new());
        let categories = CategoryReconciler::new(api.clone(), config());
        let created = categories.create(&Category::new("Start")).unwrap();

        let mut version = created.version;
        for name in names {
            let saved = categories.update(&created.id, &Category::new(name)).unwrap();
            prop_assert_eq!(saved.version, version + 1);
            version = saved.version;
        }
    }
}
