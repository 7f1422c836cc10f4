//! # Entity Reconcilers
//!
//! Typed create / retrieve / update / delete for each catalog entity kind.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Reconciler Pipeline                                  │
//! │                                                                         │
//! │  Item { name: "Latte", … }                                             │
//! │       │                                                                 │
//! │       ▼  stamp default currency on money without one                   │
//! │       ▼  validate()          → SyncError::Validation (nothing sent)    │
//! │       ▼  to_data()           → ObjectData::Item(ItemData { … })        │
//! │       │                                                                 │
//! │       ▼  VersionedObjectStore::{create, update, …}                     │
//! │       │                                                                 │
//! │       ▼  decode::<Item>(response) → SyncError::Decode on bad shape     │
//! │                                                                         │
//! │  Saved { id: "ITEM_456", version: 1, entity: Item { … } }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One generic [`EntityReconciler`] serves all five kinds; the aliases
//! ([`ItemReconciler`], [`TaxReconciler`], …) name the common
//! instantiations.

use catalog_core::codec::decode;
use catalog_core::ids::new_temporary_id;
use catalog_core::{
    CatalogEntity, CatalogObject, Category, Discount, Item, ItemVariation, ObjectData, ObjectType,
    Tax,
};
use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::CatalogConfig;
use crate::error::{Context, Operation, SyncError, SyncResult};
use crate::store::{PreparedWrite, VersionedObjectStore};
use crate::transport::CatalogApi;

// =============================================================================
// Results
// =============================================================================

/// An entity as the store last saved it.
#[derive(Debug, Clone, PartialEq)]
pub struct Saved<E> {
    pub id: String,
    pub version: i64,
    pub updated_at: Option<DateTime<Utc>>,
    pub entity: E,
}

/// Outcome of [`EntityReconciler::reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled<E> {
    /// The remote state already matched; nothing was written.
    Unchanged(Saved<E>),
    /// An update was submitted.
    Updated(Saved<E>),
}

impl<E> Reconciled<E> {
    pub fn saved(&self) -> &Saved<E> {
        match self {
            Reconciled::Unchanged(saved) | Reconciled::Updated(saved) => saved,
        }
    }

    pub fn into_saved(self) -> Saved<E> {
        match self {
            Reconciled::Unchanged(saved) | Reconciled::Updated(saved) => saved,
        }
    }

    pub fn was_updated(&self) -> bool {
        matches!(self, Reconciled::Updated(_))
    }
}

/// An item and its variations created in one atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedItem {
    pub item: Saved<Item>,
    pub variations: Vec<Saved<ItemVariation>>,
}

// =============================================================================
// Entity Reconciler
// =============================================================================

/// Typed façade over a [`VersionedObjectStore`] for entity kind `E`.
pub struct EntityReconciler<E, A> {
    store: VersionedObjectStore<A>,
    _entity: PhantomData<fn() -> E>,
}

pub type CategoryReconciler<A> = EntityReconciler<Category, A>;
pub type ItemReconciler<A> = EntityReconciler<Item, A>;
pub type ItemVariationReconciler<A> = EntityReconciler<ItemVariation, A>;
pub type DiscountReconciler<A> = EntityReconciler<Discount, A>;
pub type TaxReconciler<A> = EntityReconciler<Tax, A>;

impl<E: CatalogEntity, A: CatalogApi> EntityReconciler<E, A> {
    pub fn new(api: A, config: Arc<CatalogConfig>) -> Self {
        Self::from_store(VersionedObjectStore::new(api, config))
    }

    pub fn from_store(store: VersionedObjectStore<A>) -> Self {
        EntityReconciler {
            store,
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &VersionedObjectStore<A> {
        &self.store
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates `entity` under a fresh temporary id.
    pub fn create(&self, entity: &E) -> SyncResult<Saved<E>> {
        let write = self.prepare_create(entity)?;
        self.submit(&write)
    }

    /// Validates and encodes `entity` for a create that can be resubmitted.
    pub fn prepare_create(&self, entity: &E) -> SyncResult<PreparedWrite> {
        let data = self.to_data(entity, Context::new(Operation::Create, E::OBJECT_TYPE))?;
        Ok(self.store.prepare_create(data))
    }

    // =========================================================================
    // Retrieve
    // =========================================================================

    pub fn retrieve(&self, id: &str) -> SyncResult<Saved<E>> {
        let object = self.store.retrieve(E::OBJECT_TYPE, id)?;
        saved(Operation::Retrieve, object)
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Replaces the remote entity `id` with `entity`.
    ///
    /// Always retrieves first and writes against the version just read.
    pub fn update(&self, id: &str, entity: &E) -> SyncResult<Saved<E>> {
        let write = self.prepare_update(id, entity)?;
        self.submit(&write)
    }

    /// Validates `entity`, retrieves `id` and prepares the update.
    pub fn prepare_update(&self, id: &str, entity: &E) -> SyncResult<PreparedWrite> {
        let context = Context::new(Operation::Update, E::OBJECT_TYPE).with_id(id);
        let data = self.to_data(entity, context)?;
        self.store.prepare_update(id, data)
    }

    /// Updates `id` only if the remote entity differs from `desired`.
    ///
    /// The comparison and the write use the same retrieved version.
    pub fn reconcile(&self, id: &str, desired: &E) -> SyncResult<Reconciled<E>> {
        let context = Context::new(Operation::Update, E::OBJECT_TYPE).with_id(id);
        let desired = self.prepared(desired, context)?;

        let current = self.store.retrieve(E::OBJECT_TYPE, id)?;
        let remote: Saved<E> = saved(Operation::Update, current.clone())?;
        if remote.entity == desired {
            debug!(object_type = %E::OBJECT_TYPE, id = %id, "Remote entity already up to date");
            return Ok(Reconciled::Unchanged(remote));
        }

        let write = self.store.prepare_update_from(&current, desired.to_data());
        self.submit(&write).map(Reconciled::Updated)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Deletes `id` and returns the id the store reported deleted.
    pub fn delete(&self, id: &str) -> SyncResult<String> {
        let deletion = self.store.delete(E::OBJECT_TYPE, id)?;
        if deletion.deleted_ids.len() > 1 {
            info!(
                id = %deletion.id,
                dependents = deletion.deleted_ids.len() - 1,
                "Dependent objects deleted"
            );
        }
        Ok(deletion.id)
    }

    // =========================================================================
    // Shared
    // =========================================================================

    /// Sends a prepared create or update and decodes the result.
    pub fn submit(&self, write: &PreparedWrite) -> SyncResult<Saved<E>> {
        let object = self.store.submit(write)?;
        saved(write.operation(), object)
    }

    /// Applies the default currency and validates.
    fn prepared(&self, entity: &E, context: Context) -> SyncResult<E> {
        let mut entity = entity.clone();
        entity.apply_default_currency(self.store.config().default_currency());
        entity
            .validate()
            .map_err(|e| SyncError::validation(context, e))?;
        Ok(entity)
    }

    fn to_data(&self, entity: &E, context: Context) -> SyncResult<ObjectData> {
        Ok(self.prepared(entity, context)?.to_data())
    }
}

/// Decodes a store response into a typed [`Saved`].
fn saved<E: CatalogEntity>(operation: Operation, object: CatalogObject) -> SyncResult<Saved<E>> {
    let context = Context::new(operation, E::OBJECT_TYPE).with_id(object.id.clone());
    let entity = decode::<E>(&object).map_err(|e| SyncError::decode(context.clone(), e))?;
    let version = object
        .version
        .ok_or_else(|| SyncError::unexpected(context, "object carries no version"))?;

    Ok(Saved {
        id: object.id,
        version,
        updated_at: object.updated_at,
        entity,
    })
}

// =============================================================================
// Items With Variations
// =============================================================================

impl<A: CatalogApi> EntityReconciler<Item, A> {
    /// Creates an item together with its variations in one atomic batch.
    ///
    /// Each variation's `item_id` is pointed at the new item; whatever the
    /// caller put there is ignored. Either everything is created or nothing.
    pub fn create_with_variations(
        &self,
        item: &Item,
        variations: &[ItemVariation],
    ) -> SyncResult<SavedItem> {
        let item_id = new_temporary_id();
        let item_data = self.to_data(item, Context::new(Operation::Create, ObjectType::Item))?;

        let currency = self.store.config().default_currency();
        let mut objects = vec![CatalogObject::new(item_id.clone(), None, item_data)];
        let mut variation_ids = Vec::with_capacity(variations.len());
        for variation in variations {
            let mut variation = variation.clone();
            variation.item_id = item_id.clone();
            variation.apply_default_currency(currency);
            variation.validate().map_err(|e| {
                SyncError::validation(
                    Context::new(Operation::Create, ObjectType::ItemVariation),
                    e,
                )
            })?;

            let variation_id = new_temporary_id();
            objects.push(CatalogObject::new(
                variation_id.clone(),
                None,
                variation.to_data(),
            ));
            variation_ids.push(variation_id);
        }

        let outcome = self.store.batch_upsert(vec![objects])?;
        let committed = |submitted_id: &str| {
            outcome.resolve(submitted_id).cloned().ok_or_else(|| {
                SyncError::unexpected(
                    Context::batch(),
                    format!("'{}' missing from batch response", submitted_id),
                )
            })
        };

        let item = saved::<Item>(Operation::BatchUpsert, committed(item_id.as_str())?)?;
        let variations = variation_ids
            .iter()
            .map(|id| saved::<ItemVariation>(Operation::BatchUpsert, committed(id.as_str())?))
            .collect::<SyncResult<Vec<_>>>()?;

        info!(
            id = %item.id,
            variations = variations.len(),
            "Created item with variations"
        );

        Ok(SavedItem { item, variations })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
