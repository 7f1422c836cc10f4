//! # Catalog Store Protocol
//!
//! Request and response bodies exchanged with the remote catalog store.
//!
//! ## Message Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Store Operations                           │
//! │                                                                         │
//! │  RETRIEVE  GET    /catalog/object/{id}                                 │
//! │            ◄── { object }                         404 on unknown id    │
//! │                                                                         │
//! │  UPSERT    POST   /catalog/object                                      │
//! │            ──► { idempotency_key, object }                             │
//! │            ◄── { catalog_object, id_mappings }                         │
//! │                                                                         │
//! │  BATCH     POST   /catalog/batch-upsert                                │
//! │            ──► { idempotency_key, batches: [{ objects }] }             │
//! │            ◄── { objects, id_mappings }           all or nothing       │
//! │                                                                         │
//! │  DELETE    DELETE /catalog/object/{id}                                 │
//! │            ◄── { deleted_object_ids, deleted_at }                      │
//! │                                                                         │
//! │  ERRORS    any non-2xx                                                 │
//! │            ◄── { errors: [{ category, code, detail, field }] }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All bodies are JSON with snake_case field names.

use catalog_core::CatalogObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Shared Types
// =============================================================================

/// Maps a client-supplied temporary id to the permanent id the store assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMapping {
    pub client_object_id: String,
    pub object_id: String,
}

/// Looks up the permanent id assigned to `temporary_id`.
pub fn permanent_id<'a>(mappings: &'a [IdMapping], temporary_id: &str) -> Option<&'a str> {
    mappings
        .iter()
        .find(|m| m.client_object_id == temporary_id)
        .map(|m| m.object_id.as_str())
}

// =============================================================================
// Retrieve
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveObjectResponse {
    pub object: CatalogObject,
}

// =============================================================================
// Upsert
// =============================================================================

/// Create-or-update of a single object.
///
/// A temporary `object.id` creates; a permanent id updates, and then
/// `object.version` must equal the store's current version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertObjectRequest {
    pub idempotency_key: String,
    pub object: CatalogObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertObjectResponse {
    #[serde(alias = "object")]
    pub catalog_object: CatalogObject,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub id_mappings: Vec<IdMapping>,
}

// =============================================================================
// Batch Upsert
// =============================================================================

/// One group of objects inside a batch upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectBatch {
    pub objects: Vec<CatalogObject>,
}

/// Atomic upsert of several object groups under a single idempotency key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchUpsertRequest {
    pub idempotency_key: String,
    pub batches: Vec<ObjectBatch>,
}

impl BatchUpsertRequest {
    /// Total number of objects across all batches.
    pub fn object_count(&self) -> usize {
        self.batches.iter().map(|b| b.objects.len()).sum()
    }

    /// Iterates over every object in submission order.
    pub fn objects(&self) -> impl Iterator<Item = &CatalogObject> {
        self.batches.iter().flat_map(|b| b.objects.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchUpsertResponse {
    #[serde(default)]
    pub objects: Vec<CatalogObject>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub id_mappings: Vec<IdMapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Delete
// =============================================================================

/// Ids actually removed. Deleting an item also removes its variations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteObjectResponse {
    #[serde(default)]
    pub deleted_object_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Errors
// =============================================================================

/// Body of a non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

/// A single error entry reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub category: String,
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(category: &str, code: &str, detail: impl Into<String>) -> Self {
        ApiError {
            category: category.to_string(),
            code: code.to_string(),
            detail: Some(detail.into()),
            field: None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.code, detail),
            None => write!(f, "{}", self.code),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::object::CategoryData;
    use catalog_core::ObjectData;

    fn category(id: &str) -> CatalogObject {
        CatalogObject::new(
            id,
            None,
            ObjectData::Category(CategoryData {
                name: Some("Beverages".into()),
            }),
        )
    }

    #[test]
    fn test_upsert_request_wire_shape() {
        let request = UpsertObjectRequest {
            idempotency_key: "key-1".into(),
            object: category("#beverages"),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["idempotency_key"], "key-1");
        assert_eq!(json["object"]["type"], "CATEGORY");
        assert_eq!(json["object"]["id"], "#beverages");
        assert!(json["object"].get("version").is_none());
    }

    #[test]
    fn test_upsert_response_accepts_either_field_name() {
        let body = r##"{
            "catalog_object": {"type": "CATEGORY", "id": "CAT_123", "version": 1,
                               "category_data": {"name": "Beverages"}},
            "id_mappings": [{"client_object_id": "#beverages", "object_id": "CAT_123"}]
        }"##;
        let response: UpsertObjectResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.catalog_object.id, "CAT_123");
        assert_eq!(
            permanent_id(&response.id_mappings, "#beverages"),
            Some("CAT_123")
        );

        let short = r#"{"object": {"type": "CATEGORY", "id": "CAT_123", "version": 1,
                                   "category_data": {"name": "Beverages"}}}"#;
        let response: UpsertObjectResponse = serde_json::from_str(short).unwrap();
        assert_eq!(response.catalog_object.version, Some(1));
        assert!(response.id_mappings.is_empty());
    }

    #[test]
    fn test_batch_request_counts_objects() {
        let request = BatchUpsertRequest {
            idempotency_key: "key-2".into(),
            batches: vec![
                ObjectBatch {
                    objects: vec![category("#a"), category("#b")],
                },
                ObjectBatch {
                    objects: vec![category("#c")],
                },
            ],
        };
        assert_eq!(request.object_count(), 3);
        let ids: Vec<&str> = request.objects().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["#a", "#b", "#c"]);
    }

    #[test]
    fn test_delete_response_defaults_to_empty() {
        let response: DeleteObjectResponse = serde_json::from_str("{}").unwrap();
        assert!(response.deleted_object_ids.is_empty());
        assert!(response.deleted_at.is_none());
    }

    #[test]
    fn test_error_response_parsing() {
        let body = r#"{"errors": [{"category": "INVALID_REQUEST_ERROR",
                                   "code": "VERSION_MISMATCH",
                                   "detail": "Object version does not match latest database version."}]}"#;
        let response: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].code, "VERSION_MISMATCH");
        assert!(response.errors[0].to_string().starts_with("VERSION_MISMATCH: "));
    }
}
