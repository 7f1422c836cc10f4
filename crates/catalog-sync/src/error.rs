//! # Sync Error Types
//!
//! Error types for catalog store operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Local          │  │   Remote        │  │     Response            │ │
//! │  │  (no request)   │  │                 │  │                         │ │
//! │  │  Validation     │  │  Transport      │  │  Decode                 │ │
//! │  │  BatchTooLarge  │  │  NotFound       │  │  UnexpectedResponse     │ │
//! │  │  EmptyBatch     │  │  Conflict       │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │  Configuration  │   Every protocol variant names the operation,    │
//! │  │  InvalidConfig  │   the object type and the id when known.         │
//! │  │  ConfigLoad/Save│                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this crate retries. `is_retryable()` only tells the caller
//! whether resubmitting the same prepared write is worth trying.

use catalog_core::{DecodeError, ObjectType, ValidationError};
use std::fmt;
use thiserror::Error;

use crate::protocol::ErrorResponse;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Result type alias for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

// =============================================================================
// Operation Context
// =============================================================================

/// The store operation an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Retrieve,
    Update,
    Delete,
    BatchUpsert,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Retrieve => write!(f, "retrieve"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::BatchUpsert => write!(f, "batch upsert"),
        }
    }
}

/// What was being done when an error occurred.
///
/// Displays as `update ITEM 'ITEM_456'`; parts that are unknown are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub operation: Operation,
    pub object_type: Option<ObjectType>,
    pub id: Option<String>,
}

impl Context {
    pub fn new(operation: Operation, object_type: ObjectType) -> Self {
        Context {
            operation,
            object_type: Some(object_type),
            id: None,
        }
    }

    /// Context for a batch, which may span several object types.
    pub fn batch() -> Self {
        Context {
            operation: Operation::BatchUpsert,
            object_type: None,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        if let Some(object_type) = self.object_type {
            write!(f, " {}", object_type)?;
        }
        if let Some(id) = &self.id {
            write!(f, " '{}'", id)?;
        }
        Ok(())
    }
}

// =============================================================================
// Transport Error
// =============================================================================

/// Failure reported by a [`CatalogApi`](crate::transport::CatalogApi)
/// implementation.
///
/// Transports map HTTP outcomes onto these variants. A transport that cannot
/// tell a conflict apart may report a plain `Http` error; `is_conflict()`
/// still recognises status 409 and the `VERSION_MISMATCH` code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The store has no object with the requested id.
    #[error("Object not found")]
    NotFound,

    /// The store rejected a write because its version is stale.
    #[error("Version conflict: {0}")]
    Conflict(String),

    /// Any other non-success response.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// A body could not be encoded or parsed.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl TransportError {
    /// Classifies a non-2xx response body returned by the store.
    ///
    /// ## Classification
    /// - 404 or a `NOT_FOUND` code → `NotFound`
    /// - 409 or a `VERSION_MISMATCH` / `CONFLICT` code → `Conflict`
    /// - anything else → `Http`
    pub fn from_response(status: u16, body: &ErrorResponse) -> Self {
        let message = if body.errors.is_empty() {
            format!("status {}", status)
        } else {
            body.errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        };

        let has_code = |code: &str| body.errors.iter().any(|e| e.code == code);

        if status == 404 || has_code("NOT_FOUND") {
            TransportError::NotFound
        } else if status == 409 || has_code("VERSION_MISMATCH") || has_code("CONFLICT") {
            TransportError::Conflict(message)
        } else {
            TransportError::Http { status, message }
        }
    }

    /// Returns true if this failure is a version conflict.
    pub fn is_conflict(&self) -> bool {
        match self {
            TransportError::Conflict(_) => true,
            TransportError::Http { status, message } => {
                *status == 409 || message.contains("VERSION_MISMATCH")
            }
            _ => false,
        }
    }

    /// Returns true if the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TransportError::NotFound | TransportError::Http { status: 404, .. }
        )
    }

    /// Returns true if resending the same request may succeed.
    ///
    /// ## Retryable Errors
    /// - Network failures (outcome unknown)
    /// - 429 and 5xx responses
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) => true,
            TransportError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Serialization(err.to_string())
    }
}

// =============================================================================
// Sync Error
// =============================================================================

/// Error type for every catalog store and reconciler operation.
///
/// ## Design Principles
/// - Each protocol variant carries a [`Context`] naming the operation
/// - Local failures (`Validation`, `BatchTooLarge`) mean no request was sent
/// - Nothing is swallowed; store failures surface unchanged in meaning
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// Network or HTTP failure not covered by a more specific variant.
    #[error("{context} failed: {source}")]
    Transport {
        context: Context,
        #[source]
        source: TransportError,
    },

    /// The object does not exist or has been deleted.
    #[error("{context} failed: object not found")]
    NotFound { context: Context },

    /// The store rejected the write's version.
    #[error("{context} failed: version conflict at version {version:?}: {message}")]
    Conflict {
        context: Context,
        version: Option<i64>,
        message: String,
    },

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// A field constraint failed before any request was sent.
    #[error("{context} rejected: {source}")]
    Validation {
        context: Context,
        #[source]
        source: ValidationError,
    },

    /// A batch exceeds a configured size limit.
    #[error("Batch of {count} objects exceeds the {scope} limit of {limit}")]
    BatchTooLarge {
        count: usize,
        limit: usize,
        scope: &'static str,
    },

    /// A batch upsert was requested with no objects.
    #[error("Batch upsert requires at least one object")]
    EmptyBatch,

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// The response envelope does not match the expected variant shape.
    #[error("{context} failed: cannot decode response: {source}")]
    Decode {
        context: Context,
        #[source]
        source: DecodeError,
    },

    /// The store answered successfully but the answer breaks the protocol.
    #[error("{context} failed: unexpected response: {reason}")]
    UnexpectedResponse { context: Context, reason: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid catalog configuration.
    #[error("Invalid catalog configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl SyncError {
    /// Maps a transport failure onto the caller-facing taxonomy.
    pub fn from_transport(context: Context, version: Option<i64>, err: TransportError) -> Self {
        if err.is_not_found() {
            return SyncError::NotFound { context };
        }
        if err.is_conflict() {
            let message = match err {
                TransportError::Conflict(message) => message,
                other => other.to_string(),
            };
            return SyncError::Conflict {
                context,
                version,
                message,
            };
        }
        SyncError::Transport {
            context,
            source: err,
        }
    }

    pub fn validation(context: Context, source: ValidationError) -> Self {
        SyncError::Validation { context, source }
    }

    pub fn decode(context: Context, source: DecodeError) -> Self {
        SyncError::Decode { context, source }
    }

    pub fn unexpected(context: Context, reason: impl Into<String>) -> Self {
        SyncError::UnexpectedResponse {
            context,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns the operation context, if this is a protocol error.
    pub fn context(&self) -> Option<&Context> {
        match self {
            SyncError::Transport { context, .. }
            | SyncError::NotFound { context }
            | SyncError::Conflict { context, .. }
            | SyncError::Validation { context, .. }
            | SyncError::Decode { context, .. }
            | SyncError::UnexpectedResponse { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Returns true if resubmitting the same prepared write may succeed.
    ///
    /// Conflicts are not retryable as-is: the caller must retrieve the new
    /// version and decide what to write.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transport { source, .. } if source.is_retryable())
    }

    /// Returns true if the store rejected a stale version.
    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncError::Conflict { .. })
    }

    /// Returns true if the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound { .. })
    }

    /// Returns true if the failure happened before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SyncError::Validation { .. } | SyncError::BatchTooLarge { .. } | SyncError::EmptyBatch
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ApiError;

    fn update_item() -> Context {
        Context::new(Operation::Update, ObjectType::Item).with_id("ITEM_456")
    }

    #[test]
    fn test_context_display() {
        assert_eq!(update_item().to_string(), "update ITEM 'ITEM_456'");
        assert_eq!(
            Context::new(Operation::Create, ObjectType::ItemVariation).to_string(),
            "create ITEM_VARIATION"
        );
        assert_eq!(Context::batch().to_string(), "batch upsert");
    }

    #[test]
    fn test_transport_classification() {
        let conflict = ErrorResponse {
            errors: vec![ApiError::new(
                "INVALID_REQUEST_ERROR",
                "VERSION_MISMATCH",
                "stale version",
            )],
        };
        assert!(matches!(
            TransportError::from_response(400, &conflict),
            TransportError::Conflict(_)
        ));
        assert_eq!(
            TransportError::from_response(404, &ErrorResponse::default()),
            TransportError::NotFound
        );
        assert_eq!(
            TransportError::from_response(500, &ErrorResponse::default()),
            TransportError::Http {
                status: 500,
                message: "status 500".into()
            }
        );
    }

    #[test]
    fn test_http_conflict_is_detected() {
        let err = TransportError::Http {
            status: 409,
            message: "conflict".into(),
        };
        assert!(err.is_conflict());

        let mapped = SyncError::from_transport(update_item(), Some(3), err);
        assert!(mapped.is_conflict());
        assert!(mapped.to_string().contains("update ITEM 'ITEM_456'"));
    }

    #[test]
    fn test_not_found_mapping() {
        let mapped = SyncError::from_transport(update_item(), None, TransportError::NotFound);
        assert!(mapped.is_not_found());
        assert_eq!(mapped.context(), Some(&update_item()));
    }

    #[test]
    fn test_retryable_errors() {
        let network = SyncError::from_transport(
            update_item(),
            None,
            TransportError::Network("timed out".into()),
        );
        assert!(network.is_retryable());

        let unavailable = SyncError::from_transport(
            update_item(),
            None,
            TransportError::Http {
                status: 503,
                message: "unavailable".into(),
            },
        );
        assert!(unavailable.is_retryable());

        let bad_request = SyncError::from_transport(
            update_item(),
            None,
            TransportError::Http {
                status: 400,
                message: "bad".into(),
            },
        );
        assert!(!bad_request.is_retryable());

        let conflict = SyncError::from_transport(
            update_item(),
            Some(1),
            TransportError::Conflict("stale".into()),
        );
        assert!(!conflict.is_retryable());
        assert!(!SyncError::EmptyBatch.is_retryable());
    }

    #[test]
    fn test_local_errors() {
        let err = SyncError::validation(
            Context::new(Operation::Create, ObjectType::Category),
            ValidationError::required("name"),
        );
        assert!(err.is_local());
        assert!(err.to_string().starts_with("create CATEGORY rejected"));
        assert!(SyncError::BatchTooLarge {
            count: 1001,
            limit: 1000,
            scope: "per-batch"
        }
        .is_local());
        assert!(SyncError::InvalidConfig("bad".into()).is_config_error());
    }
}
