//! # Error Types
//!
//! Domain-specific error types for catalog-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  catalog-core errors (this file)                                       │
//! │  ├── CoreError        - Either of the two below                        │
//! │  ├── ValidationError  - Local field constraint violations              │
//! │  └── DecodeError      - Envelope does not match the expected variant   │
//! │                                                                         │
//! │  catalog-sync errors (separate crate)                                  │
//! │  └── SyncError        - Adds operation, object type and id context     │
//! │                                                                         │
//! │  Flow: ValidationError / DecodeError → SyncError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, object type, id)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::object::ObjectType;

// =============================================================================
// Core Error
// =============================================================================

/// Any failure produced by the pure catalog layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Decode error (wraps DecodeError).
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Local field constraint violations.
///
/// These are raised before any request leaves the process, so a request the
/// remote store would reject is never sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters, got {actual}")]
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., currency code, hex color, decimal string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A conditional field disagrees with the discriminator that governs it.
    ///
    /// ## When This Occurs
    /// - FIXED_PRICING variation without a price
    /// - VARIABLE_PRICING variation with a price
    /// - FIXED_AMOUNT discount with a percentage
    #[error("{field} is inconsistent with {discriminator}: {reason}")]
    Inconsistent {
        field: String,
        discriminator: String,
        reason: String,
    },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an Inconsistent error.
    pub fn inconsistent(
        field: impl Into<String>,
        discriminator: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ValidationError::Inconsistent {
            field: field.into(),
            discriminator: discriminator.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Decode Error
// =============================================================================

/// The wire envelope does not have the shape expected for its variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The envelope is a different kind of object than the caller asked for.
    #[error("expected a {expected} object, got {actual}")]
    TypeMismatch {
        expected: ObjectType,
        actual: ObjectType,
    },

    /// The payload matching the `type` discriminator is absent.
    #[error("{object_type} object has no {object_type} payload")]
    MissingPayload { object_type: ObjectType },

    /// A payload other than the one named by `type` is populated.
    #[error("{object_type} object carries an unexpected {populated} payload")]
    UnexpectedPayload {
        object_type: ObjectType,
        populated: ObjectType,
    },

    /// A field required by the variant is missing.
    #[error("{object_type} payload is missing required field {field}")]
    MissingField {
        object_type: ObjectType,
        field: String,
    },

    /// A field is present but its value cannot be interpreted.
    #[error("{object_type} payload has invalid {field}: {reason}")]
    InvalidField {
        object_type: ObjectType,
        field: String,
        reason: String,
    },

    /// The `type` discriminator names no known object type.
    #[error("unknown catalog object type: {0}")]
    UnknownType(String),
}

impl DecodeError {
    /// Creates a MissingField error.
    pub fn missing(object_type: ObjectType, field: impl Into<String>) -> Self {
        DecodeError::MissingField {
            object_type,
            field: field.into(),
        }
    }

    /// Creates an InvalidField error.
    pub fn invalid(
        object_type: ObjectType,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DecodeError::InvalidField {
            object_type,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

// =============================================================================
// Unit Tests
// =============================================================================
