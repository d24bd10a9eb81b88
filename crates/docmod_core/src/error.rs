//! Error types for docmod core.

use crate::operator::{Operator, ServerVersion};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building an update command.
///
/// Every variant is raised synchronously by the builder call that caused
/// it. A failed call never leaves a partial entry behind.
#[derive(Debug, Error)]
pub enum CoreError {
    /// CBOR codec error.
    #[error("codec error: {0}")]
    Codec(#[from] docmod_codec::CodecError),

    /// The operator is not in the field type's valid set.
    #[error("invalid modifier for {type_name} field: {operator}")]
    InvalidModifier {
        /// Name of the field's declared type.
        type_name: String,
        /// The rejected operator.
        operator: Operator,
    },

    /// Two entries in one update would touch the same document path.
    #[error(
        "conflicting modifiers: {attempted} on '{field}' conflicts with {existing} on '{existing_field}'"
    )]
    ConflictingModifier {
        /// Path the rejected call targeted.
        field: String,
        /// Path already present in the update.
        existing_field: String,
        /// Operator already targeting `existing_field`.
        existing: Operator,
        /// Operator of the rejected call.
        attempted: Operator,
    },

    /// The session's server is too old for the operator.
    #[error("{operator} requires server version {required}, session reports {server}")]
    UnsupportedOperator {
        /// The rejected operator.
        operator: Operator,
        /// Minimum version the operator needs.
        required: ServerVersion,
        /// Version the session reported.
        server: ServerVersion,
    },

    /// A value could not be encoded by the field type.
    #[error("bad value for {type_name} field: {message}")]
    BadValue {
        /// Name of the field's declared type.
        type_name: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A container operator was allowed but the type has no element encoder.
    #[error("{type_name} field permits {operator} but declares no element type")]
    MissingElementType {
        /// Name of the field's declared type.
        type_name: String,
        /// The operator that needed an element encoder.
        operator: Operator,
    },

    /// The field path is empty or malformed.
    #[error("invalid field path '{path}': {message}")]
    InvalidFieldPath {
        /// The offending path.
        path: String,
        /// What is wrong with it.
        message: String,
    },

    /// The selector is not a document.
    #[error("invalid selector: expected map, got {kind}")]
    InvalidSelector {
        /// Kind of value that was supplied.
        kind: &'static str,
    },

    /// A server version string could not be parsed.
    #[error("invalid server version: '{version}'")]
    InvalidVersion {
        /// The unparseable input.
        version: String,
    },

    /// The update holds no operations.
    #[error("update has no modifiers")]
    EmptyUpdate,
}

impl CoreError {
    /// Creates an invalid modifier error.
    pub fn invalid_modifier(type_name: impl Into<String>, operator: Operator) -> Self {
        Self::InvalidModifier {
            type_name: type_name.into(),
            operator,
        }
    }

    /// Creates a bad value error.
    pub fn bad_value(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadValue {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid field path error.
    pub fn invalid_field_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFieldPath {
            path: path.into(),
            message: message.into(),
        }
    }
}
