//! Field descriptors.
//!
//! A [`FieldType`] declares which operators it accepts and how raw values
//! are encoded for it. A [`Field`] pairs a type with the dotted path it
//! lives at inside a document; it is the reference every builder call takes.

mod builtin;

pub use builtin::{BoolType, BytesType, FloatType, IntType, ListType, SetType, StringType};

use std::fmt;
use std::sync::Arc;

use docmod_codec::Value;

use crate::error::{CoreError, CoreResult};
use crate::operator::OperatorSet;

/// The semantic type of a document field.
///
/// Implementors are immutable once built and may be shared between
/// threads. [`valid_operators`] has no default: every type lists the
/// operators it accepts.
///
/// [`valid_operators`]: FieldType::valid_operators
pub trait FieldType: fmt::Debug + Send + Sync {
    /// Name used in error messages, e.g. `int` or `list<string>`.
    fn type_name(&self) -> &str;

    /// Operators that may target a field of this type.
    fn valid_operators(&self) -> OperatorSet;

    /// Encodes a raw value for storage in this field.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::BadValue`] if the value does not fit the type.
    fn encode(&self, value: Value) -> CoreResult<Value>;

    /// The element type, for container types.
    fn element_type(&self) -> Option<&dyn FieldType> {
        None
    }
}

/// A reference to a typed field at a dotted path.
#[derive(Debug, Clone)]
pub struct Field {
    path: String,
    field_type: Arc<dyn FieldType>,
}

impl Field {
    /// Creates a field of the given type at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFieldPath`] if the path is malformed.
    pub fn new(path: impl Into<String>, field_type: impl FieldType + 'static) -> CoreResult<Self> {
        Self::with_shared_type(path, Arc::new(field_type))
    }

    /// Creates a field that shares an existing type descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFieldPath`] if the path is malformed.
    pub fn with_shared_type(
        path: impl Into<String>,
        field_type: Arc<dyn FieldType>,
    ) -> CoreResult<Self> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self { path, field_type })
    }

    /// Creates a field nested under this one, at `self.path + "." + name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFieldPath`] if `name` is not a valid
    /// path segment.
    pub fn child(&self, name: &str, field_type: impl FieldType + 'static) -> CoreResult<Self> {
        Self::new(format!("{}.{}", self.path, name), field_type)
    }

    /// The dotted path of this field.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The field's type descriptor.
    pub fn field_type(&self) -> &dyn FieldType {
        self.field_type.as_ref()
    }

    /// A shared handle to the field's type descriptor.
    pub fn shared_type(&self) -> Arc<dyn FieldType> {
        Arc::clone(&self.field_type)
    }
}

/// Checks a dotted path: non-empty segments, no NUL bytes, and no `$`
/// prefixes except the bare positional segment `$`.
fn validate_path(path: &str) -> CoreResult<()> {
    if path.is_empty() {
        return Err(CoreError::invalid_field_path(path, "path is empty"));
    }
    if path.contains('\0') {
        return Err(CoreError::invalid_field_path(path, "path contains NUL"));
    }
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(CoreError::invalid_field_path(path, "empty path segment"));
        }
        if segment.starts_with('$') && segment != "$" {
            return Err(CoreError::invalid_field_path(
                path,
                format!("segment '{segment}' starts with '$'"),
            ));
        }
    }
    Ok(())
}
