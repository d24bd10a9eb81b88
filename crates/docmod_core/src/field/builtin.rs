//! Built-in field types.

use std::sync::Arc;

use docmod_codec::Value;

use super::FieldType;
use crate::error::{CoreError, CoreResult};
use crate::operator::OperatorSet;

fn mismatch(type_name: &str, expected: &str, value: &Value) -> CoreError {
    CoreError::bad_value(type_name, format!("expected {expected}, got {}", value.kind()))
}

/// UTF-8 text, optionally bounded in length.
#[derive(Debug, Clone, Default)]
pub struct StringType {
    max_length: Option<usize>,
}

impl StringType {
    /// Creates an unbounded string type.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects values longer than `max` characters.
    #[must_use]
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

impl FieldType for StringType {
    fn type_name(&self) -> &str {
        "string"
    }

    fn valid_operators(&self) -> OperatorSet {
        OperatorSet::BASE
    }

    fn encode(&self, value: Value) -> CoreResult<Value> {
        let text = match value {
            Value::Text(text) => text,
            other => return Err(mismatch(self.type_name(), "text", &other)),
        };
        if let Some(max) = self.max_length {
            let len = text.chars().count();
            if len > max {
                return Err(CoreError::bad_value(
                    self.type_name(),
                    format!("length {len} exceeds maximum {max}"),
                ));
            }
        }
        Ok(Value::Text(text))
    }
}

/// 64-bit signed integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntType;

impl FieldType for IntType {
    fn type_name(&self) -> &str {
        "int"
    }

    fn valid_operators(&self) -> OperatorSet {
        OperatorSet::NUMERIC
    }

    fn encode(&self, value: Value) -> CoreResult<Value> {
        match value {
            Value::Integer(_) => Ok(value),
            other => Err(mismatch(self.type_name(), "integer", &other)),
        }
    }
}

/// Double-precision floats. Integers widen; NaN is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

impl FieldType for FloatType {
    fn type_name(&self) -> &str {
        "float"
    }

    fn valid_operators(&self) -> OperatorSet {
        OperatorSet::NUMERIC
    }

    #[allow(clippy::cast_precision_loss)]
    fn encode(&self, value: Value) -> CoreResult<Value> {
        match value {
            Value::Float(f) if f.is_nan() => {
                Err(CoreError::bad_value(self.type_name(), "NaN is not storable"))
            }
            Value::Float(_) => Ok(value),
            Value::Integer(n) => Ok(Value::Float(n as f64)),
            other => Err(mismatch(self.type_name(), "number", &other)),
        }
    }
}

/// Booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType;

impl FieldType for BoolType {
    fn type_name(&self) -> &str {
        "bool"
    }

    fn valid_operators(&self) -> OperatorSet {
        OperatorSet::BASE
    }

    fn encode(&self, value: Value) -> CoreResult<Value> {
        match value {
            Value::Bool(_) => Ok(value),
            other => Err(mismatch(self.type_name(), "bool", &other)),
        }
    }
}

/// Raw byte strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesType;

impl FieldType for BytesType {
    fn type_name(&self) -> &str {
        "bytes"
    }

    fn valid_operators(&self) -> OperatorSet {
        OperatorSet::BASE
    }

    fn encode(&self, value: Value) -> CoreResult<Value> {
        match value {
            Value::Bytes(_) => Ok(value),
            other => Err(mismatch(self.type_name(), "bytes", &other)),
        }
    }
}

/// An ordered list whose elements share one type.
#[derive(Debug, Clone)]
pub struct ListType {
    name: String,
    item: Arc<dyn FieldType>,
}

impl ListType {
    /// Creates a list of `item` elements.
    pub fn new(item: impl FieldType + 'static) -> Self {
        Self::of_shared(Arc::new(item))
    }

    /// Creates a list over a shared element descriptor.
    pub fn of_shared(item: Arc<dyn FieldType>) -> Self {
        Self {
            name: format!("list<{}>", item.type_name()),
            item,
        }
    }
}

impl FieldType for ListType {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn valid_operators(&self) -> OperatorSet {
        OperatorSet::LIST
    }

    fn encode(&self, value: Value) -> CoreResult<Value> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(mismatch(&self.name, "array", &other)),
        };
        let encoded = items
            .into_iter()
            .map(|item| self.item.encode(item))
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Value::Array(encoded))
    }

    fn element_type(&self) -> Option<&dyn FieldType> {
        Some(self.item.as_ref())
    }
}

/// A list whose elements are unique.
///
/// Grows through `$addToSet`; `$push` and `$pushAll` are not accepted.
#[derive(Debug, Clone)]
pub struct SetType {
    name: String,
    item: Arc<dyn FieldType>,
}

impl SetType {
    /// Creates a set of `item` elements.
    pub fn new(item: impl FieldType + 'static) -> Self {
        Self::of_shared(Arc::new(item))
    }

    /// Creates a set over a shared element descriptor.
    pub fn of_shared(item: Arc<dyn FieldType>) -> Self {
        Self {
            name: format!("set<{}>", item.type_name()),
            item,
        }
    }
}

impl FieldType for SetType {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn valid_operators(&self) -> OperatorSet {
        OperatorSet::SET
    }

    fn encode(&self, value: Value) -> CoreResult<Value> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(mismatch(&self.name, "array", &other)),
        };
        let mut encoded: Vec<Value> = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let item = self.item.encode(item)?;
            if encoded.contains(&item) {
                return Err(CoreError::bad_value(
                    &self.name,
                    format!("duplicate element at index {index}"),
                ));
            }
            encoded.push(item);
        }
        Ok(Value::Array(encoded))
    }

    fn element_type(&self) -> Option<&dyn FieldType> {
        Some(self.item.as_ref())
    }
}
