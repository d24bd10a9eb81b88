//! Finished update commands and the selectors they target.

use docmod_codec::{to_cbor, Value};

use crate::error::{CoreError, CoreResult};
use crate::operations::Operations;

/// Identifies the documents an update applies to.
///
/// The selector is opaque here: it is carried to the session untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector(Value);

impl Selector {
    /// Selects every document.
    #[must_use]
    pub fn all() -> Self {
        Self(Value::empty_map())
    }

    /// Wraps a query document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSelector`] if `document` is not a map.
    pub fn new(document: Value) -> CoreResult<Self> {
        match document {
            Value::Map(_) => Ok(Self(document)),
            other => Err(CoreError::InvalidSelector { kind: other.kind() }),
        }
    }

    /// The query document.
    pub fn document(&self) -> &Value {
        &self.0
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::all()
    }
}

/// A finished update, ready to hand to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCommand {
    selector: Selector,
    operations: Operations,
    upsert: bool,
    multi: bool,
}

impl UpdateCommand {
    pub(crate) fn new(selector: Selector, operations: Operations, upsert: bool, multi: bool) -> Self {
        Self {
            selector,
            operations,
            upsert,
            multi,
        }
    }

    /// The documents this update targets.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// The accumulated modifiers.
    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    /// Insert a document if none matches.
    pub fn upsert(&self) -> bool {
        self.upsert
    }

    /// Apply to every matching document.
    pub fn multi(&self) -> bool {
        self.multi
    }

    /// The `{ operator: { path: value } }` update document.
    pub fn to_document(&self) -> Value {
        self.operations.to_document()
    }

    /// The full command as sent on the wire.
    pub fn to_wire(&self) -> Value {
        Value::map([
            ("q", self.selector.document().clone()),
            ("u", self.to_document()),
            ("upsert", Value::Bool(self.upsert)),
            ("multi", Value::Bool(self.multi)),
        ])
    }

    /// Encodes [`to_wire`](Self::to_wire) as CBOR.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Codec`] if encoding fails.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        Ok(to_cbor(&self.to_wire())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;
    use docmod_codec::from_cbor;

    fn sample() -> UpdateCommand {
        let mut ops = Operations::new();
        ops.insert(Operator::Push, "tags", Value::from("x"));
        let selector = Selector::new(Value::map([("name", Value::from("a"))])).unwrap();
        UpdateCommand::new(selector, ops, true, false)
    }

    #[test]
    fn selector_must_be_a_map() {
        assert!(Selector::new(Value::empty_map()).is_ok());
        let err = Selector::new(Value::Integer(1)).unwrap_err();
        assert_eq!(err.to_string(), "invalid selector: expected map, got integer");
        assert_eq!(Selector::default(), Selector::all());
    }

    #[test]
    fn wire_document_carries_flags() {
        let wire = sample().to_wire();
        assert_eq!(wire.get("upsert"), Some(&Value::Bool(true)));
        assert_eq!(wire.get("multi"), Some(&Value::Bool(false)));
        assert_eq!(
            wire.get("q").and_then(|q| q.get("name")),
            Some(&Value::from("a"))
        );
        assert_eq!(
            wire.get("u"),
            Some(&Value::map([("$push", Value::map([("tags", Value::from("x"))]))]))
        );
    }

    #[test]
    fn encoded_command_decodes_to_wire_document() {
        let command = sample();
        let bytes = command.encode().unwrap();
        assert_eq!(from_cbor(&bytes).unwrap(), command.to_wire());
    }
}
