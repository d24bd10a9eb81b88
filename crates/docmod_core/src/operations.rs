//! The accumulated operator -> field path -> value mapping.

use std::collections::BTreeMap;

use docmod_codec::Value;

use crate::error::{CoreError, CoreResult};
use crate::operator::Operator;

/// Encoded modifiers grouped by operator, then by field path.
///
/// At most one operator targets any given path, and no two entries target
/// overlapping paths (`a` and `a.b`). The same operator on the same path
/// replaces the previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operations {
    entries: BTreeMap<Operator, BTreeMap<String, Value>>,
}

impl Operations {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no modifier has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of (operator, path) entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// The encoded value stored for `op` on `path`.
    pub fn get(&self, op: Operator, path: &str) -> Option<&Value> {
        self.entries.get(&op)?.get(path)
    }

    /// All paths targeted by `op`, with their values.
    pub fn fields(&self, op: Operator) -> Option<&BTreeMap<String, Value>> {
        self.entries.get(&op)
    }

    /// The operator currently targeting exactly `path`.
    pub fn operator_for(&self, path: &str) -> Option<Operator> {
        self.iter()
            .find(|(_, existing, _)| *existing == path)
            .map(|(op, _, _)| op)
    }

    /// Iterates entries in operator order, then path order.
    pub fn iter(&self) -> impl Iterator<Item = (Operator, &str, &Value)> {
        self.entries.iter().flat_map(|(op, fields)| {
            fields
                .iter()
                .map(move |(path, value)| (*op, path.as_str(), value))
        })
    }

    /// Checks whether `op` on `path` may be recorded.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConflictingModifier`] if another entry targets
    /// `path` with a different operator, or targets an overlapping path.
    pub fn check_conflict(&self, op: Operator, path: &str) -> CoreResult<()> {
        for (existing, existing_path, _) in self.iter() {
            if existing == op && existing_path == path {
                continue;
            }
            if paths_overlap(existing_path, path) {
                return Err(CoreError::ConflictingModifier {
                    field: path.to_string(),
                    existing_field: existing_path.to_string(),
                    existing,
                    attempted: op,
                });
            }
        }
        Ok(())
    }

    /// Records `value`, returning the value it replaced.
    ///
    /// Callers run [`check_conflict`](Self::check_conflict) first.
    pub(crate) fn insert(&mut self, op: Operator, path: &str, value: Value) -> Option<Value> {
        self.entries
            .entry(op)
            .or_default()
            .insert(path.to_string(), value)
    }

    /// Renders the `{ operator: { path: value } }` document.
    pub fn to_document(&self) -> Value {
        Value::map(self.entries.iter().map(|(op, fields)| {
            let fields = fields
                .iter()
                .map(|(path, value)| (path.clone(), value.clone()));
            (op.as_str(), Value::map(fields))
        }))
    }
}

/// Whether two dotted paths name the same field or one contains the other.
fn paths_overlap(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    long.starts_with(short) && (long.len() == short.len() || long.as_bytes()[short.len()] == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ops: &mut Operations, op: Operator, path: &str, value: Value) -> CoreResult<()> {
        ops.check_conflict(op, path)?;
        ops.insert(op, path, value);
        Ok(())
    }

    #[test]
    fn overlap_respects_segment_boundaries() {
        assert!(paths_overlap("a", "a"));
        assert!(paths_overlap("a", "a.b"));
        assert!(paths_overlap("a.b.c", "a.b"));
        assert!(!paths_overlap("a", "ab"));
        assert!(!paths_overlap("a.b", "a.c"));
        assert!(!paths_overlap("name", "names.first"));
    }

    #[test]
    fn same_operator_same_path_overwrites() {
        let mut ops = Operations::new();
        record(&mut ops, Operator::Set, "name", Value::from("a")).unwrap();
        record(&mut ops, Operator::Set, "name", Value::from("b")).unwrap();

        assert_eq!(ops.len(), 1);
        assert_eq!(ops.get(Operator::Set, "name"), Some(&Value::from("b")));
    }

    #[test]
    fn different_operator_same_path_conflicts() {
        let mut ops = Operations::new();
        record(&mut ops, Operator::Set, "count", Value::Integer(1)).unwrap();

        let err = ops.check_conflict(Operator::Inc, "count").unwrap_err();
        assert!(matches!(
            err,
            CoreError::ConflictingModifier {
                existing: Operator::Set,
                attempted: Operator::Inc,
                ..
            }
        ));
    }

    #[test]
    fn nested_path_conflicts_with_parent() {
        let mut ops = Operations::new();
        record(&mut ops, Operator::Set, "address", Value::empty_map()).unwrap();

        let err = ops.check_conflict(Operator::Set, "address.city").unwrap_err();
        match err {
            CoreError::ConflictingModifier {
                field,
                existing_field,
                ..
            } => {
                assert_eq!(field, "address.city");
                assert_eq!(existing_field, "address");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn disjoint_paths_coexist() {
        let mut ops = Operations::new();
        record(&mut ops, Operator::Set, "name", Value::from("a")).unwrap();
        record(&mut ops, Operator::Inc, "count", Value::Integer(1)).unwrap();
        record(&mut ops, Operator::Inc, "stats.views", Value::Integer(1)).unwrap();

        assert_eq!(ops.len(), 3);
        assert_eq!(ops.operator_for("count"), Some(Operator::Inc));
        assert_eq!(ops.operator_for("stats"), None);
        assert_eq!(ops.fields(Operator::Inc).map(BTreeMap::len), Some(2));
    }

    #[test]
    fn document_shape() {
        let mut ops = Operations::new();
        record(&mut ops, Operator::Inc, "count", Value::Integer(2)).unwrap();
        record(&mut ops, Operator::Set, "name", Value::from("x")).unwrap();

        let expected = Value::map([
            ("$set", Value::map([("name", Value::from("x"))])),
            ("$inc", Value::map([("count", Value::Integer(2))])),
        ]);
        assert_eq!(ops.to_document(), expected);
    }
}
