//! The update-expression builder.

use std::fmt;

use docmod_codec::Value;
use tracing::debug;

use crate::command::{Selector, UpdateCommand};
use crate::config::{UpdateConfig, VersionPolicy};
use crate::error::{CoreError, CoreResult};
use crate::field::{Field, FieldType};
use crate::operations::Operations;
use crate::operator::{Operator, OperatorSet, ServerVersion};
use crate::session::Session;
use crate::validator::validate_modifier;

/// Sentinel stored by `$unset`.
const UNSET_MARKER: Value = Value::Bool(true);
/// `$pop` argument that removes the first element.
const POP_FIRST: Value = Value::Integer(-1);
/// `$pop` argument that removes the last element.
const POP_LAST: Value = Value::Integer(1);

/// What a builder call hands over for encoding.
enum Payload {
    /// Encoded by the field's own type.
    Whole(Value),
    /// Encoded by the field's element type.
    Element(Value),
    /// Each item encoded by the field's element type.
    Elements(Vec<Value>),
    /// Stored as-is.
    Sentinel(Value),
}

/// Accumulates atomic modifiers into a single update command.
///
/// Every modifier call validates the operator against the field's type,
/// checks it against the session's server version, rejects conflicts with
/// modifiers already recorded, and only then encodes and stores the value.
/// A failed call leaves the builder untouched and usable.
///
/// The builder is consumed by [`execute`](Self::execute) or
/// [`into_command`](Self::into_command), so it cannot be reused.
///
/// # Example
///
/// ```
/// use docmod_core::{Field, IntType, ListType, RecordingSession, Selector, Session, StringType};
///
/// let session = RecordingSession::new();
/// let count = Field::new("count", IntType).unwrap();
/// let tags = Field::new("tags", ListType::new(StringType::new())).unwrap();
///
/// let mut update = session.update(Selector::all());
/// update.increment(&count, 2).unwrap().push(&tags, "new").unwrap().multi();
/// update.execute().unwrap();
///
/// assert_eq!(session.commands().len(), 1);
/// ```
pub struct UpdateExpression<'s, S: Session + ?Sized> {
    session: &'s S,
    selector: Selector,
    operations: Operations,
    upsert: bool,
    multi: bool,
    server: Option<ServerVersion>,
    supported: OperatorSet,
    config: UpdateConfig,
}

impl<'s, S: Session + ?Sized> UpdateExpression<'s, S> {
    /// Creates a builder with the default configuration.
    pub fn new(session: &'s S, selector: Selector) -> Self {
        Self::with_config(session, selector, UpdateConfig::default())
    }

    /// Creates a builder with an explicit configuration.
    ///
    /// The session's server version is read once, here.
    pub fn with_config(session: &'s S, selector: Selector, config: UpdateConfig) -> Self {
        let server = session.server_version();
        let supported = match (config.version_policy, server) {
            (VersionPolicy::Enforce, Some(version)) => OperatorSet::supported_by(version),
            _ => OperatorSet::ALL,
        };

        Self {
            session,
            selector,
            operations: Operations::new(),
            upsert: false,
            multi: false,
            server,
            supported,
            config,
        }
    }

    /// Atomically sets `field` to `value`.
    ///
    /// # Errors
    ///
    /// Fails if the field does not accept `$set`, the path conflicts with
    /// a recorded modifier, or the value does not encode.
    pub fn set(&mut self, field: &Field, value: impl Into<Value>) -> CoreResult<&mut Self> {
        self.apply(Operator::Set, field, Payload::Whole(value.into()))
    }

    /// Atomically removes `field`.
    ///
    /// # Errors
    ///
    /// Fails if the field does not accept `$unset` or the path conflicts.
    pub fn unset(&mut self, field: &Field) -> CoreResult<&mut Self> {
        self.apply(Operator::Unset, field, Payload::Sentinel(UNSET_MARKER))
    }

    /// Atomically adds `delta` to `field`.
    ///
    /// # Errors
    ///
    /// Fails if the field does not accept `$inc`, the path conflicts, or
    /// the delta does not encode as the field's type.
    pub fn increment(&mut self, field: &Field, delta: impl Into<Value>) -> CoreResult<&mut Self> {
        self.apply(Operator::Inc, field, Payload::Whole(delta.into()))
    }

    /// Atomically adds one to `field`.
    ///
    /// # Errors
    ///
    /// As [`increment`](Self::increment).
    pub fn increment_one(&mut self, field: &Field) -> CoreResult<&mut Self> {
        self.increment(field, 1)
    }

    /// Atomically appends `value` to the list `field`.
    ///
    /// # Errors
    ///
    /// Fails if the field does not accept `$push`, the path conflicts, or
    /// the value does not encode as the element type.
    pub fn push(&mut self, field: &Field, value: impl Into<Value>) -> CoreResult<&mut Self> {
        self.apply(Operator::Push, field, Payload::Element(value.into()))
    }

    /// Atomically appends each of `values` to the list `field`.
    ///
    /// An empty `values` records an empty sequence.
    ///
    /// # Errors
    ///
    /// Fails if the field does not accept `$pushAll`, the path conflicts,
    /// or any value does not encode as the element type.
    pub fn push_all<I>(&mut self, field: &Field, values: I) -> CoreResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.apply(Operator::PushAll, field, Payload::Elements(values))
    }

    /// Atomically removes every occurrence of `value` from `field`.
    ///
    /// # Errors
    ///
    /// Fails if the field does not accept `$pull`, the path conflicts, or
    /// the value does not encode as the element type.
    pub fn pull(&mut self, field: &Field, value: impl Into<Value>) -> CoreResult<&mut Self> {
        self.apply(Operator::Pull, field, Payload::Element(value.into()))
    }

    /// Atomically removes every occurrence of each of `values` from `field`.
    ///
    /// # Errors
    ///
    /// Fails if the field does not accept `$pullAll`, the path conflicts,
    /// or any value does not encode as the element type.
    pub fn pull_all<I>(&mut self, field: &Field, values: I) -> CoreResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.apply(Operator::PullAll, field, Payload::Elements(values))
    }

    /// Atomically appends `value` to `field` unless already present.
    ///
    /// # Errors
    ///
    /// Fails if the field does not accept `$addToSet`, the server is too
    /// old, the path conflicts, or the value does not encode.
    pub fn add_to_set(&mut self, field: &Field, value: impl Into<Value>) -> CoreResult<&mut Self> {
        self.apply(Operator::AddToSet, field, Payload::Element(value.into()))
    }

    /// Atomically removes the first element of `field`.
    ///
    /// # Errors
    ///
    /// Fails if the field does not accept `$pop`, the server is too old, or
    /// the path conflicts.
    pub fn pop_first(&mut self, field: &Field) -> CoreResult<&mut Self> {
        self.apply(Operator::Pop, field, Payload::Sentinel(POP_FIRST))
    }

    /// Atomically removes the last element of `field`.
    ///
    /// # Errors
    ///
    /// As [`pop_first`](Self::pop_first).
    pub fn pop_last(&mut self, field: &Field) -> CoreResult<&mut Self> {
        self.apply(Operator::Pop, field, Payload::Sentinel(POP_LAST))
    }

    /// Inserts a document if none matches the selector.
    pub fn upsert(&mut self) -> &mut Self {
        self.upsert = true;
        self
    }

    /// Updates every matching document instead of only the first.
    pub fn multi(&mut self) -> &mut Self {
        self.multi = true;
        self
    }

    /// Whether [`upsert`](Self::upsert) was called.
    pub fn is_upsert(&self) -> bool {
        self.upsert
    }

    /// Whether [`multi`](Self::multi) was called.
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// Modifiers recorded so far.
    pub fn operations(&self) -> &Operations {
        &self.operations
    }

    /// The documents this update targets.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Operators this builder will accept from the session's server.
    pub fn supported_operators(&self) -> OperatorSet {
        self.supported
    }

    /// Finalizes the builder without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyUpdate`] if nothing was recorded and the
    /// configuration does not allow empty updates.
    pub fn into_command(self) -> CoreResult<UpdateCommand> {
        if self.operations.is_empty() && !self.config.allow_empty {
            return Err(CoreError::EmptyUpdate);
        }
        Ok(UpdateCommand::new(
            self.selector,
            self.operations,
            self.upsert,
            self.multi,
        ))
    }

    /// Finalizes the builder and hands the command to the session.
    ///
    /// # Errors
    ///
    /// Finalization errors are converted into the session's error type;
    /// anything else is whatever the session reports.
    pub fn execute(self) -> Result<S::Output, S::Error> {
        let session = self.session;
        let command = self.into_command()?;
        debug!(
            modifiers = command.operations().len(),
            upsert = command.upsert(),
            multi = command.multi(),
            "executing update"
        );
        session.execute_update(command)
    }

    fn apply(&mut self, op: Operator, field: &Field, payload: Payload) -> CoreResult<&mut Self> {
        match self.stage(op, field, payload) {
            Ok(encoded) => {
                let replaced = self.operations.insert(op, field.path(), encoded);
                debug!(
                    operator = %op,
                    field = field.path(),
                    replaced = replaced.is_some(),
                    "modifier accepted"
                );
                Ok(self)
            }
            Err(err) => {
                debug!(operator = %op, field = field.path(), error = %err, "modifier rejected");
                Err(err)
            }
        }
    }

    /// Runs every check and encodes the payload. Touches no state.
    fn stage(&self, op: Operator, field: &Field, payload: Payload) -> CoreResult<Value> {
        let field_type = field.field_type();
        validate_modifier(field_type, op)?;
        self.check_supported(op)?;
        self.operations.check_conflict(op, field.path())?;

        match payload {
            Payload::Whole(value) => field_type.encode(value),
            Payload::Sentinel(value) => Ok(value),
            Payload::Element(value) => element_type(field_type, op)?.encode(value),
            Payload::Elements(values) => {
                let item = element_type(field_type, op)?;
                let encoded = values
                    .into_iter()
                    .map(|value| item.encode(value))
                    .collect::<CoreResult<Vec<_>>>()?;
                Ok(Value::Array(encoded))
            }
        }
    }

    fn check_supported(&self, op: Operator) -> CoreResult<()> {
        match self.server {
            Some(server) if !self.supported.contains(op) => Err(CoreError::UnsupportedOperator {
                operator: op,
                required: op.min_server_version(),
                server,
            }),
            _ => Ok(()),
        }
    }
}

fn element_type(field_type: &dyn FieldType, op: Operator) -> CoreResult<&dyn FieldType> {
    field_type
        .element_type()
        .ok_or_else(|| CoreError::MissingElementType {
            type_name: field_type.type_name().to_string(),
            operator: op,
        })
}

impl<S: Session + ?Sized> fmt::Debug for UpdateExpression<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateExpression")
            .field("selector", &self.selector)
            .field("operations", &self.operations)
            .field("upsert", &self.upsert)
            .field("multi", &self.multi)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}
