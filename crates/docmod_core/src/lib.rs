//! # docmod Core
//!
//! Validated atomic update-expression builder.
//!
//! This crate provides:
//! - [`Operator`] and [`OperatorSet`], the update verbs and the capability
//!   sets field types declare
//! - [`FieldType`] and [`Field`], the descriptors every modifier targets
//! - [`validate_modifier`], the operator-versus-type check
//! - [`UpdateExpression`], which accumulates modifiers, rejects conflicts,
//!   and hands the finished [`UpdateCommand`] to a [`Session`]
//!
//! ## Usage
//!
//! ```
//! use docmod_core::{Field, IntType, Operator, RecordingSession, Selector, Session};
//!
//! let session = RecordingSession::new();
//! let count = Field::new("count", IntType).unwrap();
//!
//! let mut update = session.update(Selector::all());
//! update.increment(&count, 5).unwrap().upsert();
//! assert!(update.push(&count, 1).is_err());
//! update.execute().unwrap();
//!
//! let command = session.last_command().unwrap();
//! assert!(command.upsert());
//! assert!(command.operations().get(Operator::Inc, "count").is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod config;
mod error;
pub mod field;
mod operations;
mod operator;
mod session;
mod update;
mod validator;

pub use command::{Selector, UpdateCommand};
pub use config::{UpdateConfig, VersionPolicy};
pub use error::{CoreError, CoreResult};
pub use field::{
    BoolType, BytesType, Field, FieldType, FloatType, IntType, ListType, SetType, StringType,
};
pub use operations::Operations;
pub use operator::{Operator, OperatorSet, ServerVersion};
pub use session::{RecordingSession, Session, SessionError};
pub use update::UpdateExpression;
pub use validator::validate_modifier;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
