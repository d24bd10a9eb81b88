//! CLI error type.

use docmod_core::CoreError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading an input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON argument or schema file did not parse.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The builder rejected the update.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The schema file is well-formed JSON but describes an unknown type.
    #[error("schema error: {message}")]
    Schema {
        /// What is wrong with the schema.
        message: String,
    },

    /// A command-line argument is malformed.
    #[error("invalid argument '{arg}': {message}")]
    Argument {
        /// The offending argument.
        arg: String,
        /// What is wrong with it.
        message: String,
    },

    /// A modifier names a path the schema does not declare.
    #[error("unknown field: {path}")]
    UnknownField {
        /// The undeclared path.
        path: String,
    },
}

impl CliError {
    /// Creates a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Creates an argument error.
    pub fn argument(arg: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Argument {
            arg: arg.into(),
            message: message.into(),
        }
    }
}
