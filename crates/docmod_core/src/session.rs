//! Session abstraction for executing update commands.

use parking_lot::Mutex;
use thiserror::Error;

use crate::command::{Selector, UpdateCommand};
use crate::error::CoreError;
use crate::operator::ServerVersion;
use crate::update::UpdateExpression;

/// A session sends finished commands to the store.
///
/// This trait abstracts the transport, allowing for different
/// implementations (network clients, dry runs, recording mocks for tests).
/// Errors raised while finalizing a builder reach the caller through
/// `Self::Error`, so it must be constructible from [`CoreError`].
pub trait Session {
    /// What a successful update reports.
    type Output;

    /// Transport or store failure.
    type Error: From<CoreError>;

    /// The store's version, if known. Builders gate operators on it.
    fn server_version(&self) -> Option<ServerVersion> {
        None
    }

    /// Sends one update command.
    fn execute_update(&self, command: UpdateCommand) -> Result<Self::Output, Self::Error>;

    /// Starts an update against the documents `selector` matches.
    fn update(&self, selector: Selector) -> UpdateExpression<'_, Self>
    where
        Self: Sized,
    {
        UpdateExpression::new(self, selector)
    }
}

/// Errors returned by [`RecordingSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The update could not be finalized.
    #[error(transparent)]
    Update(#[from] CoreError),

    /// The primed transport failure.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },
}

/// An in-memory session that records every command it executes.
#[derive(Debug, Default)]
pub struct RecordingSession {
    version: Option<ServerVersion>,
    commands: Mutex<Vec<UpdateCommand>>,
    failure: Mutex<Option<String>>,
}

impl RecordingSession {
    /// Creates a session that reports no server version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session that reports `version`.
    pub fn with_version(version: ServerVersion) -> Self {
        Self {
            version: Some(version),
            ..Self::default()
        }
    }

    /// Makes the next execution fail with a transport error.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    /// Commands executed so far, oldest first.
    pub fn commands(&self) -> Vec<UpdateCommand> {
        self.commands.lock().clone()
    }

    /// The most recently executed command.
    pub fn last_command(&self) -> Option<UpdateCommand> {
        self.commands.lock().last().cloned()
    }
}

impl Session for RecordingSession {
    type Output = ();
    type Error = SessionError;

    fn server_version(&self) -> Option<ServerVersion> {
        self.version
    }

    fn execute_update(&self, command: UpdateCommand) -> Result<(), SessionError> {
        if let Some(message) = self.failure.lock().take() {
            return Err(SessionError::Transport { message });
        }
        self.commands.lock().push(command);
        Ok(())
    }
}
