//! Builder configuration.

/// How operators newer than the session's server are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPolicy {
    /// Reject operators the server is too old for.
    #[default]
    Enforce,
    /// Accept every operator regardless of server version.
    Ignore,
}

/// Configuration for an update builder.
#[derive(Debug, Clone, Default)]
pub struct UpdateConfig {
    /// Version gating for operators.
    pub version_policy: VersionPolicy,

    /// Whether an update with no modifiers may be finalized.
    pub allow_empty: bool,
}

impl UpdateConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the version policy.
    #[must_use]
    pub const fn version_policy(mut self, policy: VersionPolicy) -> Self {
        self.version_policy = policy;
        self
    }

    /// Sets whether empty updates may be finalized.
    #[must_use]
    pub const fn allow_empty(mut self, value: bool) -> Self {
        self.allow_empty = value;
        self
    }
}
