//! Identifiers used to key the ledger's indices.

use serde::{Deserialize, Serialize};

/// Externally issued agent identifier.
///
/// The ledger never mints these; it only asks the identity gate whether one exists.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AgentId(pub u64);

impl AgentId {
    /// Wrap a raw agent number
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw agent number
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

impl From<u64> for AgentId {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

/// Caller identity: a feedback submitter or a responder.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create an account id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Position of a record inside one `(agent, submitter)` feedback sequence.
///
/// Sequences start at 1; zero is never a valid index.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FeedbackIndex(pub u64);

impl FeedbackIndex {
    /// First index of every sequence
    pub const FIRST: Self = Self(1);

    /// Wrap a raw index
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    /// Raw index value
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Index following this one
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether the index falls inside a sequence whose high-water mark is `last`
    pub const fn within(&self, last: u64) -> bool {
        self.0 >= 1 && self.0 <= last
    }
}

impl std::fmt::Display for FeedbackIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for FeedbackIndex {
    fn from(n: u64) -> Self {
        Self(n)
    }
}
