//! Feedback records and the requests that create them.

use crate::ids::{AccountId, AgentId, FeedbackIndex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest score a submitter may give.
pub const MAX_SCORE: u8 = 100;

/// A validated score in `[0, MAX_SCORE]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Validate a raw score
    pub fn new(value: u8) -> Result<Self, ScoreError> {
        if value > MAX_SCORE {
            return Err(ScoreError::OutOfRange { score: value });
        }
        Ok(Self(value))
    }

    /// Raw score value
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Score validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// Score above `MAX_SCORE`
    #[error("score {score} exceeds maximum of 100")]
    OutOfRange {
        /// The rejected value
        score: u8,
    },
}

/// Opaque 32-byte digest supplied by callers (content or response hash).
///
/// The ledger never interprets it; it is carried through to events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// The all-zero digest, used when a caller has nothing to commit to
    pub const ZERO: Self = Self([0u8; 32]);

    /// Borrow the digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for ContentHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// One stored feedback item.
///
/// Immutable after creation except for `revoked`, which only goes false to true.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub score: Score,
    pub tag1: String,
    pub tag2: String,
    pub revoked: bool,
}

impl FeedbackRecord {
    /// Whether the record passes exact-match tag filters (empty filter matches anything)
    pub fn matches_tags(&self, tag1: &str, tag2: &str) -> bool {
        (tag1.is_empty() || self.tag1 == tag1) && (tag2.is_empty() || self.tag2 == tag2)
    }
}

/// Request to record feedback about an agent.
///
/// `endpoint`, `uri` and `content_hash` are not stored; they are only published
/// with the `NewFeedback` event.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    pub agent: AgentId,
    pub score: u8,
    pub tag1: String,
    pub tag2: String,
    pub endpoint: String,
    pub uri: String,
    pub content_hash: ContentHash,
}

impl FeedbackSubmission {
    /// Create a submission with a score and no tags or locators
    pub fn new(agent: AgentId, score: u8) -> Self {
        Self {
            agent,
            score,
            ..Default::default()
        }
    }

    /// Set both tags
    pub fn with_tags(mut self, tag1: impl Into<String>, tag2: impl Into<String>) -> Self {
        self.tag1 = tag1.into();
        self.tag2 = tag2.into();
        self
    }

    /// Set the service endpoint the feedback refers to
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the off-ledger document locator and its digest
    pub fn with_uri(mut self, uri: impl Into<String>, content_hash: ContentHash) -> Self {
        self.uri = uri.into();
        self.content_hash = content_hash;
        self
    }
}

/// Request to attach a response to an existing feedback item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseSubmission {
    pub agent: AgentId,
    pub submitter: AccountId,
    pub feedback_index: FeedbackIndex,
    pub response_uri: String,
    pub response_hash: ContentHash,
}

impl ResponseSubmission {
    pub fn new(
        agent: AgentId,
        submitter: AccountId,
        feedback_index: FeedbackIndex,
        response_uri: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            submitter,
            feedback_index,
            response_uri: response_uri.into(),
            response_hash: ContentHash::ZERO,
        }
    }

    pub fn with_hash(mut self, response_hash: ContentHash) -> Self {
        self.response_hash = response_hash;
        self
    }
}
