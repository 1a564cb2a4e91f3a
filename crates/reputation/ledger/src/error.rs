use reputation_types::{AccountId, AgentId, FeedbackIndex, ScoreError};
use thiserror::Error;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-related errors.
///
/// Every domain variant is a deterministic rejection of the offending call;
/// no state is changed when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid score {score}: must be between 0 and 100")]
    InvalidScore { score: u8 },

    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("invalid feedback index {index} for {agent}/{submitter} (last index {last_index})")]
    InvalidIndex {
        agent: AgentId,
        submitter: AccountId,
        index: FeedbackIndex,
        last_index: u64,
    },

    #[error("feedback {index} for {agent}/{submitter} already revoked")]
    AlreadyRevoked {
        agent: AgentId,
        submitter: AccountId,
        index: FeedbackIndex,
    },

    #[error("response URI must not be empty")]
    EmptyUri,

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<ScoreError> for LedgerError {
    fn from(value: ScoreError) -> Self {
        match value {
            ScoreError::OutOfRange { score } => Self::InvalidScore { score },
        }
    }
}
