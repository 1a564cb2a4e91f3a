//! Domain events the ledger publishes for indexers and dashboards.

use crate::feedback::{ContentHash, Score};
use crate::ids::{AccountId, AgentId, FeedbackIndex};
use serde::{Deserialize, Serialize};

/// One-way notification emitted after a successful write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    NewFeedback {
        agent: AgentId,
        submitter: AccountId,
        feedback_index: FeedbackIndex,
        score: Score,
        tag1: String,
        tag2: String,
        endpoint: String,
        uri: String,
        content_hash: ContentHash,
    },
    FeedbackRevoked {
        agent: AgentId,
        submitter: AccountId,
        feedback_index: FeedbackIndex,
    },
    ResponseAppended {
        agent: AgentId,
        submitter: AccountId,
        feedback_index: FeedbackIndex,
        responder: AccountId,
        response_uri: String,
        response_hash: ContentHash,
    },
}

impl LedgerEvent {
    /// Agent the event concerns
    pub fn agent(&self) -> AgentId {
        match self {
            Self::NewFeedback { agent, .. }
            | Self::FeedbackRevoked { agent, .. }
            | Self::ResponseAppended { agent, .. } => *agent,
        }
    }

    /// Feedback item the event concerns
    pub fn feedback_key(&self) -> (AgentId, &AccountId, FeedbackIndex) {
        match self {
            Self::NewFeedback {
                agent,
                submitter,
                feedback_index,
                ..
            }
            | Self::FeedbackRevoked {
                agent,
                submitter,
                feedback_index,
            }
            | Self::ResponseAppended {
                agent,
                submitter,
                feedback_index,
                ..
            } => (*agent, submitter, *feedback_index),
        }
    }

    /// Stable event name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewFeedback { .. } => "new_feedback",
            Self::FeedbackRevoked { .. } => "feedback_revoked",
            Self::ResponseAppended { .. } => "response_appended",
        }
    }
}
