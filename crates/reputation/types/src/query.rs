//! Result shapes for the ledger's read operations.

use crate::feedback::Score;
use crate::ids::{AccountId, FeedbackIndex};
use serde::{Deserialize, Serialize};

/// Count and truncating average of the records that survived a summary filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub count: u64,
    /// `floor(sum / count)`, or 0 when nothing matched
    pub average_score: u8,
}

impl FeedbackSummary {
    /// Build a summary from a running count and score sum
    pub fn from_totals(count: u64, score_sum: u64) -> Self {
        let average_score = if count == 0 {
            0
        } else {
            // Every score is <= 100 so the quotient always fits.
            (score_sum / count) as u8
        };
        Self {
            count,
            average_score,
        }
    }
}

/// Parallel-array enumeration of feedback records.
///
/// Position `k` in every vector describes the same record. Built once at its
/// final size by the ledger and never grown afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackListing {
    pub submitters: Vec<AccountId>,
    pub indexes: Vec<FeedbackIndex>,
    pub scores: Vec<Score>,
    pub tag1s: Vec<String>,
    pub tag2s: Vec<String>,
    pub revoked: Vec<bool>,
}

impl FeedbackListing {
    /// Empty listing with room for exactly `len` records
    pub fn with_capacity(len: usize) -> Self {
        Self {
            submitters: Vec::with_capacity(len),
            indexes: Vec::with_capacity(len),
            scores: Vec::with_capacity(len),
            tag1s: Vec::with_capacity(len),
            tag2s: Vec::with_capacity(len),
            revoked: Vec::with_capacity(len),
        }
    }

    /// Number of records described
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Borrow row `k` across all arrays
    pub fn row(&self, k: usize) -> Option<FeedbackRow<'_>> {
        Some(FeedbackRow {
            submitter: self.submitters.get(k)?,
            index: *self.indexes.get(k)?,
            score: *self.scores.get(k)?,
            tag1: self.tag1s.get(k)?,
            tag2: self.tag2s.get(k)?,
            revoked: *self.revoked.get(k)?,
        })
    }

    /// Iterate rows in listing order
    pub fn rows(&self) -> impl Iterator<Item = FeedbackRow<'_>> + '_ {
        (0..self.len()).filter_map(move |k| self.row(k))
    }
}

/// Borrowed view of one listing position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedbackRow<'a> {
    pub submitter: &'a AccountId,
    pub index: FeedbackIndex,
    pub score: Score,
    pub tag1: &'a str,
    pub tag2: &'a str,
    pub revoked: bool,
}

/// How far a response-count query reaches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseScope {
    /// Every roster submitter and every assigned index of the agent
    Agent,
    /// Every assigned index of one submitter
    Submitter(AccountId),
    /// A single feedback item
    Feedback(AccountId, FeedbackIndex),
}
