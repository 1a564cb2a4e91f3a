//! Index state behind the ledger lock.
//!
//! Nothing here validates scores or consults the identity gate; callers do that
//! before touching state so that a rejected call never leaves a trace.

use crate::error::{LedgerError, LedgerResult};
use reputation_types::{AccountId, AgentId, FeedbackIndex, FeedbackRecord};
use std::collections::{HashMap, HashSet};

/// A stored record plus the per-responder counters attached to it.
#[derive(Debug, Clone)]
pub(crate) struct FeedbackSlot {
    pub(crate) record: FeedbackRecord,
    pub(crate) responses: HashMap<AccountId, u64>,
}

/// Everything recorded about one agent.
#[derive(Debug, Default)]
pub(crate) struct AgentBook {
    /// Submitters in first-submission order
    pub(crate) roster: Vec<AccountId>,
    members: HashSet<AccountId>,
    /// Slot `i` holds feedback index `i + 1`, so the length is the last index.
    pub(crate) sequences: HashMap<AccountId, Vec<FeedbackSlot>>,
}

impl AgentBook {
    pub(crate) fn sequence(&self, submitter: &AccountId) -> &[FeedbackSlot] {
        self.sequences
            .get(submitter)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn last_index(&self, submitter: &AccountId) -> u64 {
        self.sequence(submitter).len() as u64
    }
}

#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    pub(crate) agents: HashMap<AgentId, AgentBook>,
}

impl LedgerState {
    pub(crate) fn book(&self, agent: AgentId) -> Option<&AgentBook> {
        self.agents.get(&agent)
    }

    pub(crate) fn last_index(&self, agent: AgentId, submitter: &AccountId) -> u64 {
        self.book(agent)
            .map(|book| book.last_index(submitter))
            .unwrap_or(0)
    }

    /// Append a record to the `(agent, submitter)` sequence and return its index.
    ///
    /// Enrolls the submitter in the roster on first contact.
    pub(crate) fn append_feedback(
        &mut self,
        agent: AgentId,
        submitter: &AccountId,
        record: FeedbackRecord,
    ) -> FeedbackIndex {
        let book = self.agents.entry(agent).or_default();

        if book.members.insert(submitter.clone()) {
            book.roster.push(submitter.clone());
        }

        let sequence = book.sequences.entry(submitter.clone()).or_default();
        sequence.push(FeedbackSlot {
            record,
            responses: HashMap::new(),
        });
        FeedbackIndex::new(sequence.len() as u64)
    }

    /// Borrow the slot at `index`, failing with `InvalidIndex` outside `1..=last_index`.
    pub(crate) fn slot(
        &self,
        agent: AgentId,
        submitter: &AccountId,
        index: FeedbackIndex,
    ) -> LedgerResult<&FeedbackSlot> {
        let sequence = self
            .book(agent)
            .map(|book| book.sequence(submitter))
            .unwrap_or(&[]);
        position(index, sequence.len())
            .and_then(|pos| sequence.get(pos))
            .ok_or_else(|| invalid_index(agent, submitter, index, sequence.len() as u64))
    }

    fn slot_mut(
        &mut self,
        agent: AgentId,
        submitter: &AccountId,
        index: FeedbackIndex,
    ) -> LedgerResult<&mut FeedbackSlot> {
        let last_index = self.last_index(agent, submitter);
        let pos = position(index, last_index as usize)
            .ok_or_else(|| invalid_index(agent, submitter, index, last_index))?;
        self.agents
            .get_mut(&agent)
            .and_then(|book| book.sequences.get_mut(submitter))
            .and_then(|sequence| sequence.get_mut(pos))
            .ok_or_else(|| invalid_index(agent, submitter, index, last_index))
    }

    /// Flip the revoked flag of one of `submitter`'s records.
    pub(crate) fn revoke(
        &mut self,
        agent: AgentId,
        submitter: &AccountId,
        index: FeedbackIndex,
    ) -> LedgerResult<()> {
        let slot = self.slot_mut(agent, submitter, index)?;
        if slot.record.revoked {
            return Err(LedgerError::AlreadyRevoked {
                agent,
                submitter: submitter.clone(),
                index,
            });
        }
        slot.record.revoked = true;
        Ok(())
    }

    /// Bump the responder's counter on an existing record and return the new count.
    pub(crate) fn record_response(
        &mut self,
        agent: AgentId,
        submitter: &AccountId,
        index: FeedbackIndex,
        responder: &AccountId,
    ) -> LedgerResult<u64> {
        let slot = self.slot_mut(agent, submitter, index)?;
        let count = slot.responses.entry(responder.clone()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}

/// Zero-based slot position of `index` within a sequence of length `len`.
fn position(index: FeedbackIndex, len: usize) -> Option<usize> {
    index.within(len as u64).then(|| index.value() as usize - 1)
}

fn invalid_index(
    agent: AgentId,
    submitter: &AccountId,
    index: FeedbackIndex,
    last_index: u64,
) -> LedgerError {
    LedgerError::InvalidIndex {
        agent,
        submitter: submitter.clone(),
        index,
        last_index,
    }
}
