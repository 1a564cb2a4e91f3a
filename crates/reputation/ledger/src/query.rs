//! Read-time aggregation over the ledger indices.
//!
//! Nothing is precomputed on the write path. Every summary, listing and
//! response count is derived by walking the sequences at query time, so callers
//! must bound unfiltered queries on busy agents themselves.

use crate::state::{AgentBook, FeedbackSlot, LedgerState};
use reputation_types::{
    AccountId, AgentId, FeedbackIndex, FeedbackListing, FeedbackRecord, FeedbackSummary,
    ResponseScope,
};
use serde::{Deserialize, Serialize};

/// Record predicate shared by summaries and listings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordFilter<'a> {
    pub(crate) tag1: &'a str,
    pub(crate) tag2: &'a str,
    pub(crate) include_revoked: bool,
}

impl RecordFilter<'_> {
    fn accepts(&self, record: &FeedbackRecord) -> bool {
        (self.include_revoked || !record.revoked) && record.matches_tags(self.tag1, self.tag2)
    }
}

/// On-demand totals across the whole ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatistics {
    pub agents: usize,
    pub roster_entries: usize,
    pub feedback_total: u64,
    pub revoked_total: u64,
    pub response_cells: u64,
}

impl LedgerState {
    /// Walk `(submitter, index, record)` in canonical order: the given
    /// submitters (or the roster when none are given) outer, ascending index inner.
    fn scan<'a>(
        &'a self,
        agent: AgentId,
        submitters: &'a [AccountId],
    ) -> impl Iterator<Item = (&'a AccountId, FeedbackIndex, &'a FeedbackRecord)> + 'a {
        let book = self.book(agent);
        let outer: &'a [AccountId] = match book {
            Some(book) if submitters.is_empty() => &book.roster,
            _ => submitters,
        };

        outer.iter().flat_map(move |submitter| {
            let sequence: &'a [FeedbackSlot] =
                book.map(|book| book.sequence(submitter)).unwrap_or(&[]);
            sequence.iter().enumerate().map(move |(pos, slot)| {
                (submitter, FeedbackIndex::new(pos as u64 + 1), &slot.record)
            })
        })
    }

    pub(crate) fn summary(
        &self,
        agent: AgentId,
        submitters: &[AccountId],
        tag1: &str,
        tag2: &str,
    ) -> FeedbackSummary {
        let filter = RecordFilter {
            tag1,
            tag2,
            include_revoked: false,
        };

        let (count, score_sum) = self
            .scan(agent, submitters)
            .filter(|(_, _, record)| filter.accepts(record))
            .fold((0u64, 0u64), |(count, sum), (_, _, record)| {
                (count + 1, sum + u64::from(record.score.value()))
            });

        FeedbackSummary::from_totals(count, score_sum)
    }

    /// Count matching records, then fill a listing sized to exactly that count
    /// by re-walking the same order with the same predicate.
    pub(crate) fn listing(
        &self,
        agent: AgentId,
        submitters: &[AccountId],
        filter: RecordFilter<'_>,
    ) -> FeedbackListing {
        let total = self
            .scan(agent, submitters)
            .filter(|(_, _, record)| filter.accepts(record))
            .count();

        let mut listing = FeedbackListing::with_capacity(total);
        for (submitter, index, record) in self
            .scan(agent, submitters)
            .filter(|(_, _, record)| filter.accepts(record))
        {
            listing.submitters.push(submitter.clone());
            listing.indexes.push(index);
            listing.scores.push(record.score);
            listing.tag1s.push(record.tag1.clone());
            listing.tag2s.push(record.tag2.clone());
            listing.revoked.push(record.revoked);
        }

        debug_assert_eq!(listing.len(), total);
        listing
    }

    /// Sum per-responder counters over the cells selected by `scope`.
    ///
    /// There is no across-responder counter, so an empty `responders` list
    /// always yields 0.
    pub(crate) fn response_count(
        &self,
        agent: AgentId,
        scope: &ResponseScope,
        responders: &[AccountId],
    ) -> u64 {
        if responders.is_empty() {
            return 0;
        }
        let Some(book) = self.book(agent) else {
            return 0;
        };

        match scope {
            ResponseScope::Agent => book
                .roster
                .iter()
                .map(|submitter| sum_sequence(book, submitter, responders))
                .sum(),
            ResponseScope::Submitter(submitter) => sum_sequence(book, submitter, responders),
            ResponseScope::Feedback(submitter, index) => {
                let sequence = book.sequence(submitter);
                index
                    .value()
                    .checked_sub(1)
                    .and_then(|pos| sequence.get(pos as usize))
                    .map(|slot| sum_cell(slot, responders))
                    .unwrap_or(0)
            }
        }
    }

    pub(crate) fn statistics(&self) -> LedgerStatistics {
        let mut stats = LedgerStatistics {
            agents: self.agents.len(),
            ..Default::default()
        };

        for book in self.agents.values() {
            stats.roster_entries += book.roster.len();
            for slot in book.sequences.values().flatten() {
                stats.feedback_total += 1;
                if slot.record.revoked {
                    stats.revoked_total += 1;
                }
                stats.response_cells += slot.responses.len() as u64;
            }
        }

        stats
    }
}

fn sum_sequence(book: &AgentBook, submitter: &AccountId, responders: &[AccountId]) -> u64 {
    book.sequence(submitter)
        .iter()
        .map(|slot| sum_cell(slot, responders))
        .sum()
}

fn sum_cell(slot: &FeedbackSlot, responders: &[AccountId]) -> u64 {
    responders
        .iter()
        .filter_map(|responder| slot.responses.get(responder))
        .sum()
}
