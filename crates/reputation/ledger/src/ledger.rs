use crate::config::{ConfigError, LedgerConfig};
use crate::error::{LedgerError, LedgerResult};
use crate::event_bus::{EventBus, JournalVerification, JournaledEvent};
use crate::query::{LedgerStatistics, RecordFilter};
use crate::state::LedgerState;
use reputation_identity::IdentityGate;
use reputation_types::{
    AccountId, AgentId, FeedbackIndex, FeedbackListing, FeedbackRecord, FeedbackSubmission,
    FeedbackSummary, LedgerEvent, ResponseScope, ResponseSubmission, Score,
};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// The permissionless feedback ledger.
///
/// All index state sits behind one `RwLock`. Writes hold the write guard for
/// the whole mutation and the event publish, so index allocation per
/// `(agent, submitter)` is serialized and readers never see half a write.
/// Reads hold the read guard for their entire walk.
pub struct FeedbackLedger {
    gate: Arc<dyn IdentityGate>,
    state: RwLock<LedgerState>,
    events: EventBus,
    config: LedgerConfig,
}

impl FeedbackLedger {
    /// Create a ledger with default configuration
    pub fn new(gate: Arc<dyn IdentityGate>) -> Self {
        let config = LedgerConfig::default();
        Self {
            gate,
            state: RwLock::new(LedgerState::default()),
            events: EventBus::new(&config),
            config,
        }
    }

    /// Create a ledger with explicit configuration
    pub fn with_config(gate: Arc<dyn IdentityGate>, config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            gate,
            state: RwLock::new(LedgerState::default()),
            events: EventBus::new(&config),
            config,
        })
    }

    /// The identity gate consulted on submission
    pub fn identity_gate(&self) -> Arc<dyn IdentityGate> {
        Arc::clone(&self.gate)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, LedgerState>> {
        self.state
            .read()
            .map_err(|_| LedgerError::LockPoisoned("ledger state".to_string()))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state
            .write()
            .map_err(|_| LedgerError::LockPoisoned("ledger state".to_string()))
    }

    // ── Writes ──────────────────────────────────────────────────────────

    /// Record feedback from `caller` about an existing agent.
    ///
    /// Anyone may submit; there is no authorization check. Returns the index
    /// assigned within the caller's sequence for that agent.
    pub fn submit_feedback(
        &self,
        caller: &AccountId,
        submission: FeedbackSubmission,
    ) -> LedgerResult<FeedbackIndex> {
        let agent = submission.agent;

        let score = Score::new(submission.score).map_err(|err| {
            warn!(agent = %agent, submitter = %caller, score = submission.score, "Feedback rejected: invalid score");
            LedgerError::from(err)
        })?;

        if !self.gate.exists(agent) {
            warn!(agent = %agent, submitter = %caller, "Feedback rejected: unknown agent");
            return Err(LedgerError::AgentNotFound(agent));
        }

        let mut state = self.write()?;
        let feedback_index = state.append_feedback(
            agent,
            caller,
            FeedbackRecord {
                score,
                tag1: submission.tag1.clone(),
                tag2: submission.tag2.clone(),
                revoked: false,
            },
        );

        self.events.publish(LedgerEvent::NewFeedback {
            agent,
            submitter: caller.clone(),
            feedback_index,
            score,
            tag1: submission.tag1,
            tag2: submission.tag2,
            endpoint: submission.endpoint,
            uri: submission.uri,
            content_hash: submission.content_hash,
        });

        info!(
            agent = %agent,
            submitter = %caller,
            index = %feedback_index,
            score = %score,
            "Feedback recorded"
        );

        Ok(feedback_index)
    }

    /// Revoke one of the caller's own feedback records.
    pub fn revoke_feedback(
        &self,
        caller: &AccountId,
        agent: AgentId,
        feedback_index: FeedbackIndex,
    ) -> LedgerResult<()> {
        let mut state = self.write()?;
        if let Err(err) = state.revoke(agent, caller, feedback_index) {
            warn!(agent = %agent, submitter = %caller, index = %feedback_index, error = %err, "Revocation rejected");
            return Err(err);
        }

        self.events.publish(LedgerEvent::FeedbackRevoked {
            agent,
            submitter: caller.clone(),
            feedback_index,
        });

        info!(agent = %agent, submitter = %caller, index = %feedback_index, "Feedback revoked");
        Ok(())
    }

    /// Attach a response from `caller` to someone's feedback item.
    ///
    /// Returns the caller's response count on that item after the append.
    pub fn append_response(
        &self,
        caller: &AccountId,
        response: ResponseSubmission,
    ) -> LedgerResult<u64> {
        let ResponseSubmission {
            agent,
            submitter,
            feedback_index,
            response_uri,
            response_hash,
        } = response;

        let mut state = self.write()?;

        // Index is validated before the URI.
        let last_index = state.last_index(agent, &submitter);
        if !feedback_index.within(last_index) {
            warn!(agent = %agent, submitter = %submitter, index = %feedback_index, responder = %caller, "Response rejected: invalid index");
            return Err(LedgerError::InvalidIndex {
                agent,
                submitter,
                index: feedback_index,
                last_index,
            });
        }
        if response_uri.is_empty() {
            warn!(agent = %agent, submitter = %submitter, index = %feedback_index, responder = %caller, "Response rejected: empty URI");
            return Err(LedgerError::EmptyUri);
        }

        let count = state.record_response(agent, &submitter, feedback_index, caller)?;

        info!(
            agent = %agent,
            submitter = %submitter,
            index = %feedback_index,
            responder = %caller,
            count,
            "Response appended"
        );

        self.events.publish(LedgerEvent::ResponseAppended {
            agent,
            submitter,
            feedback_index,
            responder: caller.clone(),
            response_uri,
            response_hash,
        });

        Ok(count)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// Count and average score of non-revoked feedback matching the filters.
    ///
    /// With an empty `submitters` list the whole roster is walked, which is
    /// unbounded; high-traffic agents should be queried with a submitter list.
    pub fn get_summary(
        &self,
        agent: AgentId,
        submitters: &[AccountId],
        tag1: &str,
        tag2: &str,
    ) -> LedgerResult<FeedbackSummary> {
        let state = self.read()?;
        let summary = state.summary(agent, submitters, tag1, tag2);
        debug!(
            agent = %agent,
            submitters = submitters.len(),
            matched = summary.count,
            "Summary computed"
        );
        Ok(summary)
    }

    /// Point lookup of one record.
    pub fn read_feedback(
        &self,
        agent: AgentId,
        submitter: &AccountId,
        feedback_index: FeedbackIndex,
    ) -> LedgerResult<FeedbackRecord> {
        let state = self.read()?;
        state
            .slot(agent, submitter, feedback_index)
            .map(|slot| slot.record.clone())
    }

    /// Enumerate matching feedback as index-aligned parallel arrays.
    pub fn read_all_feedback(
        &self,
        agent: AgentId,
        submitters: &[AccountId],
        tag1: &str,
        tag2: &str,
        include_revoked: bool,
    ) -> LedgerResult<FeedbackListing> {
        let state = self.read()?;
        let listing = state.listing(
            agent,
            submitters,
            RecordFilter {
                tag1,
                tag2,
                include_revoked,
            },
        );
        debug!(
            agent = %agent,
            submitters = submitters.len(),
            rows = listing.len(),
            "Feedback enumerated"
        );
        Ok(listing)
    }

    /// Sum the given responders' counters over `scope`.
    ///
    /// Returns 0 when `responders` is empty, even if responses exist: there is
    /// no counter aggregated across responders.
    pub fn get_response_count(
        &self,
        agent: AgentId,
        scope: &ResponseScope,
        responders: &[AccountId],
    ) -> LedgerResult<u64> {
        let state = self.read()?;
        Ok(state.response_count(agent, scope, responders))
    }

    /// Submitters who have given feedback to `agent`, in first-submission order.
    pub fn get_clients(&self, agent: AgentId) -> LedgerResult<Vec<AccountId>> {
        let state = self.read()?;
        Ok(state
            .book(agent)
            .map(|book| book.roster.clone())
            .unwrap_or_default())
    }

    /// High-water mark of the `(agent, submitter)` sequence; 0 if never used.
    pub fn get_last_index(&self, agent: AgentId, submitter: &AccountId) -> LedgerResult<u64> {
        let state = self.read()?;
        Ok(state.last_index(agent, submitter))
    }

    /// Totals across the whole ledger, computed by walking state.
    pub fn statistics(&self) -> LedgerResult<LedgerStatistics> {
        let state = self.read()?;
        Ok(state.statistics())
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Subscribe to events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Journaled events, oldest first
    pub fn event_journal(&self) -> Vec<JournaledEvent> {
        self.events.journal()
    }

    /// Check the journal's hash chain
    pub fn verify_event_journal(&self) -> JournalVerification {
        self.events.verify_journal()
    }
}
