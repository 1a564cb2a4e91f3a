//! Event bus for ledger notifications
//!
//! Live subscribers receive events over a broadcast channel. Optionally every
//! event is also kept in a BLAKE3 hash-linked journal so indexers can replay
//! and audit the stream.

use crate::config::LedgerConfig;
use chrono::{DateTime, Utc};
use reputation_types::LedgerEvent;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::warn;

/// A published event together with its position in the hash chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournaledEvent {
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: LedgerEvent,
    pub previous_hash: Option<String>,
    pub hash: String,
}

/// Result of re-deriving the journal's hash chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JournalVerification {
    Intact { entries: usize },
    Broken { sequence: u64, reason: String },
}

impl JournalVerification {
    pub fn is_intact(&self) -> bool {
        matches!(self, Self::Intact { .. })
    }
}

#[derive(Default)]
struct Journal {
    entries: VecDeque<JournaledEvent>,
    next_sequence: u64,
    last_hash: Option<String>,
}

/// Publishes ledger events to subscribers and the journal
pub struct EventBus {
    sender: broadcast::Sender<LedgerEvent>,
    journal: Option<Mutex<Journal>>,
    journal_limit: Option<usize>,
}

impl EventBus {
    /// Create a bus sized by `config`
    pub fn new(config: &LedgerConfig) -> Self {
        let (sender, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            sender,
            journal: config
                .journal_events
                .then(|| Mutex::new(Journal::default())),
            journal_limit: config.journal_limit,
        }
    }

    /// Publish an event. Never fails: missing subscribers are ignored and a
    /// journal that cannot be written is logged and skipped.
    pub fn publish(&self, event: LedgerEvent) {
        if let Some(journal) = &self.journal {
            match journal.lock() {
                Ok(mut journal) => self.append(&mut journal, &event),
                Err(_) => warn!(event = event.kind(), "Event journal lock poisoned"),
            }
        }

        // Broadcast (ignore errors if no receivers)
        let _ = self.sender.send(event);
    }

    fn append(&self, journal: &mut Journal, event: &LedgerEvent) {
        let sequence = journal.next_sequence + 1;
        let recorded_at = Utc::now();
        let hash = match compute_event_hash(
            event,
            journal.last_hash.as_deref(),
            sequence,
            recorded_at,
        ) {
            Ok(hash) => hash,
            Err(err) => {
                warn!(event = event.kind(), error = %err, "Failed to hash journal entry");
                return;
            }
        };

        journal.entries.push_back(JournaledEvent {
            sequence,
            recorded_at,
            event: event.clone(),
            previous_hash: journal.last_hash.clone(),
            hash: hash.clone(),
        });
        journal.next_sequence = sequence;
        journal.last_hash = Some(hash);

        if let Some(limit) = self.journal_limit {
            while journal.entries.len() > limit {
                journal.entries.pop_front();
            }
        }
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Retained journal entries, oldest first
    pub fn journal(&self) -> Vec<JournaledEvent> {
        self.journal
            .as_ref()
            .and_then(|j| j.lock().ok().map(|j| j.entries.iter().cloned().collect()))
            .unwrap_or_default()
    }

    /// Hash of the most recent journal entry
    pub fn latest_hash(&self) -> Option<String> {
        self.journal
            .as_ref()
            .and_then(|j| j.lock().ok().and_then(|j| j.last_hash.clone()))
    }

    /// Re-derive every retained hash and check the links between entries.
    ///
    /// The first retained entry's `previous_hash` is taken as given, since
    /// older entries may have been dropped by the journal limit.
    pub fn verify_journal(&self) -> JournalVerification {
        let entries = self.journal();
        let mut expected_previous: Option<Option<String>> = None;

        for entry in &entries {
            if let Some(previous) = &expected_previous {
                if *previous != entry.previous_hash {
                    return JournalVerification::Broken {
                        sequence: entry.sequence,
                        reason: "previous hash does not match preceding entry".to_string(),
                    };
                }
            }

            match compute_event_hash(
                &entry.event,
                entry.previous_hash.as_deref(),
                entry.sequence,
                entry.recorded_at,
            ) {
                Ok(hash) if hash == entry.hash => {}
                Ok(_) => {
                    return JournalVerification::Broken {
                        sequence: entry.sequence,
                        reason: "entry hash mismatch".to_string(),
                    }
                }
                Err(err) => {
                    return JournalVerification::Broken {
                        sequence: entry.sequence,
                        reason: err.to_string(),
                    }
                }
            }

            expected_previous = Some(Some(entry.hash.clone()));
        }

        JournalVerification::Intact {
            entries: entries.len(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}

fn compute_event_hash(
    event: &LedgerEvent,
    previous_hash: Option<&str>,
    sequence: u64,
    recorded_at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    let serializable = serde_json::json!({
        "previous_hash": previous_hash,
        "sequence": sequence,
        "recorded_at": recorded_at,
        "event": event,
    });
    let serialized = serde_json::to_vec(&serializable)?;
    Ok(blake3::hash(&serialized).to_hex().to_string())
}
