//! Reputation Ledger - permissionless feedback storage with read-time aggregation.
//!
//! Any caller may score an existing agent, revoke their own feedback, and
//! respond to anyone's feedback. The ledger keeps:
//! - a gapless, 1-based feedback sequence per `(agent, submitter)` pair
//! - a deduplicated, first-submission-ordered roster of submitters per agent
//! - per-responder response counters per feedback item
//!
//! Summaries, listings and response counts are computed on demand by walking
//! these indices; nothing is aggregated on the write path.

#![deny(unsafe_code)]

mod config;
mod error;
mod event_bus;
mod ledger;
mod query;
mod state;

pub use config::{ConfigError, LedgerConfig};
pub use error::{LedgerError, LedgerResult};
pub use event_bus::{EventBus, JournalVerification, JournaledEvent};
pub use ledger::FeedbackLedger;
pub use query::LedgerStatistics;
