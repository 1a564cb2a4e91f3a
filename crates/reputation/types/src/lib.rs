//! # Reputation Types
//!
//! Shared vocabulary for the permissionless feedback ledger.
//!
//! ## Module Organization
//!
//! - [`ids`]: Agent, account and feedback index identifiers
//! - [`feedback`]: Scores, feedback records and submissions
//! - [`query`]: Summary, listing and response-count shapes
//! - [`event`]: Domain events published by the ledger

#![deny(unsafe_code)]

pub mod event;
pub mod feedback;
pub mod ids;
pub mod query;

pub use event::LedgerEvent;
pub use feedback::{
    ContentHash, FeedbackRecord, FeedbackSubmission, ResponseSubmission, Score, ScoreError,
    MAX_SCORE,
};
pub use ids::{AccountId, AgentId, FeedbackIndex};
pub use query::{FeedbackListing, FeedbackRow, FeedbackSummary, ResponseScope};
