//! Reputation Identity - the agent existence gate
//!
//! The feedback ledger needs exactly one thing from the identity subsystem:
//! an answer to "does agent X exist?". This crate defines that contract and a
//! small in-memory registry that satisfies it. Ownership, transfer and agent
//! metadata live elsewhere.

#![deny(unsafe_code)]

use reputation_types::{AccountId, AgentId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{info, warn};

/// Agent existence oracle.
///
/// Implementations must be side-effect free; the ledger calls `exists` once per
/// submission and trusts the answer.
pub trait IdentityGate: Send + Sync {
    fn exists(&self, agent: AgentId) -> bool;
}

impl<G: IdentityGate + ?Sized> IdentityGate for Arc<G> {
    fn exists(&self, agent: AgentId) -> bool {
        (**self).exists(agent)
    }
}

/// Adapter turning a predicate into a gate.
pub struct FnIdentityGate<F>(pub F);

impl<F> IdentityGate for FnIdentityGate<F>
where
    F: Fn(AgentId) -> bool + Send + Sync,
{
    fn exists(&self, agent: AgentId) -> bool {
        (self.0)(agent)
    }
}

/// In-memory agent registry
pub struct InMemoryIdentityRegistry {
    inner: RwLock<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    agents: BTreeMap<AgentId, RegisteredAgent>,
}

impl InMemoryIdentityRegistry {
    /// Create an empty registry; the first agent gets id 0
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryState::default()),
        }
    }

    /// Register a new agent owned by `owner`
    pub fn register(&self, owner: AccountId) -> Result<RegisteredAgent, IdentityError> {
        let mut state = self.inner.write().map_err(|_| IdentityError::LockError)?;

        let agent_id = AgentId::new(state.next_id);
        state.next_id += 1;

        let agent = RegisteredAgent {
            agent_id,
            owner,
            status: AgentStatus::Active,
            registered_at: chrono::Utc::now(),
        };
        state.agents.insert(agent_id, agent.clone());

        info!(agent = %agent_id, owner = %agent.owner, "Agent registered");
        Ok(agent)
    }

    /// Lookup an agent by id
    pub fn lookup(&self, agent_id: AgentId) -> Result<Option<RegisteredAgent>, IdentityError> {
        let state = self.inner.read().map_err(|_| IdentityError::LockError)?;
        Ok(state.agents.get(&agent_id).cloned())
    }

    /// Retire an agent; retired agents no longer pass the gate
    pub fn retire(&self, agent_id: AgentId) -> Result<(), IdentityError> {
        let mut state = self.inner.write().map_err(|_| IdentityError::LockError)?;

        let agent = state
            .agents
            .get_mut(&agent_id)
            .ok_or(IdentityError::NotFound(agent_id))?;
        agent.status = AgentStatus::Retired;

        info!(agent = %agent_id, "Agent retired");
        Ok(())
    }

    /// Number of agents ever registered
    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.agents.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryIdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityGate for InMemoryIdentityRegistry {
    fn exists(&self, agent: AgentId) -> bool {
        match self.lookup(agent) {
            Ok(found) => found.is_some_and(|a| a.status == AgentStatus::Active),
            Err(err) => {
                warn!(agent = %agent, error = %err, "Identity lookup failed");
                false
            }
        }
    }
}

/// A registered agent
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisteredAgent {
    pub agent_id: AgentId,
    pub owner: AccountId,
    pub status: AgentStatus,
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

/// Status of an agent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentStatus {
    Active,
    Retired,
}

/// Identity-related errors
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Agent not found: {0}")]
    NotFound(AgentId),

    #[error("Lock error")]
    LockError,
}
