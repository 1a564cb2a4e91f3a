//! Feedback Ledger Lifecycle Demo
//!
//! Registers an agent, records feedback from two clients, attaches a response,
//! revokes one item and prints the read-time aggregates after each step.
//!
//! Usage: `feedback-lifecycle [ledger.toml]`

use anyhow::Context;
use colored::*;
use reputation_identity::InMemoryIdentityRegistry;
use reputation_ledger::{FeedbackLedger, LedgerConfig};
use reputation_types::{
    AccountId, AgentId, ContentHash, FeedbackIndex, FeedbackSubmission, ResponseScope,
    ResponseSubmission,
};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => LedgerConfig::load(&path)
            .with_context(|| format!("loading ledger config from {path}"))?,
        None => LedgerConfig::default(),
    };

    let registry = Arc::new(InMemoryIdentityRegistry::new());
    let agent = registry
        .register(AccountId::from("agent-owner"))
        .context("registering agent")?
        .agent_id;
    let ledger = FeedbackLedger::with_config(registry, config)?;

    println!("{}", "Feedback Ledger Lifecycle".cyan().bold());
    println!();

    let alice = AccountId::from("alice");
    let bob = AccountId::from("bob");

    section("1. Clients submit feedback");
    for (who, score) in [(&alice, 90), (&alice, 85), (&bob, 70)] {
        let index = ledger.submit_feedback(
            who,
            FeedbackSubmission::new(agent, score)
                .with_tags("quality", "speed")
                .with_endpoint("https://agent.example/api")
                .with_uri("ipfs://feedback", ContentHash([score; 32])),
        )?;
        println!("  {} scored {} -> {}", who, score, index);
    }
    print_summary(&ledger, agent)?;

    section("2. Rejected submissions");
    for (label, result) in [
        (
            "score 101",
            ledger.submit_feedback(&bob, FeedbackSubmission::new(agent, 101)),
        ),
        (
            "unknown agent",
            ledger.submit_feedback(&bob, FeedbackSubmission::new(AgentId::new(999), 50)),
        ),
    ] {
        match result {
            Ok(index) => println!("  {} unexpectedly accepted as {}", label, index),
            Err(err) => println!("  {} {}: {}", "✗".red(), label, err),
        }
    }

    section("3. Agent owner responds to alice #1");
    let owner = AccountId::from("agent-owner");
    ledger.append_response(
        &owner,
        ResponseSubmission::new(agent, alice.clone(), FeedbackIndex::new(1), "ipfs://reply"),
    )?;
    let count = ledger.get_response_count(agent, &ResponseScope::Agent, &[owner.clone()])?;
    let unnamed = ledger.get_response_count(agent, &ResponseScope::Agent, &[])?;
    println!("  responses by owner: {}", count);
    println!("  responses with no responder filter: {}", unnamed);

    section("4. Alice revokes #1");
    ledger.revoke_feedback(&alice, agent, FeedbackIndex::new(1))?;
    print_summary(&ledger, agent)?;

    section("5. Full listing (including revoked)");
    let listing = ledger.read_all_feedback(agent, &[], "", "", true)?;
    for row in listing.rows() {
        let status = if row.revoked {
            "revoked".red()
        } else {
            "active".green()
        };
        println!(
            "  {:<6} {:<3} score={:<3} {}/{} {}",
            row.submitter, row.index, row.score, row.tag1, row.tag2, status
        );
    }

    section("6. Event journal");
    for entry in ledger.event_journal() {
        println!(
            "  {:>2} {:<18} {}",
            entry.sequence,
            entry.event.kind(),
            &entry.hash[..16]
        );
    }
    println!(
        "  journal intact: {}",
        ledger.verify_event_journal().is_intact()
    );
    println!(
        "  statistics: {}",
        serde_json::to_string(&ledger.statistics()?)?
    );

    Ok(())
}

fn section(title: &str) {
    println!();
    println!("{}", title.yellow().bold());
}

fn print_summary(ledger: &FeedbackLedger, agent: AgentId) -> anyhow::Result<()> {
    let summary = ledger.get_summary(agent, &[], "", "")?;
    println!(
        "  summary: count={} average={}  clients={:?}",
        summary.count,
        summary.average_score,
        ledger
            .get_clients(agent)?
            .iter()
            .map(AccountId::as_str)
            .collect::<Vec<_>>()
    );
    Ok(())
}
