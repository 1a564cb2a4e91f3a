//! End-to-end ledger scenarios across the identity gate, writes, reads and events.

use reputation_identity::InMemoryIdentityRegistry;
use reputation_ledger::{FeedbackLedger, LedgerError};
use reputation_types::{
    AccountId, AgentId, ContentHash, FeedbackIndex, FeedbackSubmission, FeedbackSummary,
    LedgerEvent, ResponseScope, ResponseSubmission,
};
use std::sync::Arc;
use std::thread;

fn setup() -> (FeedbackLedger, Arc<InMemoryIdentityRegistry>, AgentId) {
    let registry = Arc::new(InMemoryIdentityRegistry::new());
    let agent = registry
        .register(AccountId::from("agent-owner"))
        .expect("register agent")
        .agent_id;
    let ledger = FeedbackLedger::new(registry.clone());
    (ledger, registry, agent)
}

fn summary(count: u64, average_score: u8) -> FeedbackSummary {
    FeedbackSummary {
        count,
        average_score,
    }
}

#[test]
fn submit_read_revoke_summarize() {
    let (ledger, _, agent) = setup();
    let alice = AccountId::from("alice");

    ledger
        .submit_feedback(
            &alice,
            FeedbackSubmission::new(agent, 90).with_tags("quality", "speed"),
        )
        .expect("first feedback");
    ledger
        .submit_feedback(
            &alice,
            FeedbackSubmission::new(agent, 85).with_tags("quality", "speed"),
        )
        .expect("second feedback");

    assert_eq!(ledger.get_last_index(agent, &alice).unwrap(), 2);

    let first = ledger
        .read_feedback(agent, &alice, FeedbackIndex::new(1))
        .unwrap();
    assert_eq!(
        (first.score.value(), first.tag1.as_str(), first.tag2.as_str(), first.revoked),
        (90, "quality", "speed", false)
    );

    ledger
        .revoke_feedback(&alice, agent, FeedbackIndex::new(1))
        .expect("revoke");
    assert_eq!(ledger.get_summary(agent, &[], "", "").unwrap(), summary(1, 85));
}

#[test]
fn summary_over_two_submitters_with_tag_filter() {
    let (ledger, _, agent) = setup();
    let alice = AccountId::from("alice");
    let bob = AccountId::from("bob");

    ledger
        .submit_feedback(
            &alice,
            FeedbackSubmission::new(agent, 90).with_tags("quality", ""),
        )
        .unwrap();
    ledger
        .submit_feedback(&bob, FeedbackSubmission::new(agent, 80).with_tags("price", ""))
        .unwrap();

    assert_eq!(ledger.get_summary(agent, &[], "", "").unwrap(), summary(2, 85));
    assert_eq!(
        ledger.get_summary(agent, &[], "quality", "").unwrap(),
        summary(1, 90)
    );
    assert_eq!(
        ledger.get_summary(agent, &[bob.clone()], "", "").unwrap(),
        summary(1, 80)
    );
    assert_eq!(
        ledger.get_summary(agent, &[], "missing", "").unwrap(),
        summary(0, 0)
    );
}

#[test]
fn duplicate_submitters_in_filter_are_walked_twice() {
    let (ledger, _, agent) = setup();
    let alice = AccountId::from("alice");
    ledger
        .submit_feedback(&alice, FeedbackSubmission::new(agent, 60))
        .unwrap();

    let filter = vec![alice.clone(), alice];
    assert_eq!(ledger.get_summary(agent, &filter, "", "").unwrap(), summary(2, 60));
    assert_eq!(
        ledger
            .read_all_feedback(agent, &filter, "", "", false)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn empty_tag_filter_means_no_filter() {
    // Documented ambiguity: an empty filter cannot select only untagged records.
    let (ledger, _, agent) = setup();
    let alice = AccountId::from("alice");
    ledger
        .submit_feedback(&alice, FeedbackSubmission::new(agent, 40))
        .unwrap();
    ledger
        .submit_feedback(
            &alice,
            FeedbackSubmission::new(agent, 60).with_tags("quality", "speed"),
        )
        .unwrap();

    assert_eq!(ledger.get_summary(agent, &[], "", "").unwrap(), summary(2, 50));
    let listing = ledger.read_all_feedback(agent, &[], "", "", true).unwrap();
    assert_eq!(listing.tag1s, vec!["".to_string(), "quality".to_string()]);
}

#[test]
fn revoke_touches_only_the_target_record() {
    let (ledger, _, agent) = setup();
    let alice = AccountId::from("alice");
    let bob = AccountId::from("bob");
    for score in [10, 20, 30] {
        ledger
            .submit_feedback(&alice, FeedbackSubmission::new(agent, score).with_tags("t", "u"))
            .unwrap();
    }
    ledger
        .submit_feedback(&bob, FeedbackSubmission::new(agent, 40))
        .unwrap();

    let before = ledger.read_all_feedback(agent, &[], "", "", true).unwrap();
    ledger
        .revoke_feedback(&alice, agent, FeedbackIndex::new(2))
        .unwrap();
    let after = ledger.read_all_feedback(agent, &[], "", "", true).unwrap();

    assert_eq!(before.len(), after.len());
    for (k, (b, a)) in before.rows().zip(after.rows()).enumerate() {
        assert_eq!(b.submitter, a.submitter);
        assert_eq!(b.index, a.index);
        assert_eq!(b.score, a.score);
        assert_eq!(b.tag1, a.tag1);
        assert_eq!(b.tag2, a.tag2);
        assert_eq!(a.revoked, k == 1, "row {k}");
    }

    assert_eq!(
        ledger.revoke_feedback(&alice, agent, FeedbackIndex::new(2)),
        Err(LedgerError::AlreadyRevoked {
            agent,
            submitter: alice.clone(),
            index: FeedbackIndex::new(2),
        })
    );
}

#[test]
fn submitters_cannot_revoke_each_other() {
    let (ledger, _, agent) = setup();
    let alice = AccountId::from("alice");
    let mallory = AccountId::from("mallory");
    ledger
        .submit_feedback(&alice, FeedbackSubmission::new(agent, 90))
        .unwrap();

    let result = ledger.revoke_feedback(&mallory, agent, FeedbackIndex::new(1));
    assert!(matches!(result, Err(LedgerError::InvalidIndex { last_index: 0, .. })));
    assert!(
        !ledger
            .read_feedback(agent, &alice, FeedbackIndex::new(1))
            .unwrap()
            .revoked
    );
    assert!(matches!(
        ledger.revoke_feedback(&alice, agent, FeedbackIndex::new(0)),
        Err(LedgerError::InvalidIndex { .. })
    ));
}

#[test]
fn response_counts_require_named_responders() {
    let (ledger, _, agent) = setup();
    let alice = AccountId::from("alice");
    let bob = AccountId::from("bob");
    let owner = AccountId::from("agent-owner");
    let auditor = AccountId::from("auditor");

    ledger
        .submit_feedback(&alice, FeedbackSubmission::new(agent, 30))
        .unwrap();
    ledger
        .submit_feedback(&alice, FeedbackSubmission::new(agent, 35))
        .unwrap();
    ledger
        .submit_feedback(&bob, FeedbackSubmission::new(agent, 95))
        .unwrap();

    let respond = |responder: &AccountId, submitter: &AccountId, index: u64| {
        ledger
            .append_response(
                responder,
                ResponseSubmission::new(
                    agent,
                    submitter.clone(),
                    FeedbackIndex::new(index),
                    "ipfs://response",
                )
                .with_hash(ContentHash([7u8; 32])),
            )
            .unwrap()
    };
    assert_eq!(respond(&owner, &alice, 1), 1);
    assert_eq!(respond(&owner, &alice, 1), 2);
    respond(&owner, &alice, 2);
    respond(&auditor, &alice, 2);
    respond(&owner, &bob, 1);

    let scopes = [
        ResponseScope::Agent,
        ResponseScope::Submitter(alice.clone()),
        ResponseScope::Feedback(alice.clone(), FeedbackIndex::new(1)),
    ];
    for scope in &scopes {
        assert_eq!(ledger.get_response_count(agent, scope, &[]).unwrap(), 0);
    }

    let everyone = vec![owner.clone(), auditor.clone()];
    assert_eq!(
        ledger
            .get_response_count(agent, &ResponseScope::Agent, &everyone)
            .unwrap(),
        5
    );
    assert_eq!(
        ledger
            .get_response_count(agent, &ResponseScope::Submitter(alice.clone()), &everyone)
            .unwrap(),
        4
    );
    assert_eq!(
        ledger
            .get_response_count(
                agent,
                &ResponseScope::Feedback(alice.clone(), FeedbackIndex::new(2)),
                &[auditor]
            )
            .unwrap(),
        1
    );
    assert_eq!(
        ledger
            .get_response_count(agent, &ResponseScope::Submitter(bob), &[owner])
            .unwrap(),
        1
    );
}

#[test]
fn retired_agents_stop_accepting_feedback_but_keep_history() {
    let (ledger, registry, agent) = setup();
    let alice = AccountId::from("alice");
    ledger
        .submit_feedback(&alice, FeedbackSubmission::new(agent, 75))
        .unwrap();

    registry.retire(agent).unwrap();

    assert_eq!(
        ledger.submit_feedback(&alice, FeedbackSubmission::new(agent, 80)),
        Err(LedgerError::AgentNotFound(agent))
    );
    assert_eq!(ledger.get_last_index(agent, &alice).unwrap(), 1);
    assert_eq!(ledger.get_summary(agent, &[], "", "").unwrap(), summary(1, 75));
    ledger
        .revoke_feedback(&alice, agent, FeedbackIndex::new(1))
        .expect("revocation does not consult the gate");
}

#[test]
fn events_follow_successful_writes_only() {
    let (ledger, _, agent) = setup();
    let mut rx = ledger.subscribe();
    let alice = AccountId::from("alice");
    let bob = AccountId::from("bob");
    let hash = ContentHash([1u8; 32]);

    ledger
        .submit_feedback(
            &alice,
            FeedbackSubmission::new(agent, 88)
                .with_tags("quality", "speed")
                .with_endpoint("https://agent.example/api")
                .with_uri("ipfs://feedback", hash),
        )
        .unwrap();
    let _ = ledger.submit_feedback(&alice, FeedbackSubmission::new(agent, 101));
    let _ = ledger.revoke_feedback(&alice, agent, FeedbackIndex::new(5));
    ledger
        .append_response(
            &bob,
            ResponseSubmission::new(agent, alice.clone(), FeedbackIndex::new(1), "ipfs://r"),
        )
        .unwrap();
    ledger
        .revoke_feedback(&alice, agent, FeedbackIndex::new(1))
        .unwrap();

    assert_eq!(
        rx.try_recv().unwrap(),
        LedgerEvent::NewFeedback {
            agent,
            submitter: alice.clone(),
            feedback_index: FeedbackIndex::new(1),
            score: reputation_types::Score::new(88).unwrap(),
            tag1: "quality".into(),
            tag2: "speed".into(),
            endpoint: "https://agent.example/api".into(),
            uri: "ipfs://feedback".into(),
            content_hash: hash,
        }
    );
    assert_eq!(
        rx.try_recv().unwrap(),
        LedgerEvent::ResponseAppended {
            agent,
            submitter: alice.clone(),
            feedback_index: FeedbackIndex::new(1),
            responder: bob,
            response_uri: "ipfs://r".into(),
            response_hash: ContentHash::ZERO,
        }
    );
    assert_eq!(
        rx.try_recv().unwrap(),
        LedgerEvent::FeedbackRevoked {
            agent,
            submitter: alice,
            feedback_index: FeedbackIndex::new(1),
        }
    );
    assert!(rx.try_recv().is_err());

    let journal = ledger.event_journal();
    let kinds: Vec<_> = journal.iter().map(|e| e.event.kind()).collect();
    assert_eq!(
        kinds,
        vec!["new_feedback", "response_appended", "feedback_revoked"]
    );
    assert!(ledger.verify_event_journal().is_intact());
}

#[test]
fn concurrent_submitters_get_gapless_sequences() {
    let (ledger, _, agent) = setup();
    let ledger = Arc::new(ledger);
    let per_thread = 50u64;

    let handles: Vec<_> = (0..4)
        .flat_map(|who| (0..2).map(move |copy| (who, copy)))
        .map(|(who, _)| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let submitter = AccountId::new(format!("submitter-{who}"));
                (0..per_thread)
                    .map(|i| {
                        ledger
                            .submit_feedback(
                                &submitter,
                                FeedbackSubmission::new(agent, (i % 101) as u8),
                            )
                            .expect("submit")
                            .value()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut by_submitter: std::collections::HashMap<u64, Vec<u64>> = Default::default();
    for (n, handle) in handles.into_iter().enumerate() {
        let who = (n / 2) as u64;
        by_submitter
            .entry(who)
            .or_default()
            .extend(handle.join().expect("thread"));
    }

    // Two threads share each submitter; together they must cover 1..=2N exactly once.
    for (who, mut indices) in by_submitter {
        indices.sort_unstable();
        let expected: Vec<u64> = (1..=2 * per_thread).collect();
        assert_eq!(indices, expected, "submitter-{who}");
        assert_eq!(
            ledger
                .get_last_index(agent, &AccountId::new(format!("submitter-{who}")))
                .unwrap(),
            2 * per_thread
        );
    }

    let clients = ledger.get_clients(agent).unwrap();
    assert_eq!(clients.len(), 4);
    assert_eq!(ledger.statistics().unwrap().feedback_total, 8 * per_thread);
}
