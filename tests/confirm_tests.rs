use std::sync::Arc;

use rolodex::confirm::{
    parse_decisions, render_confirmation_text, ConvKey, Decision, MemoryPendingStore,
    Orchestrator, PendingConfirmation, PendingStore,
};
use rolodex::error::CrmError;
use rolodex::store::{ContactDB, ContactRecord};
use rolodex::SharedDB;

fn test_db() -> SharedDB {
    Arc::new(ContactDB::open(":memory:").expect("in-memory db"))
}

fn named(name: &str) -> ContactRecord {
    ContactRecord {
        name: Some(name.into()),
        ..Default::default()
    }
}

fn pending(name: &str, suggested: &str) -> PendingConfirmation {
    PendingConfirmation {
        record: named(name),
        suggested_name: suggested.into(),
    }
}

fn setup() -> (SharedDB, Arc<MemoryPendingStore>, Orchestrator) {
    let db = test_db();
    let store = Arc::new(MemoryPendingStore::default());
    let orch = Orchestrator::new(db.clone(), store.clone());
    (db, store, orch)
}

fn key() -> ConvKey {
    ConvKey::new("slack", "U123")
}

#[test]
fn render_single_item_exact_text() {
    let p = vec![pending("Jane Roe", "Jane Doe")];
    assert_eq!(
        render_confirmation_text(&p),
        "Did you mean Jane Doe?\n\nReply like: 'yes' or 'no'."
    );
}

#[test]
fn render_multiple_items() {
    let p = vec![pending("Jon Smith", "John Smith"), pending("Jane Roe", "Jane Doe")];
    assert_eq!(
        render_confirmation_text(&p),
        "Did you mean John Smith?\n\nDid you mean Jane Doe?\n\nReply like: 'yes, no' (in order)."
    );
}

#[test]
fn parse_positional_and_explicit_forms() {
    let explicit = parse_decisions("1 yes, 2 no");
    assert_eq!(explicit.get(&0), Some(&Decision::Yes));
    assert_eq!(explicit.get(&1), Some(&Decision::No));

    let positional = parse_decisions("yes, no");
    assert_eq!(positional, explicit);

    let newlines = parse_decisions("y\nn");
    assert_eq!(newlines.get(&0), Some(&Decision::Yes));
    assert_eq!(newlines.get(&1), Some(&Decision::No));
}

#[test]
fn parse_ignores_garbage_tokens() {
    let decisions = parse_decisions("maybe, no");
    // "maybe" records nothing at position 0; "no" still lands at its index
    assert_eq!(decisions.get(&0), None);
    assert_eq!(decisions.get(&1), Some(&Decision::No));

    assert!(parse_decisions("").is_empty());
    assert!(parse_decisions("what? who?").is_empty());
    // positions are 1-based; "0 yes" matches nothing
    assert!(parse_decisions("0 yes").is_empty());
}

#[tokio::test]
async fn fuzzy_record_is_parked_then_merged_on_yes() {
    let (db, store, orch) = setup();
    db.upsert(&named("John Smith"), false).unwrap();

    let replies = orch
        .resolve_batch(&key(), vec![named("Jon Smith")])
        .await
        .unwrap();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("Did you mean John Smith?"));
    assert_eq!(store.get(&key()).map(|p| p.len()), Some(1));
    // nothing written yet for the parked record
    assert_eq!(db.count().unwrap(), 1);

    // the reply routes through the pending list, no AI configured needed
    let replies = orch.handle_message(None, &key(), "yes").await.unwrap();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("Found existing entry for John Smith"));
    assert_eq!(db.count().unwrap(), 1);
    assert!(store.get(&key()).is_none());
}

#[tokio::test]
async fn no_forces_a_fresh_entity_despite_similarity() {
    let (db, store, orch) = setup();
    db.upsert(&named("John Smith"), false).unwrap();

    orch.resolve_batch(&key(), vec![named("Jon Smith")])
        .await
        .unwrap();
    let replies = orch.handle_message(None, &key(), "no").await.unwrap();

    assert!(replies[0].contains("Created new entry for Jon Smith"));
    assert_eq!(db.count().unwrap(), 2);
    assert!(store.get(&key()).is_none());
}

#[tokio::test]
async fn explicit_and_positional_replies_are_equivalent() {
    for reply in ["1 yes, 2 no", "yes, no"] {
        let (db, _store, orch) = setup();
        db.upsert(&named("John Smith"), false).unwrap();
        db.upsert(&named("Jane Doe"), false).unwrap();

        let parked = vec![
            pending("Jon Smith", "John Smith"),
            pending("Jane Roe", "Jane Doe"),
        ];
        let msgs = orch.apply_reply(parked, reply).await;

        assert_eq!(msgs.len(), 2, "reply {reply:?}");
        assert!(msgs[0].contains("Found existing entry for John Smith"));
        assert!(msgs[1].contains("Created new entry for Jane Roe"));
        assert_eq!(db.count().unwrap(), 3, "reply {reply:?}");
    }
}

#[tokio::test]
async fn missing_decisions_drop_their_records() {
    let (db, store, orch) = setup();
    db.upsert(&named("John Smith"), false).unwrap();
    db.upsert(&named("Jane Doe"), false).unwrap();

    orch.resolve_batch(
        &key(),
        vec![named("Jon Smith"), named("Jane Roe")],
    )
    .await
    .unwrap();

    // only one decision for two pending items
    let replies = orch.handle_message(None, &key(), "yes").await.unwrap();
    assert_eq!(replies.len(), 2);
    assert!(replies[0].contains("Found existing entry for John Smith"));
    assert_eq!(replies[1], "No valid decision provided (expected yes/no).");

    // the undecided record was dropped, not committed
    assert_eq!(db.count().unwrap(), 2);
    // and the conversation is back to idle regardless
    assert!(store.get(&key()).is_none());
}

#[tokio::test]
async fn nonsense_reply_clears_all_pending() {
    let (db, store, orch) = setup();
    db.upsert(&named("John Smith"), false).unwrap();

    orch.resolve_batch(&key(), vec![named("Jon Smith")])
        .await
        .unwrap();
    let replies = orch.handle_message(None, &key(), "hmm not sure").await.unwrap();

    assert_eq!(replies, vec!["No valid decision provided (expected yes/no)."]);
    assert_eq!(db.count().unwrap(), 1);
    assert!(store.get(&key()).is_none());
}

#[tokio::test]
async fn unambiguous_records_write_through() {
    let (db, store, orch) = setup();
    db.upsert(&named("Jane Doe"), false).unwrap();

    let replies = orch
        .resolve_batch(&key(), vec![named("Jane Doe"), named("Alice Wong")])
        .await
        .unwrap();

    assert_eq!(replies.len(), 2);
    assert!(replies[0].contains("Found existing entry for Jane Doe"));
    assert!(replies[1].contains("Created new entry for Alice Wong"));
    assert_eq!(db.count().unwrap(), 2);
    assert!(store.get(&key()).is_none());
}

#[tokio::test]
async fn prompt_replaces_commit_messages_when_anything_is_parked() {
    let (db, store, orch) = setup();
    db.upsert(&named("John Smith"), false).unwrap();

    let replies = orch
        .resolve_batch(&key(), vec![named("Alice Wong"), named("Jon Smith")])
        .await
        .unwrap();

    // Alice was still written through, but the only reply is the prompt
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("Did you mean John Smith?"));
    assert_eq!(db.count().unwrap(), 2);
    assert_eq!(store.get(&key()).map(|p| p.len()), Some(1));
}

#[tokio::test]
async fn invalid_name_is_skipped_on_both_paths() {
    let (db, _store, orch) = setup();

    // direct path
    let replies = orch
        .resolve_batch(&key(), vec![named("Prince")])
        .await
        .unwrap();
    assert!(replies[0].starts_with("Skipped:"));
    assert_eq!(db.count().unwrap(), 0);

    // confirmed path: a force-created record with a bad name is still rejected
    let msgs = orch
        .apply_reply(vec![pending("Prince", "Prince Rogers")], "no")
        .await;
    assert!(msgs[0].starts_with("Skipped:"));
    assert_eq!(db.count().unwrap(), 0);
}

#[tokio::test]
async fn empty_text_is_inert() {
    let (db, store, orch) = setup();
    db.upsert(&named("John Smith"), false).unwrap();
    orch.resolve_batch(&key(), vec![named("Jon Smith")])
        .await
        .unwrap();

    let replies = orch.handle_message(None, &key(), "   ").await.unwrap();
    assert!(replies.is_empty());
    // the pending list survives an empty ping
    assert_eq!(store.get(&key()).map(|p| p.len()), Some(1));
    assert_eq!(db.count().unwrap(), 1);
}

#[tokio::test]
async fn extraction_requires_ai_configuration() {
    let (_db, _store, orch) = setup();
    let err = orch
        .handle_message(None, &key(), "met Jane Doe from Acme")
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::AiNotConfigured));
}

#[tokio::test]
async fn merge_adopts_the_suggested_name() {
    let (db, _store, orch) = setup();
    db.upsert(
        &ContactRecord {
            name: Some("John Smith".into()),
            company: Some("Acme".into()),
            ..Default::default()
        },
        false,
    )
    .unwrap();

    // the candidate carried extra detail under the misspelled name
    let parked = vec![PendingConfirmation {
        record: ContactRecord {
            name: Some("Jon Smith".into()),
            email: Some("john@acme.example".into()),
            ..Default::default()
        },
        suggested_name: "John Smith".into(),
    }];
    orch.apply_reply(parked, "yes").await;

    let contact = db.find_by_name("John Smith").unwrap().remove(0);
    assert_eq!(contact.email.as_deref(), Some("john@acme.example"));
    assert_eq!(contact.company.as_deref(), Some("Acme"));
    // no "Jon Smith" entity was ever created
    assert!(db.find_by_name("Jon Smith").unwrap().is_empty());
    assert_eq!(db.count().unwrap(), 1);
}
