//! End-to-end tests for the chirp engine.
//!
//! These tests drive full account, posting, threading and notification
//! flows through the public engine API, including persistence
//! round-trips through the snapshot store.

use chirp::clock::ManualClock;
use chirp::engine::Engine;
use chirp::error::ChirpError;
use chirp::ids::CounterIds;
use chirp::ledger::NotificationKind;
use chirp::state::AppState;
use chirp::storage::MemoryStore;
use chirp::view::{FeedOptions, FeedTarget};

/// Engine over an empty state (no seed users, no session).
fn empty_engine() -> Engine<MemoryStore> {
    Engine::with_state(
        AppState::new(),
        MemoryStore::new(),
        Box::new(CounterIds::new()),
        Box::new(ManualClock::new(1_000)),
    )
}

/// Engine over the first-run seed state, sharing its store and clock.
fn seeded_engine() -> (Engine<MemoryStore>, MemoryStore, ManualClock) {
    let store = MemoryStore::new();
    let clock = ManualClock::new(1_000);
    let engine = Engine::load(
        store.clone(),
        Box::new(CounterIds::new()),
        Box::new(clock.clone()),
    )
    .expect("Failed to load engine");
    (engine, store, clock)
}

#[test]
fn test_register_then_login_flow() {
    let mut engine = empty_engine();

    let amy = engine
        .register("a@x.com", "amy", "pw1")
        .expect("Failed to register");
    assert_eq!(amy.username, "amy");
    assert_eq!(
        engine.current_user().expect("session after register").id,
        amy.id
    );

    engine.logout();
    assert!(engine.current_user().is_none());

    let err = engine.login("a@x.com", "wrong").unwrap_err();
    assert!(matches!(err, ChirpError::InvalidCredentials));
    assert!(engine.current_user().is_none());

    let user = engine.login("amy", "pw1").expect("Failed to log in");
    assert_eq!(user.id, amy.id);
    assert_eq!(engine.current_user().expect("session").id, amy.id);
}

#[test]
fn test_mention_post_records_notification() {
    let mut engine = empty_engine();
    engine
        .register("a@x.com", "amy", "pw1")
        .expect("Failed to register amy");
    engine.logout();
    engine
        .register("b@x.com", "bob", "pw2")
        .expect("Failed to register bob");

    let post = engine
        .create_post("hi @amy #demo", "")
        .expect("Failed to post");

    assert_eq!(chirp::extract_mentions(&post.content), vec!["amy"]);
    assert_eq!(chirp::extract_tags(&post.content), vec!["demo"]);

    let amy_id = engine
        .state()
        .registry
        .lookup_by_username("amy")
        .expect("amy")
        .id
        .clone();
    let entries = engine.state().ledger.list_for(&amy_id);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, NotificationKind::Mention);
    assert_eq!(entries[0].actor_username, "bob");
    assert_eq!(entries[0].post_id.as_ref(), Some(&post.id));

    // The tag is discoverable through the tag feed.
    let feed = engine.resolve(
        &FeedTarget::Tag("demo".to_string()),
        &FeedOptions::default(),
    );
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, post.id);
}

#[test]
fn test_reply_appears_in_thread_resolution() {
    let (mut engine, _, clock) = seeded_engine();
    let root = engine
        .create_post("starting a thread", "")
        .expect("Failed to post");

    clock.advance(10);
    let reply = engine
        .create_reply(&root.id, "and a follow-up")
        .expect("Failed to reply");

    let stored_root = engine
        .state()
        .content
        .find_by_id(&root.id)
        .expect("root post");
    assert!(stored_root.reply_ids.contains(&reply.id));

    let thread = engine.resolve(
        &FeedTarget::Thread(root.id.clone()),
        &FeedOptions::default(),
    );
    let ids: Vec<_> = thread.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![reply.id.clone(), root.id.clone()]);
}

#[test]
fn test_state_survives_reload() {
    let (mut engine, store, clock) = seeded_engine();

    engine
        .create_post("words worth keeping @bob #memory", "")
        .expect("Failed to post");
    engine.logout();
    engine.login("bob@example.com", "").unwrap_err();
    drop(engine);

    let reloaded = Engine::load(
        store,
        Box::new(CounterIds::new()),
        Box::new(clock),
    )
    .expect("Failed to reload engine");

    // Entity sets match what was committed before the restart.
    assert_eq!(reloaded.state().registry.users().len(), 2);
    assert_eq!(reloaded.state().content.len(), 3);
    assert_eq!(reloaded.state().ledger.entries().len(), 1);
    // The logout was the last committed session change.
    assert!(reloaded.current_user().is_none());

    let feed = reloaded.resolve(&FeedTarget::Latest, &FeedOptions::default());
    assert!(feed.iter().any(|p| p.content.contains("#memory")));
}

#[test]
fn test_identical_timestamps_resolve_newest_insertion_first() {
    let (mut engine, _, _clock) = seeded_engine();
    // The manual clock stands still, so all three posts share a
    // timestamp and only insertion order can rank them.
    engine.create_post("A", "").expect("post A");
    engine.create_post("B", "").expect("post B");
    engine.create_post("C", "").expect("post C");

    let feed = engine.resolve(
        &FeedTarget::Profile("alice".to_string()),
        &FeedOptions::default(),
    );
    let contents: Vec<&str> = feed
        .iter()
        .map(|p| p.content.as_str())
        .filter(|c| ["A", "B", "C"].contains(c))
        .collect();
    assert_eq!(contents, vec!["C", "B", "A"]);
}

#[test]
fn test_like_toggle_pair_is_idempotent() {
    let (mut engine, _, _) = seeded_engine();
    let post_id = engine.state().content.posts()[1].id.clone();
    let before = engine
        .state()
        .content
        .find_by_id(&post_id)
        .expect("post")
        .liked_by
        .clone();

    let outcome = engine.toggle_like(&post_id).expect("like failed");
    assert!(outcome.liked);
    assert!(outcome.post.liked_by.contains("alice"));

    let outcome = engine.toggle_like(&post_id).expect("unlike failed");
    assert!(!outcome.liked);
    assert_eq!(outcome.post.liked_by, before);
}

#[test]
fn test_media_only_feed_filters_attachments() {
    let (mut engine, _, _) = seeded_engine();
    engine
        .create_post("text only", "")
        .expect("Failed to post");
    engine
        .create_post("with a picture", "http://img/pic.png")
        .expect("Failed to post");

    let feed = engine.resolve(&FeedTarget::Home, &FeedOptions { media_only: true });
    assert!(feed.iter().all(|p| p.has_media()));
    assert!(feed.iter().any(|p| p.content == "with a picture"));
    assert!(!feed.iter().any(|p| p.content == "text only"));
}

#[test]
fn test_notification_lifecycle_across_users() {
    let mut engine = empty_engine();
    engine
        .register("a@x.com", "amy", "pw1")
        .expect("Failed to register amy");
    let amys_post = engine
        .create_post("my first! #intro", "")
        .expect("Failed to post");
    engine.logout();

    engine
        .register("b@x.com", "bob", "pw2")
        .expect("Failed to register bob");
    engine.toggle_like(&amys_post.id).expect("like failed");
    engine
        .create_reply(&amys_post.id, "welcome aboard")
        .expect("reply failed");
    engine.logout();

    engine.login("amy", "pw1").expect("login failed");
    assert_eq!(engine.unread_count(), 2);
    let kinds: Vec<NotificationKind> = engine.notifications().iter().map(|n| n.kind).collect();
    // Insertion order, oldest first.
    assert_eq!(kinds, vec![NotificationKind::Like, NotificationKind::Reply]);

    let marked = engine.mark_notifications_read().expect("mark failed");
    assert_eq!(marked, 2);
    assert_eq!(engine.unread_count(), 0);
    assert_eq!(engine.notifications().len(), 2);
}

#[test]
fn test_unknown_feed_targets_resolve_empty() {
    let (engine, _, _) = seeded_engine();
    let opts = FeedOptions::default();
    assert!(engine
        .resolve(&FeedTarget::Profile("nobody".to_string()), &opts)
        .is_empty());
    assert!(engine
        .resolve(&FeedTarget::Thread("missing".into()), &opts)
        .is_empty());
    assert!(engine
        .resolve(&FeedTarget::Search("xyzzy".to_string()), &opts)
        .is_empty());
}
