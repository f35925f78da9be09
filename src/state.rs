//! The aggregate application state.
//!
//! All four entity collections plus the session pointer live in one
//! explicit state object. Nothing is ambient or static: the engine owns
//! the only mutable handle, while the view resolver and the persistence
//! adapter read through shared references.

use crate::clock::Clock;
use crate::content::{ContentStore, Post};
use crate::ids::{IdSource, PostId, UserId};
use crate::ledger::NotificationLedger;
use crate::registry::{User, UserRegistry};

/// The whole entity graph and the session pointer.
#[derive(Debug, Default)]
pub struct AppState {
    /// User records.
    pub registry: UserRegistry,
    /// Posts and thread links.
    pub content: ContentStore,
    /// Notification events.
    pub ledger: NotificationLedger,
    /// The currently authenticated user, if any.
    pub session_user_id: Option<UserId>,
}

impl AppState {
    /// Creates an empty state with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the currently authenticated user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.session_user_id
            .as_ref()
            .and_then(|id| self.registry.lookup_by_id(id))
    }

    /// Builds the fixed first-run state: two sample users, two sample
    /// posts and the first user as the active session. Used whenever no
    /// usable snapshot exists.
    pub fn seed(ids: &mut dyn IdSource, clock: &dyn Clock) -> Self {
        let now = clock.now_millis();

        let alice = User {
            id: UserId::new(ids.next_id()),
            email: Some("alice@example.com".to_string()),
            username: "alice".to_string(),
            display: "Alice".to_string(),
            bio: "Front-end dev".to_string(),
            avatar_ref: String::new(),
            credential_secret: None,
        };
        let bob = User {
            id: UserId::new(ids.next_id()),
            email: Some("bob@example.com".to_string()),
            username: "bob".to_string(),
            display: "Bob".to_string(),
            bio: "Game designer".to_string(),
            avatar_ref: String::new(),
            credential_secret: None,
        };

        // Seed posts are inserted directly; no notifications are emitted
        // for the sample mention.
        let p1 = Post::compose(
            PostId::new(ids.next_id()),
            &alice,
            "Hello Chirp! #firstpost".to_string(),
            None,
            None,
            now,
        );
        let p2 = Post::compose(
            PostId::new(ids.next_id()),
            &bob,
            "Working on level design today. @alice #gamedev".to_string(),
            Some("https://picsum.photos/seed/level/800/400".to_string()),
            None,
            now,
        );

        let session = alice.id.clone();
        Self {
            registry: UserRegistry::from_users(vec![alice, bob]),
            content: ContentStore::from_posts(vec![p1, p2]),
            ledger: NotificationLedger::new(),
            session_user_id: Some(session),
        }
    }
}
