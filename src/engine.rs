//! The mutation engine.
//!
//! The engine owns the aggregate state and is the only writer to it.
//! Every command validates first, applies the whole multi-entity change,
//! attempts to persist, then signals subscribers. Commands are synchronous
//! and run to completion, so no caller ever observes a partially applied
//! mutation. When exposed to concurrent callers, wrap the engine in a
//! single-writer discipline (a mutex or a dedicated thread); reads can be
//! served from a consistent snapshot.
//!
//! A failed persistence write is reported as a warning and the in-memory
//! state stays authoritative; the mutation is not rolled back.

use crate::clock::Clock;
use crate::content::Post;
use crate::error::{ChirpError, Result};
use crate::ids::{IdSource, PostId, UserId};
use crate::ledger::{Notification, NotificationKind};
use crate::registry::User;
use crate::snapshot;
use crate::state::AppState;
use crate::storage::SnapshotStore;
use crate::view::{self, FeedOptions, FeedTarget};
use tracing::{debug, warn};

/// A committed mutation, passed to change subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// A root post was created.
    PostCreated(PostId),
    /// A reply was created.
    ReplyCreated(PostId),
    /// A like was toggled on a post.
    LikeToggled(PostId),
    /// A new account was registered and became the session.
    Registered(UserId),
    /// A user logged in.
    LoggedIn(UserId),
    /// The session was cleared.
    LoggedOut,
    /// A profile was updated.
    ProfileUpdated(UserId),
    /// The session user's notifications were marked read.
    NotificationsRead(UserId),
}

/// Result of toggling a like.
#[derive(Debug, Clone)]
pub struct LikeOutcome {
    /// The post after the toggle.
    pub post: Post,
    /// True when the post is now liked by the session user.
    pub liked: bool,
}

type ChangeListener = Box<dyn Fn(&StateChange)>;

/// Orchestrates multi-entity transactions over the aggregate state.
pub struct Engine<S: SnapshotStore> {
    state: AppState,
    store: S,
    ids: Box<dyn IdSource>,
    clock: Box<dyn Clock>,
    listeners: Vec<ChangeListener>,
}

impl<S: SnapshotStore> Engine<S> {
    /// Loads persisted state (seeding on first run) and builds an engine
    /// around it.
    pub fn load(store: S, ids: Box<dyn IdSource>, clock: Box<dyn Clock>) -> Result<Self> {
        let mut store = store;
        let mut ids = ids;
        let state = snapshot::load(&mut store, ids.as_mut(), clock.as_ref())?;
        Ok(Self {
            state,
            store,
            ids,
            clock,
            listeners: Vec::new(),
        })
    }

    /// Builds an engine around pre-built state. Nothing is persisted
    /// until the first mutation.
    pub fn with_state(
        state: AppState,
        store: S,
        ids: Box<dyn IdSource>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            state,
            store,
            ids,
            clock,
            listeners: Vec::new(),
        }
    }

    /// Read access to the aggregate state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The currently authenticated user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.state.current_user()
    }

    /// Registers a change subscriber, called after every committed
    /// mutation.
    pub fn subscribe(&mut self, listener: impl Fn(&StateChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Persists the state and signals subscribers. Called only after a
    /// mutation has fully applied.
    fn commit(&mut self, change: StateChange) {
        if let Err(e) = snapshot::save(&self.state, &mut self.store) {
            warn!(error = %e, "failed to persist state after mutation");
        }
        for listener in &self.listeners {
            listener(&change);
        }
    }

    fn require_session(&self) -> Result<&User> {
        let id = self
            .state
            .session_user_id
            .as_ref()
            .ok_or(ChirpError::Unauthorized)?;
        self.state
            .registry
            .lookup_by_id(id)
            .ok_or(ChirpError::Unauthorized)
    }

    /// Creates a root post authored by the session user.
    ///
    /// Mentioned usernames are materialized as placeholder users when
    /// unknown, and each mention records a notification.
    ///
    /// # Errors
    /// - `Unauthorized` without an active session
    /// - `Validation` when the trimmed text is empty
    pub fn create_post(&mut self, text: &str, media_ref: &str) -> Result<Post> {
        let author = self.require_session()?.clone();
        let content = text.trim();
        if content.is_empty() {
            return Err(ChirpError::validation("post content cannot be empty"));
        }
        let media = normalize_ref(media_ref);
        let now = self.clock.now_millis();

        let post = self
            .state
            .content
            .create_post(
                &author,
                content.to_string(),
                media,
                None,
                self.ids.as_mut(),
                now,
            )?
            .clone();

        let targets = self
            .state
            .registry
            .resolve_mentions(content, self.ids.as_mut());
        for target in targets {
            self.state.ledger.record(
                NotificationKind::Mention,
                &author.username,
                &target,
                Some(post.id.clone()),
                self.ids.as_mut(),
                now,
            );
        }

        debug!(post_id = %post.id, author = %author.username, "post created");
        self.commit(StateChange::PostCreated(post.id.clone()));
        Ok(post)
    }

    /// Creates a reply to an existing post.
    ///
    /// The parent's author is notified unless they are the replier.
    /// Reply text is not scanned for mentions.
    ///
    /// # Errors
    /// - `Unauthorized` without an active session
    /// - `Validation` when the trimmed text is empty
    /// - `NotFound` when the parent post does not exist
    pub fn create_reply(&mut self, parent_id: &PostId, text: &str) -> Result<Post> {
        let actor = self.require_session()?.clone();
        let content = text.trim();
        if content.is_empty() {
            return Err(ChirpError::validation("reply content cannot be empty"));
        }
        let now = self.clock.now_millis();

        let reply = self
            .state
            .content
            .create_post(
                &actor,
                content.to_string(),
                None,
                Some(parent_id.clone()),
                self.ids.as_mut(),
                now,
            )?
            .clone();

        let parent_author = self
            .state
            .content
            .find_by_id(parent_id)
            .map(|p| p.author_username.clone());
        if let Some(author_name) = parent_author {
            if let Some(author) = self.state.registry.lookup_by_username(&author_name) {
                if author.id != actor.id {
                    let target = author.id.clone();
                    self.state.ledger.record(
                        NotificationKind::Reply,
                        &actor.username,
                        &target,
                        Some(parent_id.clone()),
                        self.ids.as_mut(),
                        now,
                    );
                }
            }
        }

        debug!(reply_id = %reply.id, parent = %parent_id, "reply created");
        self.commit(StateChange::ReplyCreated(reply.id.clone()));
        Ok(reply)
    }

    /// Toggles the session user's like on a post.
    ///
    /// The post's author is notified only on the transition into the
    /// liked state, and never for their own posts.
    ///
    /// # Errors
    /// - `Unauthorized` without an active session
    /// - `NotFound` when the post does not exist
    pub fn toggle_like(&mut self, post_id: &PostId) -> Result<LikeOutcome> {
        let actor = self.require_session()?.clone();
        let liked = self.state.content.toggle_like(post_id, &actor.username)?;

        if liked {
            let author_name = self
                .state
                .content
                .find_by_id(post_id)
                .map(|p| p.author_username.clone());
            if let Some(author_name) = author_name {
                if let Some(author) = self.state.registry.lookup_by_username(&author_name) {
                    if author.id != actor.id {
                        let target = author.id.clone();
                        let now = self.clock.now_millis();
                        self.state.ledger.record(
                            NotificationKind::Like,
                            &actor.username,
                            &target,
                            Some(post_id.clone()),
                            self.ids.as_mut(),
                            now,
                        );
                    }
                }
            }
        }

        let post = self
            .state
            .content
            .find_by_id(post_id)
            .cloned()
            .ok_or_else(|| ChirpError::not_found(format!("post '{}'", post_id)))?;
        self.commit(StateChange::LikeToggled(post_id.clone()));
        Ok(LikeOutcome { post, liked })
    }

    /// Registers a new account and makes it the active session.
    ///
    /// # Errors
    /// - `Validation` on blank email, username or password
    /// - `DuplicateUsername` when the username exists (placeholders
    ///   included)
    pub fn register(&mut self, email: &str, username: &str, secret: &str) -> Result<User> {
        let email = email.trim();
        let username = username.trim();
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(ChirpError::validation("a password is required"));
        }

        let user = self
            .state
            .registry
            .register(email, username, secret, self.ids.as_mut())?
            .clone();
        self.state.session_user_id = Some(user.id.clone());

        debug!(username = %user.username, "account registered");
        self.commit(StateChange::Registered(user.id.clone()));
        Ok(user)
    }

    /// Logs in with a username or email identifier.
    ///
    /// # Errors
    /// - `Validation` on blank identifier or password
    /// - `NotFound` when no account matches
    /// - `InvalidCredentials` on password mismatch
    pub fn login(&mut self, identifier: &str, secret: &str) -> Result<User> {
        let identifier = identifier.trim();
        let secret = secret.trim();
        if identifier.is_empty() || secret.is_empty() {
            return Err(ChirpError::validation(
                "an identifier and a password are required",
            ));
        }

        // Usernames win over emails when both could match.
        let user = match self.state.registry.authenticate(Some(identifier), None, secret) {
            Err(ChirpError::NotFound(_)) => self
                .state
                .registry
                .authenticate(None, Some(identifier), secret)?,
            other => other?,
        }
        .clone();

        self.state.session_user_id = Some(user.id.clone());
        debug!(username = %user.username, "logged in");
        self.commit(StateChange::LoggedIn(user.id.clone()));
        Ok(user)
    }

    /// Clears the active session.
    pub fn logout(&mut self) {
        self.state.session_user_id = None;
        self.commit(StateChange::LoggedOut);
    }

    /// Updates the session user's mutable profile fields.
    ///
    /// Existing posts keep the author snapshot taken when they were
    /// created.
    ///
    /// # Errors
    /// Returns `Unauthorized` without an active session.
    pub fn update_profile(&mut self, display: &str, bio: &str, avatar_ref: &str) -> Result<User> {
        let id = self.require_session()?.id.clone();
        let user = self
            .state
            .registry
            .update_profile(&id, display.trim(), bio.trim(), avatar_ref.trim())?
            .clone();
        self.commit(StateChange::ProfileUpdated(id));
        Ok(user)
    }

    /// Marks every notification for the session user as read. Idempotent;
    /// returns how many entries were newly marked.
    ///
    /// # Errors
    /// Returns `Unauthorized` without an active session.
    pub fn mark_notifications_read(&mut self) -> Result<usize> {
        let id = self.require_session()?.id.clone();
        let marked = self.state.ledger.mark_all_read(&id);
        self.commit(StateChange::NotificationsRead(id));
        Ok(marked)
    }

    /// Resolves a feed for display. Read-only.
    pub fn resolve(&self, target: &FeedTarget, opts: &FeedOptions) -> Vec<Post> {
        view::resolve(&self.state, target, opts)
    }

    /// The session user's notifications in insertion order, empty when
    /// logged out.
    pub fn notifications(&self) -> Vec<Notification> {
        match &self.state.session_user_id {
            Some(id) => self.state.ledger.list_for(id).into_iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Unread notification count for the session user, zero when logged
    /// out.
    pub fn unread_count(&self) -> usize {
        match &self.state.session_user_id {
            Some(id) => self.state.ledger.unread_count(id),
            None => 0,
        }
    }

    /// Case-insensitive user search. Read-only.
    pub fn search_users(&self, query: &str) -> Vec<User> {
        self.state
            .registry
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    }
}

fn normalize_ref(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
