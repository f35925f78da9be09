//! Append-only notification ledger.
//!
//! Notifications are created only as side effects of engine transactions
//! (mentions, likes, replies). The ledger itself never deduplicates and
//! never deletes; transition gating (for example "only on the change into
//! the liked state") is the caller's responsibility. Entries for a user
//! are listed in insertion order, oldest first; the presentation layer is
//! free to reverse for display.

use crate::ids::{IdSource, NotificationId, PostId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// What kind of event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// The actor mentioned the target in a post.
    Mention,
    /// The actor liked the target's post.
    Like,
    /// The actor replied to the target's post.
    Reply,
    /// The actor followed the target.
    Follow,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Mention => write!(f, "mention"),
            NotificationKind::Like => write!(f, "like"),
            NotificationKind::Reply => write!(f, "reply"),
            NotificationKind::Follow => write!(f, "follow"),
        }
    }
}

/// One notification event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Opaque unique identifier.
    pub id: NotificationId,
    /// The user who should see this notification.
    pub target_user_id: UserId,
    /// Event kind.
    pub kind: NotificationKind,
    /// Username of the user who caused the event.
    pub actor_username: String,
    /// The post involved, present for mention, like and reply events.
    pub post_id: Option<PostId>,
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Whether the target has seen this entry. Starts false; flips only
    /// through the bulk mark-read operation.
    pub read: bool,
}

/// Append-only log of notification events keyed by target user.
#[derive(Debug, Default)]
pub struct NotificationLedger {
    entries: Vec<Notification>,
}

impl NotificationLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from restored entries.
    pub fn from_entries(entries: Vec<Notification>) -> Self {
        Self { entries }
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Appends a new unread entry. No deduplication.
    pub fn record(
        &mut self,
        kind: NotificationKind,
        actor_username: &str,
        target_user_id: &UserId,
        post_id: Option<PostId>,
        ids: &mut dyn IdSource,
        now: u64,
    ) -> &Notification {
        debug!(%kind, actor = actor_username, target = %target_user_id, "recording notification");
        let entry = Notification {
            id: NotificationId::new(ids.next_id()),
            target_user_id: target_user_id.clone(),
            kind,
            actor_username: actor_username.to_string(),
            post_id,
            created_at: now,
            read: false,
        };
        let idx = self.entries.len();
        self.entries.push(entry);
        &self.entries[idx]
    }

    /// Number of unread entries for a user.
    pub fn unread_count(&self, user_id: &UserId) -> usize {
        self.entries
            .iter()
            .filter(|n| n.target_user_id == *user_id && !n.read)
            .count()
    }

    /// All entries for a user, in insertion order (oldest first).
    pub fn list_for(&self, user_id: &UserId) -> Vec<&Notification> {
        self.entries
            .iter()
            .filter(|n| n.target_user_id == *user_id)
            .collect()
    }

    /// Marks every entry for a user as read. Idempotent; returns how many
    /// entries were newly marked.
    pub fn mark_all_read(&mut self, user_id: &UserId) -> usize {
        let mut marked = 0;
        for entry in &mut self.entries {
            if entry.target_user_id == *user_id && !entry.read {
                entry.read = true;
                marked += 1;
            }
        }
        marked
    }
}
