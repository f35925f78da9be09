//! Snapshot persistence: save and restore the full state.
//!
//! The entire entity graph plus the session pointer is serialized as one
//! JSON document under one fixed key. Saving happens synchronously at the
//! end of every successful mutation; a failed save is reported as a
//! warning and the in-memory state stays authoritative. Loading falls
//! back to a fixed seed state whenever the stored snapshot is missing,
//! unreadable or from an unknown version, and persists that seed
//! immediately.

use crate::clock::Clock;
use crate::content::{ContentStore, Post};
use crate::error::{ChirpError, Result};
use crate::ids::{IdSource, UserId};
use crate::ledger::{Notification, NotificationLedger};
use crate::registry::{User, UserRegistry};
use crate::state::AppState;
use crate::storage::SnapshotStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Fixed key the snapshot lives under.
pub const SNAPSHOT_KEY: &str = "chirp_state_v1";

/// Current snapshot document version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The persisted form of the full state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Document version for forward compatibility.
    pub version: u32,
    /// All user records.
    pub users: Vec<User>,
    /// All posts in creation order.
    pub posts: Vec<Post>,
    /// All notification entries in insertion order.
    pub notifications: Vec<Notification>,
    /// The active session, if any.
    pub session_user_id: Option<UserId>,
}

impl Snapshot {
    /// Captures the current state into a persistable document.
    pub fn capture(state: &AppState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            users: state.registry.users().to_vec(),
            posts: state.content.posts().to_vec(),
            notifications: state.ledger.entries().to_vec(),
            session_user_id: state.session_user_id.clone(),
        }
    }

    /// Rebuilds live state from a decoded document.
    pub fn restore(self) -> AppState {
        AppState {
            registry: UserRegistry::from_users(self.users),
            content: ContentStore::from_posts(self.posts),
            ledger: NotificationLedger::from_entries(self.notifications),
            session_user_id: self.session_user_id,
        }
    }
}

/// Serializes the full state and writes it under the fixed key.
pub fn save(state: &AppState, store: &mut dyn SnapshotStore) -> Result<()> {
    let snapshot = Snapshot::capture(state);
    let bytes = serde_json::to_vec(&snapshot)
        .map_err(|e| ChirpError::serialization(format!("Failed to serialize snapshot: {}", e)))?;
    debug!(bytes = bytes.len(), "persisting snapshot");
    store.put(SNAPSHOT_KEY, &bytes)
}

fn decode(bytes: &[u8]) -> Result<Snapshot> {
    let snapshot: Snapshot = serde_json::from_slice(bytes)
        .map_err(|e| ChirpError::storage_corrupt(format!("snapshot is not valid JSON: {}", e)))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(ChirpError::storage_corrupt(format!(
            "unsupported snapshot version {}",
            snapshot.version
        )));
    }
    Ok(snapshot)
}

/// Loads the persisted state, reseeding when nothing usable is stored.
///
/// A corrupt snapshot is recovered silently: the fixed seed state replaces
/// it and the event is reported at info level, not as an error. Only hard
/// storage failures propagate.
pub fn load(
    store: &mut dyn SnapshotStore,
    ids: &mut dyn IdSource,
    clock: &dyn Clock,
) -> Result<AppState> {
    match store.get(SNAPSHOT_KEY)? {
        Some(bytes) => match decode(&bytes) {
            Ok(snapshot) => {
                debug!(
                    users = snapshot.users.len(),
                    posts = snapshot.posts.len(),
                    "restored snapshot"
                );
                Ok(snapshot.restore())
            }
            Err(e) => {
                info!(error = %e, "stored snapshot unusable, reseeding");
                Ok(reseed(store, ids, clock))
            }
        },
        None => {
            info!("no snapshot found, seeding initial state");
            Ok(reseed(store, ids, clock))
        }
    }
}

fn reseed(store: &mut dyn SnapshotStore, ids: &mut dyn IdSource, clock: &dyn Clock) -> AppState {
    let state = AppState::seed(ids, clock);
    if let Err(e) = save(&state, store) {
        warn!(error = %e, "failed to persist seed state");
    }
    state
}
