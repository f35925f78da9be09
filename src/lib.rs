//! # Chirp - a small social-content engine
//!
//! Chirp is the state and derivation core of a short-message platform:
//! users post, reply to form threads, like posts, reference each other
//! with `@mentions` and topics with `#tags`, and receive notifications.
//! This crate owns the entity model, the mutation transactions that keep
//! it consistent, and the derivations over it; rendering is left to a
//! presentation layer (the bundled CLI is one).
//!
//! ## Architecture
//!
//! ```text
//! Engine (single writer)
//!     ├── UserRegistry        users, identity resolution
//!     ├── ContentStore        posts, thread links, search
//!     ├── NotificationLedger  append-only event log
//!     ├── view::resolve       navigation target -> ordered posts
//!     └── snapshot            JSON state under one key-value entry
//! ```
//!
//! Every mutation validates first, applies the whole multi-entity change,
//! persists the full snapshot, then signals subscribers. Reads go through
//! the view resolver and never mutate anything.
//!
//! ## Example
//!
//! ```rust
//! use chirp::clock::ManualClock;
//! use chirp::engine::Engine;
//! use chirp::ids::CounterIds;
//! use chirp::storage::MemoryStore;
//! use chirp::view::{FeedOptions, FeedTarget};
//!
//! # fn main() -> chirp::Result<()> {
//! // First run seeds two sample users and logs the first one in.
//! let mut engine = Engine::load(
//!     MemoryStore::new(),
//!     Box::new(CounterIds::new()),
//!     Box::new(ManualClock::new(1_000)),
//! )?;
//!
//! engine.create_post("Trying this out! cc @bob #intro", "")?;
//! let feed = engine.resolve(&FeedTarget::Tag("intro".into()), &FeedOptions::default());
//! assert_eq!(feed.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod annotate;
pub mod cli;
pub mod clock;
pub mod content;
pub mod engine;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod view;

pub use annotate::{extract_mentions, extract_tags};
pub use content::{ContentStore, Post, MAX_POST_CHARS};
pub use engine::{Engine, LikeOutcome, StateChange};
pub use error::{ChirpError, Result};
pub use ids::{NotificationId, PostId, UserId};
pub use ledger::{Notification, NotificationKind, NotificationLedger};
pub use registry::{User, UserRegistry};
pub use snapshot::{Snapshot, SNAPSHOT_KEY, SNAPSHOT_VERSION};
pub use state::AppState;
pub use storage::SnapshotStore;
pub use view::{resolve, FeedOptions, FeedTarget};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
