//! Utility functions for CLI operations.

use crate::clock::SystemClock;
use crate::content::Post;
use crate::engine::Engine;
use crate::error::{ChirpError, Result};
use crate::ids::UuidIds;
use crate::ledger::{Notification, NotificationKind};
use crate::storage::{RocksDbConfig, RocksDbStore};
use rpassword::prompt_password;
use std::env;
use std::time::{Duration, UNIX_EPOCH};

/// Returns the data directory, honoring `CHIRP_DATA`.
pub fn data_dir() -> String {
    env::var("CHIRP_DATA").unwrap_or_else(|_| "chirp_data".to_string())
}

/// Opens the durable store and loads the engine around it.
pub fn open_engine() -> Result<Engine<RocksDbStore>> {
    let store = RocksDbStore::open(data_dir(), &RocksDbConfig::default())?;
    Engine::load(store, Box::new(UuidIds::new()), Box::new(SystemClock))
}

/// Formats a millisecond timestamp for CLI display.
pub fn format_timestamp(millis: u64) -> String {
    let datetime = UNIX_EPOCH + Duration::from_millis(millis);
    format!("{:?}", datetime)
}

/// Prompt for a password securely (no echo to terminal)
pub fn prompt_for_password(prompt: &str) -> Result<String> {
    let password = prompt_password(format!("{}: ", prompt))
        .map_err(|e| ChirpError::validation(format!("Failed to read password: {}", e)))?;
    if password.is_empty() {
        return Err(ChirpError::validation("Password cannot be empty"));
    }
    Ok(password)
}

/// Prints one post as a feed card.
pub fn print_post(post: &Post) {
    println!(
        "[{}] @{} ({})  {}",
        post.id,
        post.author_username,
        post.author_display,
        format_timestamp(post.created_at)
    );
    println!("    {}", post.content);
    if let Some(media) = post.media_ref.as_deref() {
        if !media.is_empty() {
            println!("    media: {}", media);
        }
    }
    println!(
        "    likes: {}  replies: {}",
        post.liked_by.len(),
        post.reply_ids.len()
    );
}

/// Human-readable notification line, mirroring the feed's phrasing.
pub fn describe_notification(entry: &Notification) -> String {
    let action = match entry.kind {
        NotificationKind::Like => "liked your post",
        NotificationKind::Reply => "replied to your post",
        NotificationKind::Mention => "mentioned you",
        NotificationKind::Follow => "followed you",
    };
    let marker = if entry.read { " " } else { "*" };
    format!(
        "{} @{} {}  {}",
        marker,
        entry.actor_username,
        action,
        format_timestamp(entry.created_at)
    )
}
