//! Command implementations for the chirp CLI.

use crate::cli::utils::{describe_notification, open_engine, print_post, prompt_for_password};
use crate::content::MAX_POST_CHARS;
use crate::error::{ChirpError, Result};
use crate::ids::PostId;
use crate::view::{FeedOptions, FeedTarget};
use tracing::info;

/// Execute feed command
pub fn feed(route: &str, media_only: bool) -> Result<()> {
    let target = FeedTarget::parse(route)
        .ok_or_else(|| ChirpError::validation(format!("unknown route '{}'", route)))?;
    let engine = open_engine()?;
    let posts = engine.resolve(&target, &FeedOptions { media_only });

    info!(route = %target, count = posts.len(), "resolved feed");
    if posts.is_empty() {
        println!("No posts yet");
        return Ok(());
    }
    for post in &posts {
        print_post(post);
    }
    Ok(())
}

/// Execute post command
pub fn post(text: &str, media_ref: Option<&str>) -> Result<()> {
    if text.chars().count() > MAX_POST_CHARS {
        println!(
            "Note: post is {} characters, over the usual {}",
            text.chars().count(),
            MAX_POST_CHARS
        );
    }
    let mut engine = open_engine()?;
    let post = engine.create_post(text, media_ref.unwrap_or(""))?;
    println!("Posted as @{}:", post.author_username);
    print_post(&post);
    Ok(())
}

/// Execute reply command
pub fn reply(post_id: &PostId, text: &str) -> Result<()> {
    let mut engine = open_engine()?;
    let reply = engine.create_reply(post_id, text)?;
    println!("Replied in thread {}:", post_id);
    print_post(&reply);
    Ok(())
}

/// Execute like command
pub fn like(post_id: &PostId) -> Result<()> {
    let mut engine = open_engine()?;
    let outcome = engine.toggle_like(post_id)?;
    if outcome.liked {
        println!("Liked [{}] (now {} likes)", post_id, outcome.post.liked_by.len());
    } else {
        println!("Unliked [{}] (now {} likes)", post_id, outcome.post.liked_by.len());
    }
    Ok(())
}

/// Execute search command: users first, then posts, like the app's
/// search panel.
pub fn search(query: &str) -> Result<()> {
    let engine = open_engine()?;

    let users = engine.search_users(query);
    if !users.is_empty() {
        println!("Users:");
        for user in &users {
            println!("  @{}  {}", user.username, user.display);
        }
    }

    let posts = engine.resolve(
        &FeedTarget::Search(query.to_string()),
        &FeedOptions::default(),
    );
    if !posts.is_empty() {
        println!("Posts:");
        for post in &posts {
            print_post(post);
        }
    }

    if users.is_empty() && posts.is_empty() {
        println!("Nothing matched '{}'", query);
    }
    Ok(())
}

/// Execute register command
pub fn register(email: &str, username: &str, password: Option<&str>) -> Result<()> {
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt_for_password("Choose a password")?,
    };
    let mut engine = open_engine()?;
    let user = engine.register(email, username, &password)?;
    println!("Welcome, @{}! You are now logged in.", user.username);
    Ok(())
}

/// Execute login command
pub fn login(identifier: &str, password: Option<&str>) -> Result<()> {
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt_for_password("Password")?,
    };
    let mut engine = open_engine()?;
    let user = engine.login(identifier, &password)?;
    println!("Logged in as @{}", user.username);
    Ok(())
}

/// Execute logout command
pub fn logout() -> Result<()> {
    let mut engine = open_engine()?;
    engine.logout();
    println!("Logged out");
    Ok(())
}

/// Execute profile command
pub fn profile(display: &str, bio: &str, avatar_ref: Option<&str>) -> Result<()> {
    let mut engine = open_engine()?;
    let user = engine.update_profile(display, bio, avatar_ref.unwrap_or(""))?;
    println!("Profile updated: {} (@{})", user.display, user.username);
    if !user.bio.is_empty() {
        println!("  {}", user.bio);
    }
    Ok(())
}

/// Execute notifications command
pub fn notifications(mark_read: bool) -> Result<()> {
    let mut engine = open_engine()?;
    let entries = engine.notifications();
    if engine.current_user().is_none() {
        println!("Log in to see notifications");
        return Ok(());
    }
    if entries.is_empty() {
        println!("No notifications");
        return Ok(());
    }

    println!("{} unread", engine.unread_count());
    // Newest first for display; the ledger itself is oldest first.
    for entry in entries.iter().rev() {
        println!("{}", describe_notification(entry));
    }

    if mark_read {
        let marked = engine.mark_notifications_read()?;
        println!("Marked {} notifications as read", marked);
    }
    Ok(())
}

/// Execute whoami command
pub fn whoami() -> Result<()> {
    let engine = open_engine()?;
    match engine.current_user() {
        Some(user) => {
            println!("@{} ({})", user.username, user.display);
            if !user.bio.is_empty() {
                println!("  {}", user.bio);
            }
            println!("  {} unread notifications", engine.unread_count());
        }
        None => println!("Not logged in"),
    }
    Ok(())
}
