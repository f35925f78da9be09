//! Command-line interface for chirp.
//!
//! A thin presentation layer over the engine: it parses arguments, drives
//! one engine command, and prints the result. No invariants live here.

pub mod args;
pub mod commands;
pub mod utils;

use crate::Result;
use std::process;

pub use args::Command;

/// Main entry point for the CLI application
pub fn run() -> Result<()> {
    let command = args::parse_args();

    let result = match command {
        Command::Feed { route, media_only } => commands::feed(&route, media_only),
        Command::Post { text, media_ref } => commands::post(&text, media_ref.as_deref()),
        Command::Reply { post_id, text } => commands::reply(&post_id, &text),
        Command::Like { post_id } => commands::like(&post_id),
        Command::Search { query } => commands::search(&query),
        Command::Register {
            email,
            username,
            password,
        } => commands::register(&email, &username, password.as_deref()),
        Command::Login {
            identifier,
            password,
        } => commands::login(&identifier, password.as_deref()),
        Command::Logout => commands::logout(),
        Command::Profile {
            display,
            bio,
            avatar_ref,
        } => commands::profile(&display, &bio, avatar_ref.as_deref()),
        Command::Notifications { mark_read } => commands::notifications(mark_read),
        Command::Whoami => commands::whoami(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    Ok(())
}
