//! Chirp command line interface.
//!
//! A tiny social feed that lives in a local database: post, reply, like,
//! search, and read notifications from the terminal.

use chirp::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "chirp=info".into()))
        .init();

    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
