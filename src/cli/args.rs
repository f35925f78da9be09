//! Command-line argument parsing for the chirp CLI.

use std::env;
use std::process;

use crate::ids::PostId;

/// Command-line interface commands
#[derive(Debug)]
pub enum Command {
    Feed {
        route: String,
        media_only: bool,
    },
    Post {
        text: String,
        media_ref: Option<String>,
    },
    Reply {
        post_id: PostId,
        text: String,
    },
    Like {
        post_id: PostId,
    },
    Search {
        query: String,
    },
    Register {
        email: String,
        username: String,
        password: Option<String>,
    },
    Login {
        identifier: String,
        password: Option<String>,
    },
    Logout,
    Profile {
        display: String,
        bio: String,
        avatar_ref: Option<String>,
    },
    Notifications {
        mark_read: bool,
    },
    Whoami,
}

/// Parse command line arguments into a Command
pub fn parse_args() -> Command {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "feed" => {
            let mut route = "home".to_string();
            let mut media_only = false;
            for arg in &args[2..] {
                if arg == "--media-only" {
                    media_only = true;
                } else {
                    route = arg.clone();
                }
            }
            Command::Feed { route, media_only }
        }
        "post" => {
            if args.len() < 3 {
                eprintln!("Error: post requires the message text");
                eprintln!("Usage: chirp post <text> [--media <url>]");
                process::exit(1);
            }
            let text = args[2].clone();
            let media_ref = flag_value(&args[3..], "--media");
            Command::Post { text, media_ref }
        }
        "reply" => {
            if args.len() < 4 {
                eprintln!("Error: reply requires a post id and the message text");
                eprintln!("Usage: chirp reply <post_id> <text>");
                process::exit(1);
            }
            Command::Reply {
                post_id: PostId::new(args[2].clone()),
                text: args[3].clone(),
            }
        }
        "like" => {
            if args.len() < 3 {
                eprintln!("Error: like requires a post id");
                eprintln!("Usage: chirp like <post_id>");
                process::exit(1);
            }
            Command::Like {
                post_id: PostId::new(args[2].clone()),
            }
        }
        "search" => {
            if args.len() < 3 {
                eprintln!("Error: search requires a query");
                eprintln!("Usage: chirp search <query>");
                process::exit(1);
            }
            Command::Search {
                query: args[2].clone(),
            }
        }
        "register" => {
            if args.len() < 4 {
                eprintln!("Error: register requires an email and a username");
                eprintln!("Usage: chirp register <email> <username> [password]");
                process::exit(1);
            }
            Command::Register {
                email: args[2].clone(),
                username: args[3].clone(),
                password: args.get(4).cloned(),
            }
        }
        "login" => {
            if args.len() < 3 {
                eprintln!("Error: login requires a username or email");
                eprintln!("Usage: chirp login <identifier> [password]");
                process::exit(1);
            }
            Command::Login {
                identifier: args[2].clone(),
                password: args.get(3).cloned(),
            }
        }
        "logout" => Command::Logout,
        "profile" => {
            if args.len() < 4 {
                eprintln!("Error: profile requires a display name and a bio");
                eprintln!("Usage: chirp profile <display> <bio> [avatar_url]");
                process::exit(1);
            }
            Command::Profile {
                display: args[2].clone(),
                bio: args[3].clone(),
                avatar_ref: args.get(4).cloned(),
            }
        }
        "notifications" => Command::Notifications {
            mark_read: args[2..].iter().any(|a| a == "--mark-read"),
        },
        "whoami" => Command::Whoami,
        other => {
            eprintln!("Error: unknown command '{}'", other);
            print_usage();
            process::exit(1);
        }
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .cloned()
}

fn print_usage() {
    eprintln!("chirp - a tiny social feed in your terminal");
    eprintln!();
    eprintln!("Usage: chirp <command> [arguments]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  feed [route] [--media-only]              Show a feed (home, latest,");
    eprintln!("                                           profile:@<user>, thread:<id>,");
    eprintln!("                                           search:<query>, tag:<tag>)");
    eprintln!("  post <text> [--media <url>]              Publish a post");
    eprintln!("  reply <post_id> <text>                   Reply to a post");
    eprintln!("  like <post_id>                           Toggle a like");
    eprintln!("  search <query>                           Search users and posts");
    eprintln!("  register <email> <username> [password]   Create an account");
    eprintln!("  login <identifier> [password]            Log in by username or email");
    eprintln!("  logout                                   Clear the session");
    eprintln!("  profile <display> <bio> [avatar_url]     Update your profile");
    eprintln!("  notifications [--mark-read]              List notifications");
    eprintln!("  whoami                                   Show the session user");
    eprintln!();
    eprintln!("Data directory: $CHIRP_DATA (default ./chirp_data)");
}
