//! View resolution: navigation target to ordered post list.
//!
//! A navigation target is a closed set of feeds rather than a parsed
//! prefix string; the string grammar (`home`, `latest`, `profile:@name`,
//! `thread:<id>`, `search:<query>`, `tag:<tag>`) exists only at the outer
//! boundary. Resolution never mutates state and never fails: unknown
//! targets simply yield an empty list.
//!
//! The final ordering is total: descending creation time, ties broken by
//! descending insertion number, so no two distinct posts ever compare
//! equal.

use crate::content::Post;
use crate::ids::PostId;
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Where a feed is looked at from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedTarget {
    /// The default feed. Currently the full global post set, identical to
    /// `Latest` (there is no following graph).
    Home,
    /// All posts, newest first.
    Latest,
    /// Posts authored by one user.
    Profile(String),
    /// A root post and its direct replies.
    Thread(PostId),
    /// Posts matching a free-text query.
    Search(String),
    /// Posts carrying a tag.
    Tag(String),
}

impl FeedTarget {
    /// Parses the route grammar. Returns `None` for anything outside it.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "home" => Some(Self::Home),
            "latest" => Some(Self::Latest),
            _ => {
                if let Some(rest) = raw.strip_prefix("profile:@") {
                    (!rest.is_empty()).then(|| Self::Profile(rest.to_string()))
                } else if let Some(rest) = raw.strip_prefix("thread:") {
                    (!rest.is_empty()).then(|| Self::Thread(PostId::from(rest)))
                } else if let Some(rest) = raw.strip_prefix("search:") {
                    Some(Self::Search(rest.to_string()))
                } else if let Some(rest) = raw.strip_prefix("tag:") {
                    let tag = rest.trim_start_matches('#').to_lowercase();
                    (!tag.is_empty()).then(|| Self::Tag(tag))
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for FeedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedTarget::Home => write!(f, "home"),
            FeedTarget::Latest => write!(f, "latest"),
            FeedTarget::Profile(username) => write!(f, "profile:@{}", username),
            FeedTarget::Thread(id) => write!(f, "thread:{}", id),
            FeedTarget::Search(query) => write!(f, "search:{}", query),
            FeedTarget::Tag(tag) => write!(f, "tag:{}", tag),
        }
    }
}

/// Feed filter options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedOptions {
    /// Drop posts without a media attachment.
    pub media_only: bool,
}

/// Resolves a navigation target into an ordered post list.
///
/// Read-only and total; an unknown thread root or author yields an empty
/// list rather than an error.
pub fn resolve(state: &AppState, target: &FeedTarget, opts: &FeedOptions) -> Vec<Post> {
    let content = &state.content;

    // Candidates carry their insertion number for the ordering tie-break.
    let mut picked: Vec<(usize, &Post)> = match target {
        FeedTarget::Home | FeedTarget::Latest => content.posts().iter().enumerate().collect(),
        FeedTarget::Profile(username) => content
            .posts()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.author_username == *username)
            .collect(),
        FeedTarget::Thread(root_id) => {
            if content.find_by_id(root_id).is_none() {
                Vec::new()
            } else {
                content
                    .posts()
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.id == *root_id || p.in_reply_to_id.as_ref() == Some(root_id))
                    .collect()
            }
        }
        FeedTarget::Search(query) => indexed_hits(state, content.search(query)),
        FeedTarget::Tag(tag) => indexed_hits(state, content.search(tag)),
    };

    if opts.media_only {
        picked.retain(|(_, p)| p.has_media());
    }

    picked.sort_by(|(seq_a, a), (seq_b, b)| {
        b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
    });
    picked.into_iter().map(|(_, p)| p.clone()).collect()
}

fn indexed_hits<'a>(state: &'a AppState, hits: Vec<&'a Post>) -> Vec<(usize, &'a Post)> {
    let ids: HashSet<&PostId> = hits.iter().map(|p| &p.id).collect();
    state
        .content
        .posts()
        .iter()
        .enumerate()
        .filter(|(_, p)| ids.contains(&p.id))
        .collect()
}
