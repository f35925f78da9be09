//! Posts and the content store.
//!
//! The store keeps every post in one creation-ordered sequence; the
//! position in that sequence is the insertion number used to break
//! ordering ties in views. An id index is maintained alongside for O(1)
//! lookup and rebuilt when state is restored from a snapshot.
//!
//! Reply links are bidirectional: a reply carries `in_reply_to_id` and the
//! parent's `reply_ids` carries the reply. Both sides are written in the
//! same operation, never independently.

use crate::annotate::extract_tags;
use crate::error::{ChirpError, Result};
use crate::ids::{IdSource, PostId};
use crate::registry::User;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Advisory maximum post length in UTF-16 code units. Not enforced by the
/// store; the presentation layer uses it for its character counter.
pub const MAX_POST_CHARS: usize = 280;

/// A short message, either a root post or a reply within a thread.
///
/// Author display and avatar are snapshotted at creation time and are not
/// updated when the author later edits their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Opaque unique identifier.
    pub id: PostId,
    /// Author handle, denormalized at creation. Immutable.
    pub author_username: String,
    /// Author display label as of creation time.
    pub author_display: String,
    /// Author avatar reference as of creation time.
    pub author_avatar_ref: String,
    /// Free message text.
    pub content: String,
    /// Optional media attachment reference.
    pub media_ref: Option<String>,
    /// Parent post for replies; `None` for root posts.
    pub in_reply_to_id: Option<PostId>,
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Usernames that currently like this post.
    pub liked_by: BTreeSet<String>,
    /// Ids of direct replies, in creation order. Append-only.
    pub reply_ids: Vec<PostId>,
}

impl Post {
    /// Builds a post snapshot for the given author, denormalizing the
    /// author's display and avatar as of now.
    pub fn compose(
        id: PostId,
        author: &User,
        content: String,
        media_ref: Option<String>,
        in_reply_to_id: Option<PostId>,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            author_username: author.username.clone(),
            author_display: author.display.clone(),
            author_avatar_ref: author.avatar_ref.clone(),
            content,
            media_ref,
            in_reply_to_id,
            created_at,
            liked_by: BTreeSet::new(),
            reply_ids: Vec::new(),
        }
    }

    /// True when the post carries a non-empty media reference.
    pub fn has_media(&self) -> bool {
        self.media_ref.as_deref().is_some_and(|m| !m.is_empty())
    }
}

/// Stores posts and maintains thread-reply links.
#[derive(Debug, Default)]
pub struct ContentStore {
    /// All posts in creation order.
    posts: Vec<Post>,
    /// Post id to position in `posts`.
    index: HashMap<PostId, usize>,
}

impl ContentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from restored posts, assuming creation order.
    pub fn from_posts(posts: Vec<Post>) -> Self {
        let index = posts
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id.clone(), idx))
            .collect();
        Self { posts, index }
    }

    /// All posts in creation order.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Number of stored posts.
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// True when no posts are stored.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Looks up a post by id.
    pub fn find_by_id(&self, id: &PostId) -> Option<&Post> {
        self.index.get(id).map(|&idx| &self.posts[idx])
    }

    /// Returns the insertion number of a post, if stored.
    pub fn insertion_seq(&self, id: &PostId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Creates a post, linking it into the parent thread when
    /// `in_reply_to` is set.
    ///
    /// The author must already exist in the registry; the engine
    /// guarantees this by resolving the session user first. Validation
    /// happens before any write, so a failed call inserts nothing.
    ///
    /// # Errors
    /// Returns `NotFound` when `in_reply_to` references an unknown post.
    pub fn create_post(
        &mut self,
        author: &User,
        content: String,
        media_ref: Option<String>,
        in_reply_to: Option<PostId>,
        ids: &mut dyn IdSource,
        now: u64,
    ) -> Result<&Post> {
        let parent_idx = match &in_reply_to {
            Some(parent_id) => match self.index.get(parent_id) {
                Some(&idx) => Some(idx),
                None => {
                    return Err(ChirpError::not_found(format!("post '{}'", parent_id)));
                }
            },
            None => None,
        };

        let post = Post::compose(
            PostId::new(ids.next_id()),
            author,
            content,
            media_ref,
            in_reply_to,
            now,
        );
        debug!(post_id = %post.id, author = %post.author_username, reply = parent_idx.is_some(), "storing post");

        if let Some(idx) = parent_idx {
            self.posts[idx].reply_ids.push(post.id.clone());
        }
        let idx = self.posts.len();
        self.index.insert(post.id.clone(), idx);
        self.posts.push(post);
        Ok(&self.posts[idx])
    }

    /// Toggles `username`'s like on a post and returns the resulting
    /// state: `true` when the post is now liked by that user.
    ///
    /// # Errors
    /// Returns `NotFound` when the post does not exist.
    pub fn toggle_like(&mut self, id: &PostId, username: &str) -> Result<bool> {
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| ChirpError::not_found(format!("post '{}'", id)))?;
        let post = &mut self.posts[idx];
        if post.liked_by.remove(username) {
            Ok(false)
        } else {
            post.liked_by.insert(username.to_string());
            Ok(true)
        }
    }

    /// Case-insensitive search over post content and extracted tags.
    ///
    /// A post matches when its content contains the lowercased query as a
    /// substring, or any of its tags does. Results keep the global
    /// sequence order; ranking is left to callers.
    pub fn search(&self, query: &str) -> Vec<&Post> {
        let q = query.to_lowercase();
        self.posts
            .iter()
            .filter(|p| {
                p.content.to_lowercase().contains(&q)
                    || extract_tags(&p.content).iter().any(|t| t.contains(&q))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CounterIds;
    use crate::ids::UserId;

    fn author(name: &str) -> User {
        User {
            id: UserId::from(name),
            email: None,
            username: name.to_string(),
            display: format!("{} Display", name),
            bio: String::new(),
            avatar_ref: format!("http://img/{}.png", name),
            credential_secret: None,
        }
    }

    fn store_with_root() -> (ContentStore, CounterIds, PostId) {
        let mut store = ContentStore::new();
        let mut ids = CounterIds::new();
        let root = store
            .create_post(&author("amy"), "root post".into(), None, None, &mut ids, 100)
            .expect("Failed to create root post")
            .id
            .clone();
        (store, ids, root)
    }

    #[test]
    fn test_create_post_denormalizes_author() {
        let (store, _, root) = store_with_root();
        let post = store.find_by_id(&root).expect("root missing");
        assert_eq!(post.author_username, "amy");
        assert_eq!(post.author_display, "amy Display");
        assert_eq!(post.author_avatar_ref, "http://img/amy.png");
        assert_eq!(post.created_at, 100);
        assert!(post.in_reply_to_id.is_none());
        assert!(post.reply_ids.is_empty());
    }

    #[test]
    fn test_reply_links_both_directions() {
        let (mut store, mut ids, root) = store_with_root();
        let reply_id = store
            .create_post(
                &author("bob"),
                "a reply".into(),
                None,
                Some(root.clone()),
                &mut ids,
                200,
            )
            .expect("Failed to create reply")
            .id
            .clone();

        let parent = store.find_by_id(&root).expect("root missing");
        assert_eq!(parent.reply_ids, vec![reply_id.clone()]);
        let reply = store.find_by_id(&reply_id).expect("reply missing");
        assert_eq!(reply.in_reply_to_id.as_ref(), Some(&root));
    }

    #[test]
    fn test_reply_to_unknown_parent_inserts_nothing() {
        let (mut store, mut ids, _) = store_with_root();
        let before = store.len();
        let err = store
            .create_post(
                &author("bob"),
                "orphan".into(),
                None,
                Some(PostId::from("missing")),
                &mut ids,
                200,
            )
            .unwrap_err();
        assert!(matches!(err, ChirpError::NotFound(_)));
        assert_eq!(store.len(), before);
    }

    #[test]
    fn test_toggle_like_roundtrip() {
        let (mut store, _, root) = store_with_root();

        assert!(store.toggle_like(&root, "bob").expect("like failed"));
        assert!(store
            .find_by_id(&root)
            .expect("root")
            .liked_by
            .contains("bob"));

        assert!(!store.toggle_like(&root, "bob").expect("unlike failed"));
        assert!(store.find_by_id(&root).expect("root").liked_by.is_empty());
    }

    #[test]
    fn test_toggle_like_unknown_post() {
        let (mut store, _, _) = store_with_root();
        let err = store.toggle_like(&PostId::from("missing"), "bob").unwrap_err();
        assert!(matches!(err, ChirpError::NotFound(_)));
    }

    #[test]
    fn test_search_matches_content_case_insensitively() {
        let (mut store, mut ids, _) = store_with_root();
        store
            .create_post(
                &author("bob"),
                "Shipping the Parser today".into(),
                None,
                None,
                &mut ids,
                200,
            )
            .expect("Failed to create post");

        let hits = store.search("pArSeR");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].author_username, "bob");
    }

    #[test]
    fn test_search_matches_tags_by_substring() {
        let (mut store, mut ids, _) = store_with_root();
        store
            .create_post(
                &author("bob"),
                "day one #GameDev".into(),
                None,
                None,
                &mut ids,
                200,
            )
            .expect("Failed to create post");

        // Tag is stored lowercased, query matched as substring of it.
        let hits = store.search("gamedev");
        assert_eq!(hits.len(), 1);
        let hits = store.search("game");
        assert_eq!(hits.len(), 1);
        let hits = store.search("chess");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_search_preserves_sequence_order() {
        let (mut store, mut ids, _) = store_with_root();
        for i in 0..3 {
            store
                .create_post(
                    &author("bob"),
                    format!("common {}", i),
                    None,
                    None,
                    &mut ids,
                    200 + i,
                )
                .expect("Failed to create post");
        }
        let hits = store.search("common");
        let texts: Vec<&str> = hits.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(texts, vec!["common 0", "common 1", "common 2"]);
    }

    #[test]
    fn test_from_posts_rebuilds_index() {
        let (store, _, root) = store_with_root();
        let rebuilt = ContentStore::from_posts(store.posts().to_vec());
        assert_eq!(rebuilt.len(), 1);
        assert!(rebuilt.find_by_id(&root).is_some());
        assert_eq!(rebuilt.insertion_seq(&root), Some(0));
    }

    #[test]
    fn test_has_media_treats_empty_ref_as_absent() {
        let mut post = Post::compose(
            PostId::from("p"),
            &author("amy"),
            "text".into(),
            Some(String::new()),
            None,
            1,
        );
        assert!(!post.has_media());
        post.media_ref = Some("http://img/x.png".into());
        assert!(post.has_media());
        post.media_ref = None;
        assert!(!post.has_media());
    }
}
