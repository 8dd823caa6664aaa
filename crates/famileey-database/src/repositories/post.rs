//! Post repository.

use tracing::warn;

use famileey_core::result::AppResult;
use famileey_core::traits::store::KeyValueStore;
use famileey_core::types::id::{PostId, UserId};
use famileey_entity::post::Post;

use crate::store::StoreManager;

const POSTS: &str = "posts";

/// Repository for posts stored at `posts/{postId}`.
#[derive(Debug, Clone)]
pub struct PostRepository {
    store: StoreManager,
}

impl PostRepository {
    pub fn new(store: StoreManager) -> Self {
        Self { store }
    }

    /// Store a new post under a generated id.
    pub async fn create(&self, post: &Post) -> AppResult<PostId> {
        let id = PostId::new();
        self.store.set_json(&format!("{POSTS}/{id}"), post).await?;
        Ok(id)
    }

    pub async fn find_by_id(&self, id: &PostId) -> AppResult<Option<Post>> {
        self.store.get_json(&format!("{POSTS}/{id}")).await
    }

    /// All posts ordered by timestamp ascending.
    pub async fn find_all(&self) -> AppResult<Vec<(PostId, Post)>> {
        let children = self.store.get_ordered(POSTS, "timestamp").await?;
        let mut posts = Vec::with_capacity(children.len());
        for (id, raw) in children {
            match serde_json::from_value::<Post>(raw) {
                Ok(post) => posts.push((PostId::from(id), post)),
                Err(e) => warn!(post_id = %id, error = %e, "Skipping malformed post record"),
            }
        }
        Ok(posts)
    }

    /// Posts owned by `uid`, ordered by timestamp ascending.
    pub async fn find_by_owner(&self, uid: &UserId) -> AppResult<Vec<(PostId, Post)>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|(_, post)| &post.uid == uid)
            .collect())
    }
}
