//! Content Store: the persistence collaborator behind the blog core.
//!
//! The core only ever talks to [`ContentStore`]; which backend sits behind it
//! is decided once at startup (`PgContentStore` when a database is reachable,
//! `MemoryContentStore` otherwise and in tests).

mod memory;
mod postgres;

pub use memory::MemoryContentStore;
pub use postgres::PgContentStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::models::Post;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unique constraint violated on {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Row restrictions for listing and counting. All set conditions must hold.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub published_only: bool,
    /// Tag set must contain this tag.
    pub tag: Option<String>,
    /// Tag set must share at least one of these. Empty means no restriction.
    pub any_tags: Vec<String>,
    pub exclude_id: Option<Uuid>,
}

impl PostFilter {
    pub fn published() -> Self {
        Self {
            published_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        if self.published_only && !post.published {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !post.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if !self.any_tags.is_empty() && !post.tags.iter().any(|t| self.any_tags.contains(t)) {
            return false;
        }
        if self.exclude_id == Some(post.id) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOrder {
    /// `published_at` descending, unpublished rows last, then newest created.
    RecentlyPublished,
    /// `updated_at` descending.
    RecentlyUpdated,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// Exact slug lookup, regardless of publication state.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError>;

    /// Case-insensitive substring match over title, content and excerpt of
    /// published posts, most recently published first.
    async fn search(&self, query: &str, limit: i64) -> Result<Vec<Post>, StoreError>;

    async fn insert(&self, post: &Post) -> Result<Post, StoreError>;

    /// Overwrites every mutable column of the row with `post.id`.
    /// Returns `None` when no such row exists.
    async fn update(&self, post: &Post) -> Result<Option<Post>, StoreError>;

    /// Returns `false` when no row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError>;

    async fn count_matching(&self, filter: &PostFilter) -> Result<i64, StoreError>;

    async fn list_page(
        &self,
        offset: i64,
        limit: i64,
        filter: &PostFilter,
        order: PostOrder,
    ) -> Result<Vec<Post>, StoreError>;

    /// Tag lists of every published post, most recently published first.
    async fn published_tag_sets(&self) -> Result<Vec<Vec<String>>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
