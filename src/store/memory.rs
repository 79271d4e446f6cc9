use async_trait::async_trait;
use std::cmp::Reverse;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContentStore, PostFilter, PostOrder, StoreError};
use crate::db::models::Post;

/// Process-local store used when no database is configured, and by tests.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    posts: RwLock<Vec<Post>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_posts(posts: &mut [Post], order: PostOrder) {
    match order {
        PostOrder::RecentlyPublished => posts.sort_by_key(|p| {
            (
                p.published_at.is_none(),
                Reverse(p.published_at),
                Reverse(p.created_at),
            )
        }),
        PostOrder::RecentlyUpdated => posts.sort_by_key(|p| Reverse(p.updated_at)),
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<Post>, StoreError> {
        let needle = query.to_lowercase();
        let posts = self.posts.read().await;
        let mut hits: Vec<Post> = posts
            .iter()
            .filter(|p| p.published)
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.content.to_lowercase().contains(&needle)
                    || p.excerpt.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        sort_posts(&mut hits, PostOrder::RecentlyPublished);
        hits.truncate(limit.max(0) as usize);
        Ok(hits)
    }

    async fn insert(&self, post: &Post) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.slug == post.slug) {
            return Err(StoreError::Conflict(format!("slug '{}'", post.slug)));
        }
        if posts.iter().any(|p| p.id == post.id) {
            return Err(StoreError::Conflict(format!("id '{}'", post.id)));
        }
        posts.push(post.clone());
        Ok(post.clone())
    }

    async fn update(&self, post: &Post) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.slug == post.slug && p.id != post.id) {
            return Err(StoreError::Conflict(format!("slug '{}'", post.slug)));
        }
        match posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => {
                // id, created_at and views are owned by the store.
                let updated = Post {
                    id: existing.id,
                    created_at: existing.created_at,
                    views: existing.views,
                    ..post.clone()
                };
                *existing = updated.clone();
                Ok(Some(updated))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() != before)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError> {
        let mut posts = self.posts.write().await;
        if let Some(post) = posts.iter_mut().find(|p| p.id == id) {
            post.views += 1;
        }
        Ok(())
    }

    async fn count_matching(&self, filter: &PostFilter) -> Result<i64, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().filter(|p| filter.matches(p)).count() as i64)
    }

    async fn list_page(
        &self,
        offset: i64,
        limit: i64,
        filter: &PostFilter,
        order: PostOrder,
    ) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().await;
        let mut matching: Vec<Post> = posts.iter().filter(|p| filter.matches(p)).cloned().collect();
        sort_posts(&mut matching, order);
        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn published_tag_sets(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let posts = self.posts.read().await;
        let mut published: Vec<&Post> = posts.iter().filter(|p| p.published).collect();
        published.sort_by_key(|p| (Reverse(p.published_at), Reverse(p.created_at)));
        Ok(published.into_iter().map(|p| p.tags.clone()).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
