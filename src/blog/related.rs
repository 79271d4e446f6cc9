//! Related posts: other published posts sharing at least one tag.

use crate::db::models::{Post, PostSummary};
use crate::store::{ContentStore, PostFilter, PostOrder, StoreError};

pub const RELATED_POSTS_LIMIT: i64 = 3;

/// Up to `limit` published posts other than `post` that share a tag with it,
/// most recently published first. A post without tags has no related posts.
pub async fn find_related(
    store: &dyn ContentStore,
    post: &Post,
    limit: i64,
) -> Result<Vec<PostSummary>, StoreError> {
    if post.tags.is_empty() || limit <= 0 {
        return Ok(Vec::new());
    }

    let filter = PostFilter {
        any_tags: post.tags.clone(),
        exclude_id: Some(post.id),
        ..PostFilter::published()
    };

    let related = store
        .list_page(0, limit, &filter, PostOrder::RecentlyPublished)
        .await?;

    Ok(related.into_iter().map(PostSummary::from).collect())
}
