//! Post lifecycle: creation, edits, publication state, lookups and listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::markdown::{render_document, RenderOptions};
use super::reading_time::reading_time_minutes;
use super::related::{find_related, RELATED_POSTS_LIMIT};
use super::slug::{ensure_unique_slug, generate_slug, FALLBACK_SLUG};
use super::tags::{aggregate_tags, normalize_tags, TagCount};
use super::toc::TocEntry;
use crate::db::models::{Post, PostSummary};
use crate::error::BlogError;
use crate::store::{ContentStore, PostFilter, PostOrder};

/// Excerpts and SEO descriptions derived from the title are cut to this many characters.
pub const DERIVED_TEXT_LIMIT: usize = 160;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const SEARCH_LIMIT: i64 = 10;

/// Author-supplied fields for create and update.
///
/// Everything is optional at the type level so that a missing title or
/// content surfaces as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub published: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub seo_keywords: Option<Vec<String>>,
}

/// How a post is addressed: by its internal id or by its public slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostKey {
    Id(Uuid),
    Slug(String),
}

impl PostKey {
    /// Only the canonical hyphenated UUID form counts as an id.
    pub fn parse(raw: &str) -> Self {
        match Uuid::try_parse(raw) {
            Ok(id) if raw.len() == 36 => PostKey::Id(id),
            _ => PostKey::Slug(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery<'a> {
    pub page: i64,
    pub page_size: i64,
    pub tag: Option<&'a str>,
    pub include_unpublished: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<PostSummary>,
    pub total_posts: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

/// A post plus the ephemeral, never-persisted rendering of its content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(default)]
    pub toc: Vec<TocEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub post: PostView,
    pub related_posts: Vec<PostSummary>,
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `published_at` is written once: the first time the post is published.
fn publication_time(
    current: Option<DateTime<Utc>>,
    published: bool,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match current {
        Some(at) => Some(at),
        None if published => Some(now),
        None => None,
    }
}

/// Ceiling division; an empty result set has zero pages.
fn total_pages(total: i64, page_size: i64) -> i64 {
    (total + page_size - 1) / page_size
}

/// Title and content after validation, with the author's optional fields.
struct ValidatedInput {
    title: String,
    content: String,
    slug: Option<String>,
    excerpt: Option<String>,
    cover_image: Option<String>,
    published: Option<bool>,
    tags: Option<Vec<String>>,
    seo_title: Option<String>,
    seo_description: Option<String>,
    seo_keywords: Option<Vec<String>>,
}

impl ValidatedInput {
    fn from_input(input: PostInput) -> Result<Self, BlogError> {
        let (Some(title), Some(content)) = (non_blank(input.title), input.content) else {
            return Err(BlogError::validation("Title and content are required"));
        };
        if content.trim().is_empty() {
            return Err(BlogError::validation("Title and content are required"));
        }

        Ok(Self {
            title,
            content,
            slug: non_blank(input.slug),
            excerpt: non_blank(input.excerpt),
            cover_image: non_blank(input.cover_image),
            published: input.published,
            tags: input.tags,
            seo_title: non_blank(input.seo_title),
            seo_description: non_blank(input.seo_description),
            seo_keywords: input.seo_keywords,
        })
    }

    fn excerpt(&self) -> String {
        self.excerpt
            .clone()
            .unwrap_or_else(|| truncate_chars(&self.title, DERIVED_TEXT_LIMIT))
    }

    fn seo_title(&self) -> String {
        self.seo_title.clone().unwrap_or_else(|| self.title.clone())
    }

    fn seo_description(&self) -> String {
        self.seo_description
            .clone()
            .or_else(|| self.excerpt.clone())
            .unwrap_or_else(|| truncate_chars(&self.title, DERIVED_TEXT_LIMIT))
    }
}

/// Owns the publication state machine and the listing contract.
///
/// Holds no per-request state; every collaborator is injected.
#[derive(Clone)]
pub struct BlogService {
    store: Arc<dyn ContentStore>,
    render_options: RenderOptions,
}

impl BlogService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self::with_render_options(store, RenderOptions::default())
    }

    pub fn with_render_options(store: Arc<dyn ContentStore>, render_options: RenderOptions) -> Self {
        Self {
            store,
            render_options,
        }
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    /// Slugifies `requested` (or the title when absent) and disambiguates it.
    async fn resolve_slug(
        &self,
        requested: Option<&str>,
        title: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<String, BlogError> {
        let candidate = requested
            .map(generate_slug)
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| generate_slug(title));
        let candidate = if candidate.is_empty() {
            FALLBACK_SLUG.to_string()
        } else {
            candidate
        };

        Ok(ensure_unique_slug(self.store.as_ref(), &candidate, exclude_id).await?)
    }

    pub async fn create(&self, input: PostInput) -> Result<Post, BlogError> {
        let input = ValidatedInput::from_input(input)?;
        let slug = self
            .resolve_slug(input.slug.as_deref(), &input.title, None)
            .await?;

        let now = Utc::now();
        let published = input.published.unwrap_or(false);
        let post = Post {
            id: Uuid::new_v4(),
            slug,
            excerpt: input.excerpt(),
            seo_title: input.seo_title(),
            seo_description: input.seo_description(),
            reading_time: reading_time_minutes(&input.content),
            tags: normalize_tags(input.tags.unwrap_or_default()),
            seo_keywords: normalize_tags(input.seo_keywords.unwrap_or_default()),
            cover_image: input.cover_image,
            published,
            published_at: publication_time(None, published, now),
            views: 0,
            created_at: now,
            updated_at: now,
            title: input.title,
            content: input.content,
        };

        let created = self.store.insert(&post).await?;
        tracing::info!(post_id = %created.id, slug = %created.slug, published, "blog post created");
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, input: PostInput) -> Result<Post, BlogError> {
        let input = ValidatedInput::from_input(input)?;
        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(BlogError::NotFound("Post"))?;

        // The slug only moves when the author asked for a different one or retitled the post.
        let slug = match input.slug.as_deref() {
            Some(requested) if generate_slug(requested) == existing.slug => existing.slug.clone(),
            Some(requested) => {
                self.resolve_slug(Some(requested), &input.title, Some(id))
                    .await?
            }
            None if input.title == existing.title => existing.slug.clone(),
            None => self.resolve_slug(None, &input.title, Some(id)).await?,
        };

        let now = Utc::now();
        let published = input.published.unwrap_or(existing.published);
        let post = Post {
            slug,
            excerpt: input.excerpt(),
            seo_title: input.seo_title(),
            seo_description: input.seo_description(),
            reading_time: reading_time_minutes(&input.content),
            tags: normalize_tags(input.tags.unwrap_or_default()),
            seo_keywords: normalize_tags(input.seo_keywords.unwrap_or_default()),
            cover_image: input.cover_image,
            published,
            published_at: publication_time(existing.published_at, published, now),
            updated_at: now,
            title: input.title,
            content: input.content,
            ..existing
        };

        let updated = self
            .store
            .update(&post)
            .await?
            .ok_or(BlogError::NotFound("Post"))?;
        tracing::info!(post_id = %id, slug = %updated.slug, published, "blog post updated");
        Ok(updated)
    }

    /// Publish/unpublish toggle. Content fields are left alone.
    pub async fn set_status(&self, id: Uuid, published: bool) -> Result<Post, BlogError> {
        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(BlogError::NotFound("Post"))?;

        let now = Utc::now();
        let post = Post {
            published,
            published_at: publication_time(existing.published_at, published, now),
            updated_at: now,
            ..existing
        };

        let updated = self
            .store
            .update(&post)
            .await?
            .ok_or(BlogError::NotFound("Post"))?;
        tracing::info!(post_id = %id, published, "blog post status updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), BlogError> {
        if !self.store.delete(id).await? {
            tracing::warn!(post_id = %id, "delete of unknown blog post");
            return Err(BlogError::NotFound("Post"));
        }
        tracing::info!(post_id = %id, "blog post deleted");
        Ok(())
    }

    /// Edit-mode lookup: drafts included, nothing rendered, no view counted.
    pub async fn get_for_edit(&self, id: Uuid) -> Result<Post, BlogError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(BlogError::NotFound("Post"))
    }

    /// Resolves `raw_key` as an id or a slug.
    ///
    /// An admin addressing a post by id gets the edit-mode view. Every other
    /// lookup only sees published posts, counts one view, and carries the
    /// rendered HTML, its table of contents and related posts.
    pub async fn get(&self, raw_key: &str, caller_is_admin: bool) -> Result<PostDetail, BlogError> {
        let key = PostKey::parse(raw_key);

        if let (PostKey::Id(id), true) = (&key, caller_is_admin) {
            let post = self.get_for_edit(*id).await?;
            return Ok(PostDetail {
                post: PostView {
                    post,
                    html_content: None,
                    toc: Vec::new(),
                },
                related_posts: Vec::new(),
            });
        }

        let found = match &key {
            PostKey::Id(id) => self.store.find_by_id(*id).await?,
            PostKey::Slug(slug) => self.store.find_by_slug(slug).await?,
        };
        let Some(mut post) = found.filter(|p| p.published) else {
            tracing::warn!(key = %raw_key, "post not found");
            return Err(BlogError::NotFound("Post"));
        };

        let rendered = render_document(&post.content, &self.render_options)?;

        self.store.increment_views(post.id).await?;
        post.views += 1;

        let related_posts = find_related(self.store.as_ref(), &post, RELATED_POSTS_LIMIT).await?;

        Ok(PostDetail {
            post: PostView {
                post,
                html_content: Some(rendered.html),
                toc: rendered.toc,
            },
            related_posts,
        })
    }

    pub async fn list(&self, query: ListQuery<'_>) -> Result<PostPage, BlogError> {
        let page = query.page.max(1);
        let page_size = query.page_size.clamp(1, MAX_PAGE_SIZE);
        // Past any representable offset there is nothing left to return.
        let offset = (page - 1).checked_mul(page_size);

        let filter = PostFilter {
            published_only: !query.include_unpublished,
            tag: query.tag.map(str::to_string),
            ..PostFilter::default()
        };
        let order = if query.include_unpublished {
            PostOrder::RecentlyUpdated
        } else {
            PostOrder::RecentlyPublished
        };

        let total_posts = self.store.count_matching(&filter).await?;
        let posts = match offset {
            Some(offset) => {
                self.store
                    .list_page(offset, page_size, &filter, order)
                    .await?
            }
            None => Vec::new(),
        };

        Ok(PostPage {
            posts: posts.into_iter().map(PostSummary::from).collect(),
            total_posts,
            total_pages: total_pages(total_posts, page_size),
            current_page: page,
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<PostSummary>, BlogError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BlogError::validation("Search query is required"));
        }

        let hits = self.store.search(query, SEARCH_LIMIT).await?;
        Ok(hits.into_iter().map(PostSummary::from).collect())
    }

    pub async fn related(&self, post: &Post, limit: i64) -> Result<Vec<PostSummary>, BlogError> {
        Ok(find_related(self.store.as_ref(), post, limit).await?)
    }

    pub async fn tags(&self) -> Result<Vec<TagCount>, BlogError> {
        let tag_sets = self.store.published_tag_sets().await?;
        Ok(aggregate_tags(tag_sets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryContentStore;

    fn service() -> BlogService {
        BlogService::new(Arc::new(MemoryContentStore::new()))
    }

    fn input(title: &str, content: &str, published: bool) -> PostInput {
        PostInput {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            published: Some(published),
            ..PostInput::default()
        }
    }

    fn tagged(title: &str, tags: &[&str]) -> PostInput {
        PostInput {
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            ..input(title, "Some content", true)
        }
    }

    #[test]
    fn test_post_key_parse() {
        let id = Uuid::new_v4();
        assert_eq!(PostKey::parse(&id.to_string()), PostKey::Id(id));
        assert_eq!(
            PostKey::parse("hello-world"),
            PostKey::Slug("hello-world".into())
        );
        // 32 hex characters is a valid slug, not an id.
        let simple = id.simple().to_string();
        assert_eq!(PostKey::parse(&simple), PostKey::Slug(simple.clone()));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let svc = service();
        let err = svc.create(input("", "body", false)).await.unwrap_err();
        assert!(matches!(err, BlogError::Validation(_)));

        let err = svc
            .create(PostInput {
                title: Some("Title".into()),
                ..PostInput::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_defaults() {
        let svc = service();
        let post = svc
            .create(PostInput {
                tags: Some(vec![" rust ".into(), "rust".into(), "web".into()]),
                ..input("Hello, World!", "Body text", false)
            })
            .await
            .unwrap();

        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.excerpt, "Hello, World!");
        assert_eq!(post.seo_title, "Hello, World!");
        assert_eq!(post.seo_description, "Hello, World!");
        assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
        assert_eq!(post.reading_time, 1);
        assert!(!post.published);
        assert!(post.published_at.is_none());
    }

    #[tokio::test]
    async fn test_create_published_sets_published_at() {
        let post = service().create(input("Live", "Body", true)).await.unwrap();
        assert!(post.published);
        assert!(post.published_at.is_some());
    }

    #[tokio::test]
    async fn test_create_colliding_title_gets_distinct_slug() {
        let svc = service();
        let first = svc.create(input("Same Title", "One", true)).await.unwrap();
        let second = svc.create(input("Same Title", "Two", true)).await.unwrap();
        assert_eq!(first.slug, "same-title");
        assert_ne!(second.slug, first.slug);
        assert!(second.slug.starts_with("same-title-"));
    }

    #[tokio::test]
    async fn test_create_normalizes_requested_slug() {
        let post = service()
            .create(PostInput {
                slug: Some("My Custom Slug!".into()),
                ..input("Title", "Body", false)
            })
            .await
            .unwrap();
        assert_eq!(post.slug, "my-custom-slug");
    }

    #[tokio::test]
    async fn test_symbol_only_title_uses_fallback_slug() {
        let post = service().create(input("???", "Body", false)).await.unwrap();
        assert_eq!(post.slug, FALLBACK_SLUG);
    }

    #[tokio::test]
    async fn test_published_at_is_set_once() {
        let svc = service();
        let draft = svc.create(input("Draft", "Body", false)).await.unwrap();
        assert!(draft.published_at.is_none());

        let published = svc.set_status(draft.id, true).await.unwrap();
        let first_published_at = published.published_at.expect("published_at set");

        let unpublished = svc.set_status(draft.id, false).await.unwrap();
        assert!(!unpublished.published);
        assert_eq!(unpublished.published_at, Some(first_published_at));

        let republished = svc.set_status(draft.id, true).await.unwrap();
        assert_eq!(republished.published_at, Some(first_published_at));
    }

    #[tokio::test]
    async fn test_update_publishing_draft_sets_published_at_and_refreshes_updated_at() {
        let svc = service();
        let draft = svc.create(input("Draft", "Body", false)).await.unwrap();

        let updated = svc
            .update(draft.id, input("Draft", "New body", true))
            .await
            .unwrap();
        assert!(updated.published);
        assert!(updated.published_at.is_some());
        assert!(updated.updated_at >= draft.updated_at);
        assert_eq!(updated.content, "New body");
        assert_eq!(updated.created_at, draft.created_at);

        let again = svc
            .update(draft.id, input("Draft", "Newer body", true))
            .await
            .unwrap();
        assert_eq!(again.published_at, updated.published_at);
    }

    #[tokio::test]
    async fn test_update_without_published_keeps_state() {
        let svc = service();
        let post = svc.create(input("Live", "Body", true)).await.unwrap();
        let updated = svc
            .update(
                post.id,
                PostInput {
                    published: None,
                    ..input("Live", "Edited", true)
                },
            )
            .await
            .unwrap();
        assert!(updated.published);
    }

    #[tokio::test]
    async fn test_update_keeps_slug_when_title_unchanged() {
        let svc = service();
        svc.create(input("Clash", "One", true)).await.unwrap();
        let second = svc.create(input("Clash", "Two", true)).await.unwrap();
        let disambiguated = second.slug.clone();

        let updated = svc
            .update(second.id, input("Clash", "Edited", true))
            .await
            .unwrap();
        assert_eq!(updated.slug, disambiguated);
    }

    #[tokio::test]
    async fn test_update_retitle_recomputes_slug() {
        let svc = service();
        let post = svc.create(input("Old Name", "Body", true)).await.unwrap();
        let updated = svc
            .update(post.id, input("New Name", "Body", true))
            .await
            .unwrap();
        assert_eq!(updated.slug, "new-name");
    }

    #[tokio::test]
    async fn test_update_unknown_post_is_not_found() {
        let err = service()
            .update(Uuid::new_v4(), input("Title", "Body", true))
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_then_delete_again_is_not_found() {
        let svc = service();
        let post = svc.create(input("Gone", "Body", true)).await.unwrap();
        svc.delete(post.id).await.unwrap();
        let err = svc.delete(post.id).await.unwrap_err();
        assert!(matches!(err, BlogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_public_get_increments_views_and_renders() {
        let svc = service();
        let post = svc
            .create(input("Viewed", "## Intro\n\nHello", true))
            .await
            .unwrap();

        let first = svc.get("viewed", false).await.unwrap();
        assert_eq!(first.post.post.views, 1);
        assert!(first.post.html_content.as_deref().unwrap().contains(r#"id="intro""#));
        assert_eq!(first.post.toc[0].id, "intro");

        let second = svc.get("viewed", false).await.unwrap();
        assert_eq!(second.post.post.views, 2);

        let stored = svc.get_for_edit(post.id).await.unwrap();
        assert_eq!(stored.views, 2);
    }

    #[tokio::test]
    async fn test_admin_get_by_id_does_not_count_views_and_sees_drafts() {
        let svc = service();
        let draft = svc.create(input("Hidden", "Body", false)).await.unwrap();

        let detail = svc.get(&draft.id.to_string(), true).await.unwrap();
        assert_eq!(detail.post.post.id, draft.id);
        assert!(detail.post.html_content.is_none());
        assert_eq!(svc.get_for_edit(draft.id).await.unwrap().views, 0);
    }

    #[tokio::test]
    async fn test_drafts_are_hidden_from_public_lookups() {
        let svc = service();
        let draft = svc.create(input("Hidden", "Body", false)).await.unwrap();

        let by_slug = svc.get("hidden", false).await.unwrap_err();
        assert!(matches!(by_slug, BlogError::NotFound(_)));
        let by_id = svc.get(&draft.id.to_string(), false).await.unwrap_err();
        assert!(matches!(by_id, BlogError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_includes_related_posts() {
        let svc = service();
        svc.create(tagged("Main", &["rust"])).await.unwrap();
        svc.create(tagged("Sibling", &["rust"])).await.unwrap();
        svc.create(tagged("Stranger", &["go"])).await.unwrap();

        let detail = svc.get("main", false).await.unwrap();
        let slugs: Vec<_> = detail.related_posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["sibling"]);
    }

    #[tokio::test]
    async fn test_list_paginates_published_posts() {
        let svc = service();
        for i in 0..25 {
            svc.create(input(&format!("Post {}", i), "Body", true))
                .await
                .unwrap();
        }
        svc.create(input("Unpublished", "Body", false)).await.unwrap();

        let query = ListQuery {
            page: 1,
            page_size: 10,
            tag: None,
            include_unpublished: false,
        };
        let first = svc.list(query).await.unwrap();
        assert_eq!(first.total_posts, 25);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.posts.len(), 10);

        let last = svc.list(ListQuery { page: 3, ..query }).await.unwrap();
        assert_eq!(last.posts.len(), 5);
        assert_eq!(last.current_page, 3);

        let admin = svc
            .list(ListQuery {
                include_unpublished: true,
                ..query
            })
            .await
            .unwrap();
        assert_eq!(admin.total_posts, 26);
    }

    #[tokio::test]
    async fn test_list_far_past_the_end_is_empty() {
        let svc = service();
        svc.create(input("Only", "Body", true)).await.unwrap();

        let page = svc
            .list(ListQuery {
                page: i64::MAX,
                page_size: 10,
                tag: None,
                include_unpublished: false,
            })
            .await
            .unwrap();
        assert!(page.posts.is_empty());
        assert_eq!(page.total_posts, 1);
        assert_eq!(page.current_page, i64::MAX);
    }

    #[tokio::test]
    async fn test_admin_list_orders_by_last_update() {
        let svc = service();
        let older = svc.create(input("Older", "Body", false)).await.unwrap();
        svc.create(input("Newer", "Body", true)).await.unwrap();

        svc.update(older.id, input("Older", "Edited body", false))
            .await
            .unwrap();

        let page = svc
            .list(ListQuery {
                page: 1,
                page_size: 10,
                tag: None,
                include_unpublished: true,
            })
            .await
            .unwrap();
        let slugs: Vec<_> = page.posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["older", "newer"]);
    }

    #[tokio::test]
    async fn test_list_clamps_page_and_size() {
        let svc = service();
        svc.create(input("Only", "Body", true)).await.unwrap();
        let page = svc
            .list(ListQuery {
                page: 0,
                page_size: 1000,
                tag: None,
                include_unpublished: false,
            })
            .await
            .unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_tag() {
        let svc = service();
        svc.create(tagged("Rusty", &["rust"])).await.unwrap();
        svc.create(tagged("Gopher", &["go"])).await.unwrap();

        let page = svc
            .list(ListQuery {
                page: 1,
                page_size: 10,
                tag: Some("rust"),
                include_unpublished: false,
            })
            .await
            .unwrap();
        assert_eq!(page.total_posts, 1);
        assert_eq!(page.posts[0].slug, "rusty");
    }

    #[tokio::test]
    async fn test_search_matches_published_only_and_handles_no_hits() {
        let svc = service();
        svc.create(input("Async Rust", "Futures and executors", true))
            .await
            .unwrap();
        svc.create(input("Draft about executors", "wip", false))
            .await
            .unwrap();

        let hits = svc.search("EXECUTORS").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "async-rust");

        assert!(svc.search("nothing matches this").await.unwrap().is_empty());

        let err = svc.search("   ").await.unwrap_err();
        assert!(matches!(err, BlogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_tags_are_aggregated_over_published_posts() {
        let svc = service();
        svc.create(tagged("One", &["a", "b"])).await.unwrap();
        svc.create(tagged("Two", &["a"])).await.unwrap();
        svc.create(PostInput {
            tags: Some(vec!["hidden".into()]),
            ..input("Draft", "Body", false)
        })
        .await
        .unwrap();

        let tags = svc.tags().await.unwrap();
        assert_eq!(
            tags,
            vec![
                TagCount {
                    name: "a".into(),
                    count: 2
                },
                TagCount {
                    name: "b".into(),
                    count: 1
                },
            ]
        );
    }
}
