/**
 * Blog Routes
 * Public reading endpoints and the admin authoring endpoints
 */
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blog::service::DEFAULT_PAGE_SIZE;
use crate::blog::{ListQuery, PostDetail, PostInput, PostPage, TagCount};
use crate::db::models::{Post, PostSummary};
use crate::error::BlogError;
use crate::routes::caller_is_admin;
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the post listings.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub tag: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl ListParams {
    fn to_query(&self, include_unpublished: bool) -> ListQuery<'_> {
        ListQuery {
            page: self.page,
            page_size: self.limit,
            tag: self.tag.as_deref().filter(|t| !t.trim().is_empty()),
            include_unpublished,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TagsResponse {
    pub tags: Vec<TagCount>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<PostSummary>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub published: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Validation
// ============================================================================

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, and hyphens
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// A lookup key is either a UUID or something `generate_slug` could have produced.
fn is_valid_key(key: &str) -> bool {
    Uuid::try_parse(key).is_ok() || SLUG_REGEX.is_match(key)
}

/// Admin routes address posts by id only; anything else cannot exist.
fn parse_post_id(raw: &str) -> Result<Uuid, BlogError> {
    Uuid::try_parse(raw).map_err(|_| BlogError::NotFound("Post"))
}

// ============================================================================
// Public handlers
// ============================================================================

/// GET /api/blog/posts - Published posts, newest first
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PostPage>, BlogError> {
    let page = state.blog.list(params.to_query(false)).await?;
    Ok(Json(page))
}

/// GET /api/blog/posts/{slugOrId} - Rendered post with related posts
pub async fn get_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<Json<PostDetail>, BlogError> {
    if !is_valid_key(&key) {
        return Err(BlogError::NotFound("Post"));
    }
    let is_admin = caller_is_admin(&state, &headers).await;
    let detail = state.blog.get(&key, is_admin).await?;
    Ok(Json(detail))
}

/// GET /api/blog/tags - Tag counts across published posts
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<TagsResponse>, BlogError> {
    let tags = state.blog.tags().await?;
    Ok(Json(TagsResponse { tags }))
}

/// GET /api/blog/search?query=
pub async fn search_posts(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, BlogError> {
    let query = params.query.unwrap_or_default();
    let results = state.blog.search(&query).await?;
    Ok(Json(SearchResponse { results }))
}

// ============================================================================
// Admin handlers (behind `require_admin`)
// ============================================================================

/// GET /api/blog/admin/posts - All posts including drafts, recently edited first
pub async fn admin_list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PostPage>, BlogError> {
    let page = state.blog.list(params.to_query(true)).await?;
    Ok(Json(page))
}

/// GET /api/blog/admin/posts/{id} - Raw post for editing
pub async fn admin_get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, BlogError> {
    let post = state.blog.get_for_edit(parse_post_id(&id)?).await?;
    Ok(Json(post))
}

/// POST /api/blog/admin/posts
pub async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<Post>), BlogError> {
    let post = state.blog.create(input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/blog/admin/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PostInput>,
) -> Result<Json<Post>, BlogError> {
    let post = state.blog.update(parse_post_id(&id)?, input).await?;
    Ok(Json(post))
}

/// DELETE /api/blog/admin/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, BlogError> {
    state.blog.delete(parse_post_id(&id)?).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Post deleted successfully".to_string(),
    }))
}

/// PATCH /api/blog/admin/posts/{id}/status
pub async fn update_post_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Post>, BlogError> {
    let id = parse_post_id(&id)?;
    let published = request
        .published
        .ok_or_else(|| BlogError::validation("Published status is required"))?;
    let post = state.blog.set_status(id, published).await?;
    Ok(Json(post))
}
