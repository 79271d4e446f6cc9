use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ContentStore, PostFilter, PostOrder, StoreError};
use crate::db::models::Post;

const POST_COLUMNS: &str = "id, title, slug, content, excerpt, cover_image, tags, published, \
     published_at, reading_time, views, seo_title, seo_description, seo_keywords, \
     created_at, updated_at";

/// Content store backed by the `blog_posts` table.
#[derive(Debug, Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE metacharacters so user input only ever matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_write_error(e: sqlx::Error, slug: &str) -> StoreError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::Conflict(format!("slug '{}'", slug)),
        _ => StoreError::Database(e),
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    qb.push(" WHERE true");
    if filter.published_only {
        qb.push(" AND published = true");
    }
    if let Some(tag) = &filter.tag {
        qb.push(" AND tags @> ARRAY[")
            .push_bind(tag.clone())
            .push("]::TEXT[]");
    }
    if !filter.any_tags.is_empty() {
        qb.push(" AND tags && ").push_bind(filter.any_tags.clone());
    }
    if let Some(id) = filter.exclude_id {
        qb.push(" AND id <> ").push_bind(id);
    }
}

fn order_clause(order: PostOrder) -> &'static str {
    match order {
        PostOrder::RecentlyPublished => " ORDER BY published_at DESC NULLS LAST, created_at DESC",
        PostOrder::RecentlyUpdated => " ORDER BY updated_at DESC",
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM blog_posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM blog_posts WHERE slug = $1",
            POST_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<Post>, StoreError> {
        let pattern = format!("%{}%", escape_like(query));
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {}
            FROM blog_posts
            WHERE published = true
              AND (title ILIKE $1 OR content ILIKE $1 OR excerpt ILIKE $1)
            ORDER BY published_at DESC NULLS LAST, created_at DESC
            LIMIT $2
            "#,
            POST_COLUMNS
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    async fn insert(&self, post: &Post) -> Result<Post, StoreError> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO blog_posts (
                id, title, slug, content, excerpt, cover_image, tags, published,
                published_at, reading_time, views, seo_title, seo_description, seo_keywords,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.cover_image)
        .bind(&post.tags)
        .bind(post.published)
        .bind(post.published_at)
        .bind(post.reading_time)
        .bind(post.views)
        .bind(&post.seo_title)
        .bind(&post.seo_description)
        .bind(&post.seo_keywords)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &post.slug))
    }

    async fn update(&self, post: &Post) -> Result<Option<Post>, StoreError> {
        sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE blog_posts
            SET title = $2, slug = $3, content = $4, excerpt = $5, cover_image = $6,
                tags = $7, published = $8, published_at = $9, reading_time = $10,
                seo_title = $11, seo_description = $12, seo_keywords = $13, updated_at = $14
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(&post.cover_image)
        .bind(&post.tags)
        .bind(post.published)
        .bind(post.published_at)
        .bind(post.reading_time)
        .bind(&post.seo_title)
        .bind(&post.seo_description)
        .bind(&post.seo_keywords)
        .bind(post.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &post.slug))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE blog_posts SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_matching(&self, filter: &PostFilter) -> Result<i64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM blog_posts");
        push_filter(&mut qb, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn list_page(
        &self,
        offset: i64,
        limit: i64,
        filter: &PostFilter,
        order: PostOrder,
    ) -> Result<Vec<Post>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM blog_posts", POST_COLUMNS));
        push_filter(&mut qb, filter);
        qb.push(order_clause(order));
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);
        let posts = qb.build_query_as::<Post>().fetch_all(&self.pool).await?;
        Ok(posts)
    }

    async fn published_tag_sets(&self) -> Result<Vec<Vec<String>>, StoreError> {
        let rows = sqlx::query_scalar::<_, Vec<String>>(
            r#"
            SELECT tags
            FROM blog_posts
            WHERE published = true
            ORDER BY published_at DESC NULLS LAST, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
