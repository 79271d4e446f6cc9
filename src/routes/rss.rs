use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::blog::ListQuery;
use crate::config::AppConfig;
use crate::db::models::PostSummary;
use crate::error::BlogError;
use crate::AppState;

const FEED_SIZE: i64 = 50;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

fn render_feed(config: &AppConfig, posts: &[PostSummary]) -> String {
    let base_url = &config.site_url;

    let mut items = String::new();
    for post in posts {
        let post_url = format!("{}/blog/{}", base_url, post.slug);
        let published = post.published_at.unwrap_or(post.updated_at);
        let categories: String = post
            .tags
            .iter()
            .map(|tag| format!("      <category>{}</category>\n", escape_xml(tag)))
            .collect();
        items.push_str(&format!(
            "    <item>\n\
                   <title>{}</title>\n\
                   <link>{}</link>\n\
                   <description>{}</description>\n\
                   <pubDate>{}</pubDate>\n\
                   <guid isPermaLink=\"true\">{}</guid>\n\
                   {}\
                 </item>\n",
            escape_xml(&post.title),
            escape_xml(&post_url),
            escape_xml(&post.excerpt),
            rfc822(&published),
            escape_xml(&post_url),
            categories,
        ));
    }

    let feed_url = format!("{}/rss.xml", base_url);
    let blog_url = format!("{}/blog", base_url);
    let last_build = posts
        .first()
        .and_then(|p| p.published_at)
        .map(|dt| rfc822(&dt))
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{}</title>
    <link>{}</link>
    <description>{}</description>
    <language>en-us</language>
    <atom:link href="{}" rel="self" type="application/rss+xml"/>
    <lastBuildDate>{}</lastBuildDate>
{}  </channel>
</rss>"#,
        escape_xml(&config.site_title),
        escape_xml(&blog_url),
        escape_xml(&config.site_description),
        escape_xml(&feed_url),
        last_build,
        items,
    )
}

/// GET /rss.xml - The most recently published posts as RSS 2.0
pub async fn rss_feed(State(state): State<AppState>) -> Result<Response, BlogError> {
    let page = state
        .blog
        .list(ListQuery {
            page: 1,
            page_size: FEED_SIZE,
            tag: None,
            include_unpublished: false,
        })
        .await?;

    let xml = render_feed(&state.config, &page.posts);

    Ok((
        [
            (header::CONTENT_TYPE, "application/rss+xml; charset=utf-8"),
            (
                header::CACHE_CONTROL,
                "public, max-age=3600, stale-while-revalidate=600",
            ),
        ],
        xml,
    )
        .into_response())
}
