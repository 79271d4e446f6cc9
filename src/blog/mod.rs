//! Blog core: slugs, rendering, outlines, tags and the post lifecycle.

pub mod markdown;
pub mod reading_time;
pub mod related;
pub mod service;
pub mod slug;
pub mod tags;
pub mod toc;

pub use markdown::{render, render_document, RenderOptions, RenderedDocument};
pub use related::find_related;
pub use service::{BlogService, ListQuery, PostDetail, PostInput, PostKey, PostPage, PostView};
pub use slug::{ensure_unique_slug, generate_slug};
pub use tags::{aggregate_tags, TagCount};
pub use toc::{extract_headings, TocEntry};
