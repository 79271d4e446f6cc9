//! URL slugs for posts and heading anchors.

use chrono::Utc;
use uuid::Uuid;

use crate::store::{ContentStore, StoreError};

/// Used when a title has no characters that survive slugification.
pub const FALLBACK_SLUG: &str = "post";

/// Lowercases `text`, drops everything outside `[a-z0-9]`, and joins the
/// remaining words with single hyphens. Whitespace, `-` and `_` separate words.
///
/// The result may be empty (e.g. for `"!!!"`); callers pick their own fallback.
pub fn generate_slug(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Returns `candidate` if no other post uses it, otherwise `candidate-<millis>`.
///
/// Only one disambiguation pass is made: the suffixed value is not re-checked.
/// The check and the later write are not atomic; the unique index on the
/// store is the last line for concurrent writers.
pub async fn ensure_unique_slug(
    store: &dyn ContentStore,
    candidate: &str,
    exclude_id: Option<Uuid>,
) -> Result<String, StoreError> {
    let taken = match store.find_by_slug(candidate).await? {
        Some(existing) => Some(existing.id) != exclude_id,
        None => false,
    };

    if !taken {
        return Ok(candidate.to_string());
    }

    let slug = format!("{}-{}", candidate, Utc::now().timestamp_millis());
    tracing::debug!(candidate, slug = %slug, "slug taken, disambiguated");
    Ok(slug)
}
