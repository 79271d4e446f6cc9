//! Heading scan shared by the table of contents and the renderer's anchors.

use comrak::{
    nodes::{AstNode, NodeValue},
    parse_document, Arena,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::markdown::{comrak_options, RenderOptions};
use super::slug::generate_slug;

/// Anchor id used for headings whose text slugifies to nothing.
const FALLBACK_ANCHOR: &str = "section";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// Outline of the level 2..=6 headings of `source`, in document order.
///
/// The ids are the ones [`super::markdown::render`] puts on the same headings.
pub fn extract_headings(source: &str) -> Vec<TocEntry> {
    let arena = Arena::new();
    let render = RenderOptions::default();
    let options = comrak_options(&render);
    let root = parse_document(&arena, source, &options);

    outline(&anchor_headings(root))
}

pub(crate) fn outline(anchors: &[TocEntry]) -> Vec<TocEntry> {
    anchors
        .iter()
        .filter(|entry| (2..=6).contains(&entry.level))
        .cloned()
        .collect()
}

/// Every heading of the document with its anchor id, in document order.
///
/// Repeated ids get `-1`, `-2`, ... appended.
pub(crate) fn anchor_headings<'a>(root: &'a AstNode<'a>) -> Vec<TocEntry> {
    let mut used = HashSet::new();
    let mut entries = Vec::new();

    for node in root.descendants() {
        let level = match node.data.borrow().value {
            NodeValue::Heading(ref heading) => heading.level,
            _ => continue,
        };

        let mut text = String::new();
        collect_text(node, &mut text);
        let text = text.trim().to_string();

        let base = match generate_slug(&text) {
            slug if slug.is_empty() => FALLBACK_ANCHOR.to_string(),
            slug => slug,
        };
        let id = dedupe(&mut used, base);

        entries.push(TocEntry { id, text, level });
    }

    entries
}

fn dedupe(used: &mut HashSet<String>, base: String) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}-{}", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match node.data.borrow().value {
        NodeValue::Text(ref literal) => out.push_str(literal),
        NodeValue::Code(ref code) => out.push_str(&code.literal),
        NodeValue::LineBreak | NodeValue::SoftBreak => out.push(' '),
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_headings_levels_and_ids() {
        let toc = extract_headings("## A\n\ntext\n\n### B\n");
        assert_eq!(
            toc,
            vec![
                TocEntry {
                    id: "a".into(),
                    text: "A".into(),
                    level: 2
                },
                TocEntry {
                    id: "b".into(),
                    text: "B".into(),
                    level: 3
                },
            ]
        );
    }

    #[test]
    fn test_extract_headings_skips_top_level_title() {
        let toc = extract_headings("# Title\n\n## Section\n");
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].id, "section");
    }

    #[test]
    fn test_duplicate_headings_get_numeric_suffix() {
        let toc = extract_headings("## Setup\n\n## Setup\n\n## Setup\n");
        let ids: Vec<_> = toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["setup", "setup-1", "setup-2"]);
    }

    #[test]
    fn test_h1_participates_in_deduplication() {
        // The h1 owns "intro", so the h2 must not reuse it.
        let toc = extract_headings("# Intro\n\n## Intro\n");
        assert_eq!(toc[0].id, "intro-1");
    }

    #[test]
    fn test_inline_markup_is_flattened() {
        let toc = extract_headings("## Using `tokio::spawn` *safely*\n");
        assert_eq!(toc[0].text, "Using tokio::spawn safely");
        assert_eq!(toc[0].id, "using-tokiospawn-safely");
    }

    #[test]
    fn test_symbol_only_heading_uses_fallback_anchor() {
        let toc = extract_headings("## ???\n");
        assert_eq!(toc[0].id, "section");
    }

    #[test]
    fn test_empty_source_has_no_headings() {
        assert!(extract_headings("").is_empty());
    }

    #[test]
    fn test_setext_headings_are_included() {
        let toc = extract_headings("Overview\n--------\n");
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].level, 2);
        assert_eq!(toc[0].id, "overview");
    }
}
