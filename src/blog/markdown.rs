//! Markdown to sanitized HTML.
//!
//! Rendering is a pure function of the source and a [`RenderOptions`] value;
//! nothing global is reconfigured per call. The syntax highlighter is built
//! once because loading the syntect definitions is expensive, and it is only
//! ever read.

use comrak::{
    adapters::{HeadingAdapter, HeadingMeta},
    nodes::Sourcepos,
    parse_document,
    plugins::syntect::SyntectAdapter,
    Arena, Options, Plugins,
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::toc::{anchor_headings, outline, TocEntry};
use crate::error::BlogError;

lazy_static::lazy_static! {
    /// Class-based highlighter: emits `<span class="...">` and leaves colors to the stylesheet.
    static ref HIGHLIGHTER: SyntectAdapter = SyntectAdapter::new(None);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Tables, strikethrough and autolinks.
    pub gfm: bool,
    /// Single newlines become `<br>`.
    pub hard_breaks: bool,
    /// Syntax-highlight fenced code with a recognised language.
    pub highlight: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            hard_breaks: true,
            highlight: true,
        }
    }
}

/// Rendered HTML together with the outline of its sub-headings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedDocument {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

pub(crate) fn comrak_options(render: &RenderOptions) -> Options {
    let mut options = Options::default();
    options.extension.table = render.gfm;
    options.extension.strikethrough = render.gfm;
    options.extension.autolink = render.gfm;
    options.render.hardbreaks = render.hard_breaks;
    // Raw HTML passes through the parser and is cleaned by the sanitizer afterwards.
    options.render.unsafe_ = true;
    options
}

/// Writes the precomputed anchor ids onto headings in document order.
struct AnchoredHeadings {
    ids: Vec<String>,
    next: AtomicUsize,
}

impl HeadingAdapter for AnchoredHeadings {
    fn enter(
        &self,
        output: &mut dyn Write,
        heading: &HeadingMeta,
        _sourcepos: Option<Sourcepos>,
    ) -> io::Result<()> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        match self.ids.get(index) {
            Some(id) => write!(output, "<h{} id=\"{}\">", heading.level, id),
            None => write!(output, "<h{}>", heading.level),
        }
    }

    fn exit(&self, output: &mut dyn Write, heading: &HeadingMeta) -> io::Result<()> {
        write!(output, "</h{}>", heading.level)
    }
}

fn sanitizer() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("pre", &["class"])
        .add_tag_attributes("span", &["class"])
        .add_tag_attributes("th", &["align"])
        .add_tag_attributes("td", &["align"]);
    for heading in ["h1", "h2", "h3", "h4", "h5", "h6"] {
        builder.add_tag_attributes(heading, &["id"]);
    }
    builder
}

/// Renders `source` to sanitized HTML with default options.
pub fn render(source: &str) -> Result<String, BlogError> {
    render_document(source, &RenderOptions::default()).map(|doc| doc.html)
}

/// Renders `source` and returns the HTML alongside its table of contents.
///
/// Unknown fence languages fall back to plain preformatted text. Script
/// elements, event-handler attributes and `javascript:` URLs are removed.
pub fn render_document(source: &str, options: &RenderOptions) -> Result<RenderedDocument, BlogError> {
    if source.trim().is_empty() {
        return Ok(RenderedDocument::default());
    }

    let comrak = comrak_options(options);
    let arena = Arena::new();
    let root = parse_document(&arena, source, &comrak);

    let anchors = anchor_headings(root);
    let headings = AnchoredHeadings {
        ids: anchors.iter().map(|entry| entry.id.clone()).collect(),
        next: AtomicUsize::new(0),
    };

    let mut plugins = Plugins::default();
    plugins.render.heading_adapter = Some(&headings);
    if options.highlight {
        plugins.render.codefence_syntax_highlighter = Some(&*HIGHLIGHTER);
    }

    let mut out = Vec::with_capacity(source.len() * 2);
    comrak::format_html_with_plugins(root, &comrak, &mut out, &plugins)
        .map_err(|e| BlogError::Render(e.to_string()))?;
    let html = String::from_utf8(out).map_err(|e| BlogError::Render(e.to_string()))?;

    Ok(RenderedDocument {
        html: sanitizer().clean(&html).to_string(),
        toc: outline(&anchors),
    })
}
