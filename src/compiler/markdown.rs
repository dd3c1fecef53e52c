//! Markdown to HTML conversion using pulldown-cmark.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// HTML produced from one pass over the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// HTML fragment (no `<html>`/`<body>` wrapper)
    pub html: String,
    /// Text of the first level-1 heading, if any
    pub title: Option<String>,
}

/// Render markdown to an HTML fragment.
///
/// Pure and infallible: pulldown-cmark accepts any input, malformed markup
/// renders as text.
pub fn render(source: &str, options: &MarkdownOptions) -> RenderedDocument {
    let events: Vec<Event<'_>> = Parser::new_ext(source, options.to_pulldown_options()).collect();
    let title = first_heading(&events);

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());

    RenderedDocument { html: out, title }
}

/// Collect the plain text of the first `# heading`.
fn first_heading(events: &[Event<'_>]) -> Option<String> {
    let start = events.iter().position(|e| {
        matches!(
            e,
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            })
        )
    })?;

    let mut text = String::new();
    for event in &events[start + 1..] {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_all(source: &str) -> RenderedDocument {
        render(source, &MarkdownOptions::all())
    }

    #[test]
    fn test_basic_markdown() {
        let doc = render_all("# Hello\n\nSome **bold** text.\n");
        assert!(doc.html.contains("<h1>Hello</h1>"));
        assert!(doc.html.contains("<strong>bold</strong>"));
        assert_eq!(doc.title.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_extensions_enabled() {
        let doc = render_all("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n");
        assert!(doc.html.contains("<table>"));
        assert!(doc.html.contains("<del>gone</del>"));
        assert!(doc.html.contains("checkbox"));
    }

    #[test]
    fn test_extensions_disabled() {
        let doc = render("~~kept~~\n", &MarkdownOptions::default());
        assert!(!doc.html.contains("<del>"));
    }

    #[test]
    fn test_title_uses_first_h1_only() {
        let doc = render_all("## Sub\n\n# The `real` title\n\n# Second\n");
        assert_eq!(doc.title.as_deref(), Some("The real title"));
    }

    #[test]
    fn test_no_title() {
        assert_eq!(render_all("just a paragraph\n").title, None);
        assert_eq!(render_all("#\n").title, None);
    }

    #[test]
    fn test_malformed_input_renders() {
        let doc = render_all("<div>\n**unclosed [link](\n```rust\nfn main() {\n");
        assert!(!doc.html.is_empty());
    }

    #[test]
    fn test_render_is_deterministic() {
        let source = "# A\n\ntext[^1]\n\n[^1]: note\n";
        assert_eq!(render_all(source), render_all(source));
    }
}
