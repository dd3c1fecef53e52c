//! Page composition: splice a rendered fragment into the index template.

use crate::compiler::RenderedDocument;
use crate::embed::serve::{INDEX_HTML, IndexVars, SCRIPT_TAG, STYLE_CSS, STYLE_LINK};
use crate::utils::html::escape;

/// How the page reaches its stylesheet and reload client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAssets<'a> {
    /// Served by the document server; `ws_port` enables the reload client.
    Linked { ws_port: Option<u16> },
    /// Self-contained file: stylesheet inlined, no reload client.
    ///
    /// `base` is the URL relative links resolve against once the page no
    /// longer sits next to its source.
    Inline { base: Option<&'a str> },
}

/// Build the full page for a rendered document.
pub fn compose(document: &RenderedDocument, fallback_title: &str, assets: PageAssets<'_>) -> String {
    let title = escape(document.title.as_deref().unwrap_or(fallback_title));

    let inline_style;
    let (head, script) = match assets {
        PageAssets::Linked { ws_port } => {
            let script = if ws_port.is_some() { SCRIPT_TAG } else { "" };
            (STYLE_LINK, script)
        }
        PageAssets::Inline { base } => {
            let base = base
                .map(|href| format!("<base href=\"{}\">\n  ", escape(href)))
                .unwrap_or_default();
            inline_style = format!("{base}<style>\n{STYLE_CSS}</style>");
            (inline_style.as_str(), "")
        }
    };

    INDEX_HTML.render(&IndexVars {
        title: &title,
        head,
        script,
        markdown: &document.html,
    })
}
