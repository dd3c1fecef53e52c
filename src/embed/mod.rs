//! Embedded static resources for mdlive.
//!
//! Every asset the server and CLI hand out is compiled into the binary, so
//! the tool works no matter where it is installed.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Page template, stylesheet and reload client
//! - `cli` - Help text and version string
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{INDEX_HTML, IndexVars, RELOAD_JS, ReloadVars};
//!
//! let page = INDEX_HTML.render(&IndexVars { title, head, script, markdown });
//! let js = RELOAD_JS.render(&ReloadVars { ws_port: 40123 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::template::substitute;
    use super::{Template, TemplateVars};

    /// Placeholder the rendered document is spliced into.
    pub const MARKDOWN_PLACEHOLDER: &str = "%markdown%";

    /// Marker for the page shell.
    #[derive(Debug, Clone, Copy)]
    pub struct Index;

    /// Variables for index.html.
    ///
    /// All placeholders are filled in one pass over the template, so a title
    /// or document containing a placeholder is emitted verbatim.
    pub struct IndexVars<'a> {
        pub title: &'a str,
        pub head: &'a str,
        pub script: &'a str,
        pub markdown: &'a str,
    }

    impl TemplateVars<Index> for IndexVars<'_> {
        fn apply(&self, content: &str) -> String {
            substitute(
                content,
                &[
                    ("__TITLE__", self.title),
                    ("__HEAD__", self.head),
                    ("__SCRIPT__", self.script),
                    (MARKDOWN_PLACEHOLDER, self.markdown),
                ],
            )
        }
    }

    /// Page shell around the rendered document.
    pub const INDEX_HTML: Template<Index> = Template::new(include_str!("serve/index.html"));

    /// Document stylesheet.
    pub const STYLE_CSS: &str = include_str!("serve/style.css");

    /// Marker for the reload client.
    #[derive(Debug, Clone, Copy)]
    pub struct Reload;

    /// Variables for script.js.
    pub struct ReloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars<Reload> for ReloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__MDLIVE_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Browser side of the notification channel.
    pub const RELOAD_JS: Template<Reload> = Template::new(include_str!("serve/script.js"));

    /// `<head>` fragment linking the served stylesheet.
    pub const STYLE_LINK: &str = r#"<link rel="stylesheet" href="/style.css">"#;

    /// Tag loading the reload client.
    pub const SCRIPT_TAG: &str = r#"<script src="/script.js"></script>"#;
}

pub mod cli {
    /// Usage text printed by `-h`.
    pub const HELP_TXT: &str = include_str!("cli/help.txt");

    /// Version line printed by `-v`.
    pub const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::serve::*;

    #[test]
    fn test_index_has_every_placeholder() {
        let content = INDEX_HTML.content();
        for token in ["__TITLE__", "__HEAD__", "__SCRIPT__", MARKDOWN_PLACEHOLDER] {
            assert_eq!(content.matches(token).count(), 1, "{token}");
        }
    }

    #[test]
    fn test_markdown_spliced_last() {
        let page = INDEX_HTML.render(&IndexVars {
            title: "t",
            head: "",
            script: "",
            markdown: "<p>__SCRIPT__ and %markdown%</p>",
        });
        assert!(page.contains("<p>__SCRIPT__ and %markdown%</p>"));
    }

    #[test]
    fn test_title_placeholders_stay_in_title() {
        let page = INDEX_HTML.render(&IndexVars {
            title: "Using %markdown% __HEAD__ __SCRIPT__",
            head: "<link>",
            script: "<script></script>",
            markdown: "<p>BODY_TEXT</p>",
        });
        assert!(page.contains("<title>Using %markdown% __HEAD__ __SCRIPT__</title>"));
        let article = page.split("<article").nth(1).unwrap();
        assert!(article.contains("<p>BODY_TEXT</p>"));
        assert_eq!(page.matches("<link>").count(), 1);
        assert_eq!(page.matches("<script></script>").count(), 1);
    }

    #[test]
    fn test_reload_js_port() {
        let js = RELOAD_JS.render(&ReloadVars { ws_port: 40123 });
        assert!(js.contains("40123"));
        assert!(!js.contains("__MDLIVE_WS_PORT__"));
    }

    #[test]
    fn test_version_line() {
        assert!(super::cli::VERSION.starts_with("mdlive "));
    }
}
