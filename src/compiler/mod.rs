//! Document compilation: markdown source to a complete HTML page.
//!
//! - [`markdown`] - Markdown → HTML fragment via `pulldown-cmark` (pure)
//! - [`page`] - Fragment → page, for the live server or a snapshot file

pub mod markdown;
pub mod page;

use std::path::Path;

use anyhow::{Context, Result};

pub use markdown::{MarkdownOptions, RenderedDocument};
pub use page::PageAssets;

/// Read the source file as it is right now and render it.
///
/// Only the read can fail. Bytes that are not valid UTF-8 (a file caught
/// half-written) are replaced, never rejected.
pub fn compile_file(path: &Path) -> Result<RenderedDocument> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let source = String::from_utf8_lossy(&bytes);
    Ok(markdown::render(&source, &MarkdownOptions::all()))
}

/// Read, render and wrap the source file into a page.
pub fn compile_page(path: &Path, assets: PageAssets<'_>) -> Result<String> {
    let document = compile_file(path)?;
    Ok(page::compose(&document, &fallback_title(path), assets))
}

/// Page title used when the document has no level-1 heading.
fn fallback_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mdlive".to_string())
}
