//! URL to filesystem path resolution for files next to the document.

use std::path::{Path, PathBuf};

/// Resolve a request URL to a file under `serve_root`.
///
/// Rejects `..` segments and anything that canonicalizes outside the root
/// (symlinks included).
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.is_empty() || clean.split(['/', '\\']).any(|segment| segment == "..") {
        return None;
    }

    let canonical = serve_root.join(&clean).canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    canonical.is_file().then_some(canonical)
}

/// Route part of a request URL: query string and fragment removed.
pub fn route(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Normalize URL: strip query string, decode, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let decoded = percent_decode_str(route(url))
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}
