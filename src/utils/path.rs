//! Path normalization utilities.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with `base` if relative
#[inline]
pub fn normalize_path(path: &Path, base: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_existing_relative() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("doc.md"), "# hi").unwrap();

        let base = dir.path().canonicalize().unwrap();
        let resolved = normalize_path(&base.join("./doc.md"), &base);
        assert_eq!(resolved, base.join("doc.md"));
    }

    #[test]
    fn test_normalize_missing_falls_back_to_base() {
        let base = Path::new("/srv/notes");
        assert_eq!(
            normalize_path(Path::new("nope/missing.md"), base),
            PathBuf::from("/srv/notes/nope/missing.md")
        );
        assert_eq!(
            normalize_path(Path::new("/abs/missing.md"), base),
            PathBuf::from("/abs/missing.md")
        );
    }
}
