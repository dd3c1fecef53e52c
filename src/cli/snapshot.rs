//! Snapshot mode: render once into a temp file and open it.
//!
//! The page is self-contained (stylesheet inlined, no reload client) since
//! no server is left running to answer asset requests.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::actor::coordinator::{Lifecycle, Phase};
use crate::compiler::{PageAssets, compile_page};
use crate::session::Session;
use crate::{launch, log};

/// Render, write and open the snapshot. Returns the written file.
///
/// A browser that fails to open is logged; the file is still kept.
pub fn snapshot(session: &Session) -> Result<PathBuf> {
    let mut lifecycle = Lifecycle::new();
    lifecycle.advance(Phase::Snapshot);

    if session.editor.is_some() {
        log!("editor"; "-e only applies with -w, ignoring");
    }

    let path = write_snapshot(&session.source, &std::env::temp_dir())?;
    log!("snapshot"; "{}", path.display());

    let url = Url::from_file_path(&path)
        .map_err(|()| anyhow::anyhow!("cannot build a file URL for {}", path.display()))?;
    if let Err(e) = launch::open_browser(url.as_str(), session.browser_command.as_deref()) {
        log!("browser"; "{:#}", e);
    }

    lifecycle.advance(Phase::Exited);
    Ok(path)
}

/// Write the composed page to a uniquely named file in `dir` that outlives the process.
///
/// Relative links in the page resolve against the source's directory.
pub fn write_snapshot(source: &Path, dir: &Path) -> Result<PathBuf> {
    let base = source
        .parent()
        .and_then(|parent| Url::from_directory_path(parent).ok());
    let assets = PageAssets::Inline {
        base: base.as_ref().map(Url::as_str),
    };
    let page = compile_page(source, assets)?;

    let mut file = tempfile::Builder::new()
        .prefix("mdlive-")
        .suffix(".html")
        .rand_bytes(6)
        .tempfile_in(dir)
        .context("failed to create snapshot file")?;
    file.write_all(page.as_bytes())
        .context("failed to write snapshot file")?;

    let (_, path) = file.keep().context("failed to keep snapshot file")?;
    Ok(path)
}
