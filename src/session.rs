//! Session: the resolved, immutable description of one run.
//!
//! Built once from the parsed CLI, the working directory and the process
//! environment, then shared by `Arc` with the server, watcher and
//! coordinator. Nothing downstream reads CLI flags or env vars directly.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cli::Cli;
use crate::utils::path::normalize_path;

/// Editor used when `-e` is given without a name and $EDITOR is unset.
pub const FALLBACK_EDITOR: &str = "vim";

/// Startup validation errors. All of them are fatal.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no path specified")]
    MissingPath,

    #[error("no such file {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("cannot determine the working directory")]
    WorkingDir(#[source] io::Error),
}

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Serve, watch and push reloads until stopped
    Live,
    /// Render once into a temp file and open it
    Snapshot,
}

/// Which editor to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorSpec {
    /// `-e` alone: $EDITOR, falling back to vim
    Default,
    /// `-e <command>`
    Named(String),
}

/// Environment variables the session consults.
#[derive(Debug, Clone, Default)]
pub struct Env {
    /// `$EDITOR`
    pub editor: Option<String>,
    /// `$BROWSER`
    pub browser: Option<String>,
}

impl Env {
    /// Snapshot the relevant variables of the current process.
    pub fn from_process() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            editor: non_empty("EDITOR"),
            browser: non_empty("BROWSER"),
        }
    }
}

/// One run of the tool.
#[derive(Debug, Clone)]
pub struct Session {
    /// Absolute, canonical path of the previewed document
    pub source: PathBuf,
    /// Directory relative links in the document resolve against
    pub workdir: PathBuf,
    pub mode: Mode,
    pub port: u16,
    /// Debug output requested
    pub verbose: bool,
    pub editor: Option<EditorSpec>,
    /// Open the browser (always true in snapshot mode)
    pub open_browser: bool,
    /// Browser opener override from $BROWSER
    pub browser_command: Option<String>,
    /// $EDITOR, used by [`EditorSpec::Default`]
    default_editor: Option<String>,
}

impl Session {
    /// Validate options and resolve the source path against `cwd`.
    pub fn from_cli(cli: &Cli, cwd: &Path, env: &Env) -> Result<Self, SessionError> {
        let path = cli.path.as_deref().ok_or(SessionError::MissingPath)?;

        let joined = cwd.join(path);
        if !joined.exists() {
            return Err(SessionError::NotFound(normalize_path(&joined, cwd)));
        }
        let source = normalize_path(&joined, cwd);
        if !source.is_file() {
            return Err(SessionError::NotAFile(source));
        }

        let mode = if cli.watch { Mode::Live } else { Mode::Snapshot };
        let editor = cli.editor.as_ref().map(|named| match named {
            Some(command) if !command.trim().is_empty() => EditorSpec::Named(command.clone()),
            _ => EditorSpec::Default,
        });

        Ok(Self {
            source,
            workdir: normalize_path(cwd, cwd),
            mode,
            port: cli.port,
            verbose: cli.verbose,
            editor,
            open_browser: cli.browser || mode == Mode::Snapshot,
            browser_command: env.browser.clone(),
            default_editor: env.editor.clone(),
        })
    }

    /// Resolve with the real working directory and environment.
    pub fn from_process(cli: &Cli) -> Result<Self, SessionError> {
        let cwd = std::env::current_dir().map_err(SessionError::WorkingDir)?;
        Self::from_cli(cli, &cwd, &Env::from_process())
    }

    /// Editor command line, if an editor takes part in this session.
    ///
    /// Editors only run alongside the live server.
    pub fn editor_command(&self) -> Option<String> {
        if self.mode != Mode::Live {
            return None;
        }
        self.editor.as_ref().map(|editor| match editor {
            EditorSpec::Named(command) => command.clone(),
            EditorSpec::Default => self
                .default_editor
                .clone()
                .unwrap_or_else(|| FALLBACK_EDITOR.to_string()),
        })
    }

    /// Regular logging is silenced while an editor owns the terminal.
    pub fn is_quiet(&self) -> bool {
        self.editor_command().is_some()
    }

    /// Address the preview is reachable at in live mode.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// File name of the source, for log lines.
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Parsed, parse_args};
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        match parse_args(std::iter::once("mdlive").chain(args.iter().copied())) {
            Ok(Parsed::Run(cli)) => cli,
            other => panic!("{other:?}"),
        }
    }

    fn workspace() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("doc.md"), "# Doc\n").unwrap();
        std::fs::create_dir(root.join("sub")).unwrap();
        (dir, root)
    }

    #[test]
    fn test_missing_path() {
        let (_dir, root) = workspace();
        let err = Session::from_cli(&cli(&["-w"]), &root, &Env::default()).unwrap_err();
        assert!(matches!(err, SessionError::MissingPath));
        assert_eq!(err.to_string(), "no path specified");
    }

    #[test]
    fn test_nonexistent_path() {
        let (_dir, root) = workspace();
        let err = Session::from_cli(&cli(&["nope.md"]), &root, &Env::default()).unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
        assert!(err.to_string().contains("nope.md"));
    }

    #[test]
    fn test_directory_rejected() {
        let (_dir, root) = workspace();
        let err = Session::from_cli(&cli(&["sub"]), &root, &Env::default()).unwrap_err();
        assert!(matches!(err, SessionError::NotAFile(_)));
    }

    #[test]
    fn test_resolves_relative_to_cwd() {
        let (_dir, root) = workspace();
        let session =
            Session::from_cli(&cli(&["sub/../doc.md"]), &root, &Env::default()).unwrap();
        assert_eq!(session.source, root.join("doc.md"));
        assert_eq!(session.workdir, root);
        assert_eq!(session.source_name(), "doc.md");
    }

    #[test]
    fn test_snapshot_mode_defaults() {
        let (_dir, root) = workspace();
        let session = Session::from_cli(&cli(&["doc.md", "-e"]), &root, &Env::default()).unwrap();
        assert_eq!(session.mode, Mode::Snapshot);
        assert!(session.open_browser);
        assert_eq!(session.editor_command(), None);
        assert!(!session.is_quiet());
    }

    #[test]
    fn test_live_mode() {
        let (_dir, root) = workspace();
        let session =
            Session::from_cli(&cli(&["doc.md", "-w", "-p", "9090"]), &root, &Env::default())
                .unwrap();
        assert_eq!(session.mode, Mode::Live);
        assert_eq!(session.port, 9090);
        assert!(!session.open_browser);
        assert_eq!(session.url(), "http://localhost:9090");
    }

    #[test]
    fn test_editor_resolution() {
        let (_dir, root) = workspace();
        let env = Env {
            editor: Some("hx".to_string()),
            browser: Some("firefox".to_string()),
        };

        let default = Session::from_cli(&cli(&["doc.md", "-w", "-e"]), &root, &env).unwrap();
        assert_eq!(default.editor, Some(EditorSpec::Default));
        assert_eq!(default.editor_command().as_deref(), Some("hx"));
        assert_eq!(default.browser_command.as_deref(), Some("firefox"));
        assert!(default.is_quiet());

        let named =
            Session::from_cli(&cli(&["doc.md", "-w", "-e", "code -w"]), &root, &env).unwrap();
        assert_eq!(named.editor_command().as_deref(), Some("code -w"));

        let fallback =
            Session::from_cli(&cli(&["doc.md", "-w", "-e"]), &root, &Env::default()).unwrap();
        assert_eq!(fallback.editor_command().as_deref(), Some(FALLBACK_EDITOR));
    }
}
