//! External process launching: the browser opener and the editor.
//!
//! Command lines come from flags or environment variables and may carry
//! arguments (`EDITOR="code -w"`). They are split on whitespace and the
//! program is resolved on `PATH` before spawning, so a typo reports
//! "editor `x` not found" rather than a bare OS error.
//!
//! ```ignore
//! launch::open_browser("http://localhost:8080", None)?;
//! let mut editor = launch::spawn_editor("vim", &path, &workdir)?;
//! editor.wait().await?;
//! ```

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Command builder for external processes.
#[derive(Debug, Default, Clone)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["xdg-open"]` or `["cmd", "/C", "start"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        Self {
            program,
            args: iter.map(|s| s.as_ref().to_owned()).collect(),
            ..Default::default()
        }
    }

    /// Split a whitespace-separated command line. `None` if it is blank.
    pub fn parse(command_line: &str) -> Option<Self> {
        let words: Vec<&str> = command_line.split_whitespace().collect();
        (!words.is_empty()).then(|| Self::from_slice(&words))
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Program name for error messages.
    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Locate the program on `PATH`.
    fn resolve(&self, role: &str) -> Result<PathBuf> {
        which::which(&self.program)
            .with_context(|| format!("{role} `{}` not found", self.program_name()))
    }

    /// Spawn without waiting. A background thread reaps the child.
    pub fn spawn_detached(self, role: &str) -> Result<()> {
        let program = self.resolve(role)?;
        let mut cmd = Command::new(program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to launch {role} `{}`", self.program_name()))?;
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }

    /// Spawn attached to the terminal; the caller awaits the child.
    pub fn spawn_attached(self, role: &str) -> Result<tokio::process::Child> {
        let program = self.resolve(role)?;
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        cmd.spawn()
            .with_context(|| format!("failed to launch {role} `{}`", self.program_name()))
    }
}

/// Platform browser opener, or the `$BROWSER` override.
pub fn browser_command(override_command: Option<&str>) -> Cmd {
    if let Some(cmd) = override_command.and_then(Cmd::parse) {
        return cmd;
    }

    if cfg!(target_os = "macos") {
        Cmd::new("open")
    } else if cfg!(windows) {
        Cmd::from_slice(&["cmd", "/C", "start", ""])
    } else {
        Cmd::new("xdg-open")
    }
}

/// Open `target` (URL) in the browser. Fire-and-forget.
pub fn open_browser(target: &str, override_command: Option<&str>) -> Result<()> {
    crate::debug!("browser"; "opening {}", target);
    browser_command(override_command)
        .arg(target)
        .spawn_detached("browser")
}

/// Launch the editor on `file`, inheriting the terminal.
pub fn spawn_editor(command_line: &str, file: &Path, cwd: &Path) -> Result<tokio::process::Child> {
    let cmd = Cmd::parse(command_line).context("editor command is empty")?;
    crate::debug!("editor"; "launching {} {}", command_line, file.display());
    cmd.arg(file).cwd(cwd).spawn_attached("editor")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        let cmd = Cmd::parse("  code  -w ").unwrap();
        assert_eq!(cmd.program, OsString::from("code"));
        assert_eq!(cmd.args, vec![OsString::from("-w")]);

        assert!(Cmd::parse("").is_none());
        assert!(Cmd::parse("   ").is_none());
    }

    #[test]
    fn test_browser_override() {
        let cmd = browser_command(Some("firefox --new-tab"));
        assert_eq!(cmd.program_name(), "firefox");
        assert_eq!(cmd.args, vec![OsString::from("--new-tab")]);

        // Blank override falls back to the platform opener.
        let platform = browser_command(Some(" "));
        assert!(!platform.program_name().is_empty());
    }

    #[test]
    fn test_missing_program_is_reported_by_name() {
        let err = open_browser("http://localhost:1", Some("mdlive-no-such-browser"))
            .unwrap_err()
            .to_string();
        assert_eq!(err, "browser `mdlive-no-such-browser` not found");
    }

    #[cfg(unix)]
    #[test]
    fn test_open_browser_detached() {
        open_browser("http://localhost:1", Some("true")).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_editor_waits_for_exit() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("doc.md");
        std::fs::write(&file, "# Doc\n").unwrap();

        let mut child = spawn_editor("true", &file, dir.path()).unwrap();
        assert!(child.wait().await.unwrap().success());
    }

    #[test]
    fn test_spawn_editor_unknown() {
        let err = spawn_editor("mdlive-no-such-editor", Path::new("doc.md"), Path::new("."))
            .unwrap_err()
            .to_string();
        assert!(err.contains("editor `mdlive-no-such-editor` not found"));
    }
}
