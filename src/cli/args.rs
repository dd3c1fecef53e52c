//! Command-line interface definitions.

use clap::Parser;
use std::path::PathBuf;

use crate::embed::cli::HELP_TXT;

/// mdlive CLI
///
/// Short flags mirror the classic `<path> [options]` usage; every flag may
/// appear before or after the path.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mdlive",
    version,
    disable_version_flag = true,
    override_help = HELP_TXT
)]
pub struct Cli {
    /// Markdown file to preview (relative to the current directory)
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    pub path: Option<PathBuf>,

    /// Port of the preview server
    #[arg(short = 'p', default_value_t = 8080)]
    pub port: u16,

    /// Launch an editor; bare `-e` uses $EDITOR
    #[arg(short = 'e', value_name = "EDITOR", num_args = 0..=1)]
    pub editor: Option<Option<String>>,

    /// Open the preview in the browser
    #[arg(short = 'b')]
    pub browser: bool,

    /// Watch the file and live-reload (otherwise render a one-shot snapshot)
    #[arg(short = 'w')]
    pub watch: bool,

    /// Print the version
    #[arg(short = 'v', long = "version")]
    pub version: bool,

    /// Enable verbose output for debugging
    #[arg(long)]
    pub verbose: bool,
}

/// Outcome of parsing the process arguments.
#[derive(Debug)]
pub enum Parsed {
    /// Run a session
    Run(Cli),
    /// Help or version text to print, then exit 0
    Print(String),
}

/// Parse arguments without letting clap exit the process.
///
/// clap exits with status 2 on usage errors; this tool reports every
/// failure with status 1, so errors come back as a single line instead.
pub fn parse_args<I, T>(args: I) -> Result<Parsed, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    use clap::error::ErrorKind;

    match Cli::try_parse_from(args) {
        Ok(cli) if cli.version => Ok(Parsed::Print(format!("{}\n", crate::embed::cli::VERSION))),
        Ok(cli) => Ok(Parsed::Run(cli)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Parsed::Print(e.to_string()))
        }
        Err(e) => Err(first_line(&e.to_string())),
    }
}

/// First meaningful line of a clap error, without its `error:` tag.
fn first_line(rendered: &str) -> String {
    let line = rendered
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("invalid arguments");
    let line = line.strip_prefix("error:").unwrap_or(line).trim();
    format!("{line}. use -h to know more.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Cli {
        match parse_args(std::iter::once("mdlive").chain(args.iter().copied())) {
            Ok(Parsed::Run(cli)) => cli,
            other => panic!("expected a run, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = run(&["doc.md"]);
        assert_eq!(cli.path, Some(PathBuf::from("doc.md")));
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.editor, None);
        assert!(!cli.browser);
        assert!(!cli.watch);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_flags_after_path() {
        let cli = run(&["doc.md", "-w", "-b", "-p", "9090"]);
        assert!(cli.watch);
        assert!(cli.browser);
        assert_eq!(cli.port, 9090);
    }

    #[test]
    fn test_editor_optional_value() {
        assert_eq!(run(&["doc.md", "-e"]).editor, Some(None));
        assert_eq!(
            run(&["doc.md", "-e", "nvim"]).editor,
            Some(Some("nvim".to_string()))
        );
        assert_eq!(run(&["doc.md", "-e", "-w"]).editor, Some(None));
    }

    #[test]
    fn test_missing_path_is_not_a_parse_error() {
        assert_eq!(run(&["-w"]).path, None);
    }

    #[test]
    fn test_unknown_option() {
        let err = parse_args(["mdlive", "doc.md", "-x"]).unwrap_err();
        assert!(err.contains("-x"), "{err}");
        assert!(!err.starts_with("error"), "{err}");
        assert!(!err.contains('\n'), "{err}");
    }

    #[test]
    fn test_bad_port() {
        assert!(parse_args(["mdlive", "doc.md", "-p", "http"]).is_err());
        assert!(parse_args(["mdlive", "doc.md", "-p", "70000"]).is_err());
    }

    #[test]
    fn test_help_and_version() {
        match parse_args(["mdlive", "-h"]) {
            Ok(Parsed::Print(text)) => assert!(text.contains("usage:")),
            other => panic!("{other:?}"),
        }
        match parse_args(["mdlive", "-v"]) {
            Ok(Parsed::Print(text)) => assert!(text.starts_with("mdlive ")),
            other => panic!("{other:?}"),
        }
    }
}
