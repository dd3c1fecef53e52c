//! mdlive - live preview for markdown files.

mod actor;
mod cli;
mod compiler;
mod core;
mod embed;
mod launch;
mod logger;
mod reload;
mod session;
mod utils;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use cli::Parsed;
use session::{Mode, Session};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = match cli::parse_args(std::env::args_os()) {
        Ok(Parsed::Run(cli)) => cli,
        Ok(Parsed::Print(text)) => {
            print!("{text}");
            return Ok(());
        }
        Err(message) => anyhow::bail!(message),
    };

    let session = Session::from_process(&cli)?;
    logger::init(session.verbose, session.is_quiet());

    match session.mode {
        Mode::Live => cli::serve::serve(Arc::new(session)),
        Mode::Snapshot => cli::snapshot::snapshot(&session).map(|_| ()),
    }
}
