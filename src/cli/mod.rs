//! Command-line interface module.

mod args;
pub mod serve;
pub mod snapshot;

pub use args::{Cli, Parsed, parse_args};
