//! Core process state shared across the codebase.

mod state;

pub use state::{
    is_shutdown, register_server, set_editor_attached, setup_shutdown_handler, stop_server,
};
