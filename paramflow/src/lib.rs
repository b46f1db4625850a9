// Include handler and command modules directly from their files
#[path = "commands.rs"]
pub mod commands;
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{load_capture, parse_threshold, render_edges, select_tracked};
