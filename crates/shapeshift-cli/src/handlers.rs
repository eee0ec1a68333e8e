//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; this module re-exports the
//! entry points used by `main`.

mod completions;
mod convert;
mod resolve;
mod utils;

pub use completions::handle_completions;
pub use convert::handle_convert;
pub use resolve::handle_resolve;
