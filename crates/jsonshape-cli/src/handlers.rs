//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod assertion;
mod completions;
mod config;
mod diff;
pub mod utils;
mod validate;

pub use assertion::handle_assert;
pub use completions::handle_completions;
pub use config::handle_config;
pub use diff::handle_diff;
pub use validate::handle_validate;
