//! CLI commands

mod completions;
mod next;
mod reset;
mod status;

pub use completions::CompletionsCommand;
pub use next::NextCommand;
pub use reset::ResetCommand;
pub use status::StatusCommand;
