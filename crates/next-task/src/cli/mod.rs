//! CLI definition and command handling

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{CompletionsCommand, NextCommand, ResetCommand, StatusCommand};

/// next-task - print one pending task, then forget it
///
/// Tasks are gathered from Gmail, Google Tasks and Jira into a local cache.
/// Each run prints one cached task at random and removes it; when the cache
/// is empty it is refilled from the configured sources.
#[derive(Debug, Parser)]
#[command(name = "next-task")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Delete the task cache and exit
    #[arg(long)]
    pub reset: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the next task (the default)
    Next(NextCommand),

    /// Delete the task cache
    Reset(ResetCommand),

    /// Show cache location, size and configured sources
    Status(StatusCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> anyhow::Result<()> {
        if self.reset {
            return ResetCommand.execute(self);
        }

        match &self.command {
            None => NextCommand.execute(self),
            Some(Commands::Next(cmd)) => cmd.execute(self),
            Some(Commands::Reset(cmd)) => cmd.execute(self),
            Some(Commands::Status(cmd)) => cmd.execute(self),
            Some(Commands::Completions(cmd)) => cmd.execute(self),
        }
    }
}
