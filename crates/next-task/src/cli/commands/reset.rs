//! Cache reset command

use clap::Args;
use next_task_core::config::{resolve_cache_dir, Paths};
use next_task_core::FsTaskStore;
use tracing::info;

use crate::cli::{output, Cli, OutputFormat};

/// Delete every cached task
///
/// Only the cache location is read from the configuration, so a broken
/// config file does not block a reset.
#[derive(Debug, Args)]
pub struct ResetCommand;

impl ResetCommand {
    /// Execute the reset command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let paths = Paths::resolve()?;
        self.run(cli, &paths)
    }

    fn run(&self, cli: &Cli, paths: &Paths) -> anyhow::Result<()> {
        info!("executing reset command");
        let store = FsTaskStore::new(resolve_cache_dir(paths));
        store.reset()?;

        if cli.format == OutputFormat::Json {
            let result = serde_json::json!({
                "reset": true,
                "cache_dir": store.cache_dir().display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if !cli.quiet {
            output::success(&format!(
                "Cleared task cache at {}",
                store.cache_dir().display()
            ));
        }

        Ok(())
    }
}
