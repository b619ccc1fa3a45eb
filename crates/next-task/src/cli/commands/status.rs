//! Cache status command

use clap::Args;
use console::style;
use next_task_core::config::{load_settings, Config, Paths};
use next_task_core::FsTaskStore;
use tracing::info;

use crate::cli::{output, Cli, OutputFormat};

/// Show cache statistics and configured sources
#[derive(Debug, Args)]
pub struct StatusCommand;

impl StatusCommand {
    /// Execute the status command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let paths = Paths::resolve()?;
        self.run(cli, &paths)
    }

    fn run(&self, cli: &Cli, paths: &Paths) -> anyhow::Result<()> {
        info!("executing status command");
        let (config, config_path) = load_settings(paths)?;
        let store = FsTaskStore::new(&config.cache.dir);
        let stats = store.stats()?;
        let sources = enabled_sources(&config);

        if cli.format == OutputFormat::Json {
            let result = serde_json::json!({
                "cache_dir": store.cache_dir().display().to_string(),
                "entries": stats.entries,
                "total_size": stats.total_size,
                "total_size_formatted": stats.formatted_size(),
                "capacity": config.cache.capacity,
                "config_file": config_path.map(|p| p.display().to_string()),
                "sources": sources,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if !cli.quiet {
            println!("{}", output::header("Task Cache Status"));
            println!();
            println!("  Location: {}", style(store.cache_dir().display()).cyan());
            println!("  Entries:  {}", stats.entries);
            println!("  Size:     {}", style(stats.formatted_size()).yellow());
            println!("  Capacity: {}", config.cache.capacity);
            println!();
            let config_file = config_path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(defaults)".to_string());
            println!("{}", output::key_value("Config", &config_file));
            let sources = if sources.is_empty() {
                "none".to_string()
            } else {
                sources.join(", ")
            };
            println!("{}", output::key_value("Sources", &sources));
        }

        Ok(())
    }
}

/// Names of the sources a refill would query, in priority order
fn enabled_sources(config: &Config) -> Vec<&'static str> {
    let mut names = Vec::new();
    if let Some(google) = &config.sources.google {
        if google.mail {
            names.push("Gmail");
        }
        if google.tasks {
            names.push("Google Tasks");
        }
    }
    if config.sources.jira.is_some() {
        names.push("Jira");
    }
    names
}
