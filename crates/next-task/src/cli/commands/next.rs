//! Default command: deliver one task

use std::io::{self, Write};

use clap::Args;
use next_task_core::config::{load_settings, Paths};
use next_task_core::{FsTaskStore, Orchestrator, TaskRecord};
use next_task_sources::{build_client, build_sources};
use tracing::{debug, info, warn};

use crate::cli::{output, Cli, OutputFormat};

/// Print one task at random and remove it from the cache
#[derive(Debug, Args)]
pub struct NextCommand;

impl NextCommand {
    /// Execute the next command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let paths = Paths::resolve()?;
        self.run(cli, &paths, &mut io::stdout().lock())
    }

    fn run<W: Write>(&self, cli: &Cli, paths: &Paths, out: &mut W) -> anyhow::Result<()> {
        info!("executing next command");
        let (config, config_path) = load_settings(paths)?;
        if let Some(path) = &config_path {
            debug!(path = %path.display(), "using config file");
        }

        let client = build_client(config.http.timeout())?;
        let sources = build_sources(&config, &client)?;
        if sources.is_empty() {
            warn!("no task sources configured");
        }

        let store = FsTaskStore::new(&config.cache.dir);
        let mut orchestrator =
            Orchestrator::new(store, config.cache.capacity).with_sources(sources);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let format = cli.format;
        let task = runtime.block_on(orchestrator.next_task(|task| deliver(task, format, out)))?;
        debug!(kind = %task.kind, id = %task.id, "task delivered");
        Ok(())
    }
}

fn deliver<W: Write>(task: &TaskRecord, format: OutputFormat, out: &mut W) -> io::Result<()> {
    let rendered = match format {
        OutputFormat::Text => output::render_task(task),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(task).map_err(io::Error::other)?;
            json.push('\n');
            json
        }
    };
    out.write_all(rendered.as_bytes())?;
    out.flush()
}
