//! Task source adapters for next-task
//!
//! Each adapter implements [`next_task_core::TaskSource`] and offers its
//! candidates through the shared capacity budget and title filter.
//!
//! ## Supported Sources
//!
//! - **Gmail**: inbox messages become "Process: <subject>" tasks
//! - **Google Tasks**: open items across all task lists
//! - **Jira**: issues matching a JQL query
//!
//! ## Usage
//!
//! ```ignore
//! use next_task_sources::{build_client, build_sources};
//!
//! let client = build_client(config.http.timeout())?;
//! let sources = build_sources(&config, &client)?;
//! ```

pub mod error;
pub mod google;
pub mod http;
pub mod jira;

use std::sync::Arc;

use next_task_core::config::Config;
use next_task_core::{SourceError, TaskSource};
use reqwest::Client;
use tracing::debug;

pub use error::{FetchError, FetchResult};
pub use google::{GmailSource, GoogleAuth, GoogleTasksSource};
pub use http::build_client;
pub use jira::JiraSource;

/// Build the enabled sources in priority order: Gmail, Google Tasks, Jira
pub fn build_sources(config: &Config, client: &Client) -> Result<Vec<Box<dyn TaskSource>>, SourceError> {
    let mut sources: Vec<Box<dyn TaskSource>> = Vec::new();

    if let Some(google) = &config.sources.google {
        if google.mail || google.tasks {
            let auth = GoogleAuth::from_files(
                client.clone(),
                &google.credentials_path,
                &google.token_path,
            )
            .map_err(|e| e.for_source("Google"))?;
            let auth = Arc::new(auth);

            if google.mail {
                sources.push(Box::new(
                    GmailSource::new(Arc::clone(&auth)).with_query(google.mail_query.clone()),
                ));
            }
            if google.tasks {
                sources.push(Box::new(GoogleTasksSource::new(auth)));
            }
        }
    }

    if let Some(jira) = &config.sources.jira {
        sources.push(Box::new(JiraSource::new(client.clone(), jira)));
    }

    debug!(
        sources = ?sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
        "configured sources"
    );
    Ok(sources)
}
