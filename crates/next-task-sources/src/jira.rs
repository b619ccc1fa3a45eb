//! Jira issue search as a task source

use async_trait::async_trait;
use next_task_core::config::JiraConfig;
use next_task_core::{admit, Admission, CapacityBudget, DedupFilter, NextTaskError, TaskRecord, TaskSource};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchResult;
use crate::http::fetch_json;

/// Task kind for Jira issues
pub const KIND: &str = "Jira";

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: String,
    /// Plain text on server instances, a document object on newer cloud APIs
    #[serde(default)]
    description: Option<serde_json::Value>,
}

impl IssueFields {
    fn description_text(&self) -> String {
        match &self.description {
            Some(serde_json::Value::String(text)) => text.clone(),
            _ => String::new(),
        }
    }
}

/// Issues matching a JQL query, authenticated with a personal access token
pub struct JiraSource {
    client: Client,
    instance_url: String,
    access_token: String,
    jql: String,
}

impl JiraSource {
    /// Create a Jira source from its configuration
    pub fn new(client: Client, config: &JiraConfig) -> Self {
        Self {
            client,
            instance_url: config.instance_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            jql: config.jql.clone(),
        }
    }

    fn search_url(&self, max_results: usize) -> FetchResult<Url> {
        let mut url = Url::parse(&format!("{}/rest/api/latest/search", self.instance_url))?;
        url.query_pairs_mut()
            .append_pair("jql", &self.jql)
            .append_pair("maxResults", &max_results.to_string());
        Ok(url)
    }

    #[instrument(name = "jira", skip_all, fields(remaining = budget.remaining()))]
    async fn collect(
        &self,
        budget: &mut CapacityBudget,
        dedup: &mut DedupFilter,
    ) -> FetchResult<Vec<TaskRecord>> {
        let url = self.search_url(budget.remaining())?;
        debug!("Making GET request to {}", url.path());

        let results: SearchResults =
            fetch_json(self.client.get(url).bearer_auth(&self.access_token)).await?;
        debug!(count = results.issues.len(), "jira search returned issues");

        let mut tasks = Vec::new();
        for issue in results.issues {
            let description = issue.fields.description_text();
            let task = TaskRecord::new(KIND, issue.key, issue.fields.summary, description);
            match admit(budget, dedup, &task) {
                Admission::Accepted => tasks.push(task),
                Admission::Duplicate => {}
                Admission::CapacityExhausted => break,
            }
        }

        Ok(tasks)
    }
}

#[async_trait]
impl TaskSource for JiraSource {
    fn name(&self) -> &str {
        "Jira"
    }

    async fn fetch(
        &self,
        budget: &mut CapacityBudget,
        dedup: &mut DedupFilter,
    ) -> next_task_core::Result<Vec<TaskRecord>> {
        self.collect(budget, dedup)
            .await
            .map_err(|e| NextTaskError::Source(e.for_source(self.name())))
    }
}
