//! Gmail inbox as a task source

use std::sync::Arc;

use async_trait::async_trait;
use next_task_core::{admit, Admission, CapacityBudget, DedupFilter, NextTaskError, TaskRecord, TaskSource};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::GoogleAuth;
use crate::error::FetchResult;

const API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Largest page the messages.list endpoint accepts
const MAX_RESULTS: usize = 500;

/// Task kind for mail-derived tasks
pub const KIND: &str = "GoogleMail";

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Message {
    id: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

impl Message {
    fn subject(&self) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case("Subject"))
            .map(|h| h.value.as_str())
    }
}

/// Turns each inbox message into a "Process: <subject>" task
pub struct GmailSource {
    auth: Arc<GoogleAuth>,
    base_url: String,
    query: Option<String>,
}

impl GmailSource {
    /// Create a Gmail source using the shared Google client
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self {
            auth,
            base_url: API_BASE_URL.to_string(),
            query: None,
        }
    }

    /// Restrict listed messages with a Gmail search query
    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn list_url(&self, max_results: usize) -> FetchResult<Url> {
        let mut url = Url::parse(&format!("{}/users/me/messages", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("maxResults", &max_results.min(MAX_RESULTS).to_string());
        if let Some(query) = &self.query {
            url.query_pairs_mut().append_pair("q", query);
        }
        Ok(url)
    }

    fn message_url(&self, id: &str) -> FetchResult<Url> {
        let mut url = Url::parse(&format!("{}/users/me/messages/{}", self.base_url, id))?;
        url.query_pairs_mut()
            .append_pair("format", "metadata")
            .append_pair("metadataHeaders", "Subject");
        Ok(url)
    }

    #[instrument(name = "gmail", skip_all, fields(remaining = budget.remaining()))]
    async fn collect(
        &self,
        budget: &mut CapacityBudget,
        dedup: &mut DedupFilter,
    ) -> FetchResult<Vec<TaskRecord>> {
        let list: MessageList = self.auth.get_json(self.list_url(budget.remaining())?).await?;
        debug!(count = list.messages.len(), "listed gmail messages");

        let mut tasks = Vec::new();
        for message_ref in list.messages {
            if budget.is_exhausted() {
                break;
            }

            let message: Message = self.auth.get_json(self.message_url(&message_ref.id)?).await?;
            let Some(subject) = message.subject() else {
                debug!(id = %message.id, "message has no subject, skipping");
                continue;
            };

            let task = TaskRecord::new(
                KIND,
                message.id.clone(),
                format!("Process: {subject}"),
                message.snippet.clone(),
            );
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
impl TaskSource for GmailSource {
    fn name(&self) -> &str {
        "Gmail"
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
