//! Google Tasks as a task source

use std::sync::Arc;

use async_trait::async_trait;
use next_task_core::{admit, Admission, CapacityBudget, DedupFilter, NextTaskError, TaskRecord, TaskSource};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::GoogleAuth;
use crate::error::FetchResult;

const API_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

/// Largest page the tasks.list endpoint accepts
const MAX_RESULTS: usize = 100;

/// Task kind for Google Tasks items
pub const KIND: &str = "GoogleTask";

#[derive(Debug, Deserialize)]
struct ItemList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TaskList {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct Item {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    notes: Option<String>,
}

/// Open tasks across every task list of the user
pub struct GoogleTasksSource {
    auth: Arc<GoogleAuth>,
    base_url: String,
}

impl GoogleTasksSource {
    /// Create a Google Tasks source using the shared Google client
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self {
            auth,
            base_url: API_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn tasks_url(&self, list_id: &str, max_results: usize) -> FetchResult<Url> {
        let mut url = Url::parse(&format!("{}/lists/{}/tasks", self.base_url, list_id))?;
        url.query_pairs_mut()
            .append_pair("showCompleted", "false")
            .append_pair("showDeleted", "false")
            .append_pair("maxResults", &max_results.min(MAX_RESULTS).to_string());
        Ok(url)
    }

    #[instrument(name = "google_tasks", skip_all, fields(remaining = budget.remaining()))]
    async fn collect(
        &self,
        budget: &mut CapacityBudget,
        dedup: &mut DedupFilter,
    ) -> FetchResult<Vec<TaskRecord>> {
        let lists_url = Url::parse(&format!("{}/users/@me/lists", self.base_url))?;
        let lists: ItemList<TaskList> = self.auth.get_json(lists_url).await?;
        debug!(count = lists.items.len(), "listed google task lists");

        let mut tasks = Vec::new();
        'lists: for list in lists.items {
            if budget.is_exhausted() {
                break;
            }

            let url = self.tasks_url(&list.id, budget.remaining())?;
            let items: ItemList<Item> = self.auth.get_json(url).await?;
            debug!(list = %list.title, count = items.items.len(), "listed open tasks");

            for item in items.items {
                if item.title.trim().is_empty() {
                    continue;
                }

                let task = TaskRecord::new(KIND, item.id, item.title, item.notes.unwrap_or_default());
                match admit(budget, dedup, &task) {
                    Admission::Accepted => tasks.push(task),
                    Admission::Duplicate => {}
                    Admission::CapacityExhausted => break 'lists,
                }
            }
        }

        Ok(tasks)
    }
}

#[async_trait]
impl TaskSource for GoogleTasksSource {
    fn name(&self) -> &str {
        "Google Tasks"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::testing::authorized;
    use next_task_core::SourceError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_lists(server: &MockServer, ids: &[&str]) {
        let items: Vec<_> = ids
            .iter()
            .map(|id| serde_json::json!({"id": id, "title": format!("List {id}")}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/tasks/v1/users/@me/lists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": items })))
            .mount(server)
            .await;
    }

    async fn mount_items(server: &MockServer, list: &str, items: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/tasks/v1/lists/{list}/tasks")))
            .and(query_param("showCompleted", "false"))
            .and(query_param("showDeleted", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": items })))
            .mount(server)
            .await;
    }

    fn source(server: &MockServer) -> (tempfile::TempDir, GoogleTasksSource) {
        let (temp, auth) = authorized(&server.uri());
        let source = GoogleTasksSource::new(Arc::new(auth))
            .with_base_url(format!("{}/tasks/v1", server.uri()));
        (temp, source)
    }

    #[tokio::test]
    async fn test_open_tasks_across_lists() {
        let server = MockServer::start().await;
        mount_lists(&server, &["a", "b"]).await;
        mount_items(
            &server,
            "a",
            serde_json::json!([
                {"id": "t1", "title": "Buy milk", "notes": "2 litres"},
                {"id": "t2", "title": "  "},
            ]),
        )
        .await;
        mount_items(
            &server,
            "b",
            serde_json::json!([
                {"id": "t3", "title": "Buy milk"},
                {"id": "t4", "title": "Call plumber"},
            ]),
        )
        .await;

        let (_temp, source) = source(&server);
        let mut budget = CapacityBudget::new(10);
        let tasks = source
            .fetch(&mut budget, &mut DedupFilter::new())
            .await
            .unwrap();

        assert_eq!(
            tasks,
            vec![
                TaskRecord::new("GoogleTask", "t1", "Buy milk", "2 litres"),
                TaskRecord::new("GoogleTask", "t4", "Call plumber", ""),
            ]
        );
        assert_eq!(budget.remaining(), 8);
    }

    #[tokio::test]
    async fn test_skips_lists_once_budget_spent() {
        let server = MockServer::start().await;
        mount_lists(&server, &["a", "b"]).await;
        mount_items(
            &server,
            "a",
            serde_json::json!([{"id": "t1", "title": "One"}, {"id": "t2", "title": "Two"}]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/tasks/v1/lists/b/tasks"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (_temp, source) = source(&server);
        let mut budget = CapacityBudget::new(1);
        let tasks = source
            .fetch(&mut budget, &mut DedupFilter::new())
            .await
            .unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "One");
    }

    #[tokio::test]
    async fn test_titles_seen_by_earlier_source_are_dropped() {
        let server = MockServer::start().await;
        mount_lists(&server, &["a"]).await;
        mount_items(&server, "a", serde_json::json!([{"id": "t1", "title": "Shared"}])).await;

        let (_temp, source) = source(&server);
        let mut dedup = DedupFilter::new();
        dedup.record("Shared");
        let tasks = source
            .fetch(&mut CapacityBudget::new(5), &mut dedup)
            .await
            .unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_page_size_clamped_to_api_maximum() {
        let server = MockServer::start().await;
        mount_lists(&server, &["a"]).await;
        Mock::given(method("GET"))
            .and(path("/tasks/v1/lists/a/tasks"))
            .and(query_param("maxResults", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let (_temp, source) = source(&server);
        let tasks = source
            .fetch(&mut CapacityBudget::new(1_000), &mut DedupFilter::new())
            .await
            .unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_no_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/v1/users/@me/lists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"kind": "tasks#taskLists"})))
            .mount(&server)
            .await;

        let (_temp, source) = source(&server);
        let tasks = source
            .fetch(&mut CapacityBudget::new(5), &mut DedupFilter::new())
            .await
            .unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/v1/users/@me/lists"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let (_temp, source) = source(&server);
        let err = source
            .fetch(&mut CapacityBudget::new(5), &mut DedupFilter::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NextTaskError::Source(SourceError::Decode { .. })
        ));
    }
}
