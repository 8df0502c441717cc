//! Client for the remote task REST API.
//!
//! One method per endpoint, one request per call. Non-2xx responses are
//! errors. No retries and no timeouts: a slow or failing API is the
//! caller's to report.

use reqwest::Client;
use tracing::debug;

use super::model::{Task, TaskListQuery, TaskPage, TaskPayload};
use crate::error::Error;

#[derive(Clone, Debug)]
pub struct TaskApi {
    http: Client,
    base_url: String,
}

impl TaskApi {
    /// `base_url` is the API root, e.g. `http://localhost:4000`.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let http = Client::builder().build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_owned() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /tasks?page&size&sortBy&direction`
    pub async fn list(&self, query: &TaskListQuery) -> Result<TaskPage, reqwest::Error> {
        debug!(?query, "listing tasks");
        self.http
            .get(self.url("/tasks"))
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// `GET /tasks/{id}`
    pub async fn get(&self, id: i64) -> Result<Task, reqwest::Error> {
        debug!(id, "fetching task");
        self.http
            .get(self.url(&format!("/tasks/{id}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// `POST /tasks`
    pub async fn create(&self, payload: &TaskPayload) -> Result<Task, reqwest::Error> {
        debug!(?payload, "creating task");
        self.http
            .post(self.url("/tasks"))
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// `PATCH /tasks/{id}`
    pub async fn update(&self, id: i64, payload: &TaskPayload) -> Result<Task, reqwest::Error> {
        debug!(id, ?payload, "updating task");
        self.http
            .patch(self.url(&format!("/tasks/{id}")))
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// `DELETE /tasks/{id}`
    pub async fn delete(&self, id: i64) -> Result<(), reqwest::Error> {
        debug!(id, "deleting task");
        self.http
            .delete(self.url(&format!("/tasks/{id}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
