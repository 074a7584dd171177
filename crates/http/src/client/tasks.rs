//! Task endpoints

use super::{ApiClient, error::ClientError, request::ApiRequest};
use bytes::Bytes;
use taskdash_core::{ImportSummary, Task, TaskCreate, TaskId, TaskStatus, TaskUpdate};

/// Filters for `GET /tasks/`.
///
/// Zero or absent values are left off the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListTasksQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<TaskStatus>,
}

impl ListTasksQuery {
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub const fn page(mut self, skip: u32, limit: u32) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }

    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(skip) = self.skip.filter(|skip| *skip > 0) {
            request = request.query("skip", skip);
        }
        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            request = request.query("limit", limit);
        }
        if let Some(status) = self.status {
            request = request.query("status", status.as_str());
        }
        request
    }
}

impl ApiClient {
    /// List the signed-in user's tasks
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn list_tasks(&self, query: &ListTasksQuery) -> Result<Vec<Task>, ClientError> {
        let request = query.apply(ApiRequest::get("/tasks/"));
        Ok(self.request(request).await?.unwrap_or_default())
    }

    /// Fetch a single task
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] with status 404 when the task is unknown.
    pub async fn get_task(&self, id: TaskId) -> Result<Task, ClientError> {
        self.fetch(ApiRequest::get(format!("/tasks/{id}"))).await
    }

    /// Create a task
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn create_task(&self, task: &TaskCreate) -> Result<Task, ClientError> {
        let task: Task = self.fetch(ApiRequest::post("/tasks/").json(task)?).await?;
        tracing::debug!(id = task.id, "created task");
        Ok(task)
    }

    /// Apply a partial update; only the fields set in `update` are sent
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<Task, ClientError> {
        self.fetch(ApiRequest::patch(format!("/tasks/{id}")).json(update)?)
            .await
    }

    /// Delete a task
    ///
    /// # Errors
    ///
    /// Returns the request's error.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), ClientError> {
        self.request::<serde_json::Value>(ApiRequest::delete(format!("/tasks/{id}")))
            .await?;
        tracing::debug!(id, "deleted task");
        Ok(())
    }

    /// Download every task as CSV
    ///
    /// # Errors
    ///
    /// Returns the request's error, with "Export failed" when the server
    /// gives no message.
    pub async fn export_tasks_csv(&self) -> Result<Bytes, ClientError> {
        self.request_bytes(ApiRequest::get("/tasks/export").fallback_message("Export failed"))
            .await
    }

    /// Upload a CSV file of tasks
    ///
    /// # Errors
    ///
    /// Returns the request's error, with "Import failed" when the server
    /// gives no message.
    pub async fn import_tasks_csv(
        &self,
        file_name: &str,
        contents: Bytes,
    ) -> Result<ImportSummary, ClientError> {
        let request = ApiRequest::post("/tasks/import")
            .file("file", file_name, "text/csv", contents)
            .fallback_message("Import failed");

        let summary: ImportSummary = self.fetch(request).await?;
        tracing::info!(imported = summary.imported, "imported tasks");
        Ok(summary)
    }
}
