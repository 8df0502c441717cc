//! Wire and view shapes for tasks.

use serde::{Deserialize, Serialize};

/// A task as the API represents it.
///
/// `dueDate` stays a string: the API sends local date-times without an
/// offset, and views only ever reformat it for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One page of tasks from `GET /tasks`. Every field may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPage {
    pub items: Option<Vec<Task>>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub total_elements: Option<u64>,
    pub total_pages: Option<u32>,
    pub first: Option<bool>,
    pub last: Option<bool>,
}

/// Normalized list parameters, sent to the API as the query string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub direction: String,
}

/// Body of `POST /tasks` and `PATCH /tasks/{id}`.
///
/// `None` fields are left out of the JSON, which the API reads as "keep the
/// current value" on update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Everything the list page renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskListView {
    /// Tasks with `due_date` already formatted for display.
    pub tasks: Vec<Task>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
    pub sort_by: String,
    pub direction: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_reads_backend_response() {
        let task: Task = serde_json::from_value(json!({
            "id": 3,
            "version": 1,
            "title": "File report",
            "description": null,
            "status": "PENDING",
            "dueDate": "2026-02-14T10:00:00",
            "createdAt": "2026-01-01T09:00:00",
            "updatedAt": "2026-01-01T09:00:00"
        }))
        .unwrap();
        assert_eq!(task.id, 3);
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, "2026-02-14T10:00:00");
        assert_eq!(task.created_at.as_deref(), Some("2026-01-01T09:00:00"));
    }

    #[test]
    fn page_tolerates_missing_fields() {
        let page: TaskPage = serde_json::from_value(json!({ "totalPages": 4 })).unwrap();
        assert_eq!(page.items, None);
        assert_eq!(page.total_pages, Some(4));
    }

    #[test]
    fn payload_omits_absent_fields() {
        let payload = TaskPayload {
            title: Some("Renamed".into()),
            ..TaskPayload::default()
        };
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({ "title": "Renamed" }));
    }
}
