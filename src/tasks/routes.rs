//! Task pages: one handler per route, one API call per handler.

use std::sync::Arc;

use tracing::info;

use super::error::TaskError;
use super::model::TaskPayload;
use super::{normalize, views};
use crate::app::AppState;
use crate::middleware::csrf;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

const DUE_DATE: &str = "dueDate";

pub fn routes(router: Router<AppState>) -> Router<AppState> {
    router
        .get("/tasks", list)
        .post("/tasks", create)
        .get("/tasks/new", new_form)
        .get("/tasks/{id}", show)
        .get("/tasks/{id}/edit", edit_form)
        .post("/tasks/{id}/edit", update)
        .post("/tasks/{id}/delete", delete)
}

fn task_id(req: &Request) -> Result<i64, TaskError> {
    let raw = req.param("id").unwrap_or_default();
    raw.parse().map_err(|_| TaskError::UnknownTask { id: raw.to_owned() })
}

async fn list(state: Arc<AppState>, req: Request) -> Result<Response, TaskError> {
    let query = normalize::build_task_list_query(&req.query());
    let page = state
        .api
        .list(&query)
        .await
        .map_err(TaskError::downstream("Failed to fetch tasks"))?;
    let view = normalize::map_task_page_to_view_model(page, &query);
    Ok(Response::html(views::index(&view)))
}

async fn new_form(_state: Arc<AppState>, req: Request) -> Response {
    Response::html(views::new_task(csrf::token(&req)))
}

async fn create(state: Arc<AppState>, req: Request) -> Result<Response, TaskError> {
    let form = req.form();
    let due_date = normalize::to_required_backend_date_time(DUE_DATE, form.get(DUE_DATE))?;
    let payload = TaskPayload {
        title: Some(normalize::required_text("title", form.get("title"))?),
        description: form.get("description").map(str::to_owned),
        status: Some(normalize::required_text("status", form.get("status"))?),
        due_date: Some(due_date),
    };

    let task = state
        .api
        .create(&payload)
        .await
        .map_err(TaskError::downstream("Failed to create task"))?;
    info!(id = task.id, "task created");
    Ok(Response::redirect("/tasks"))
}

async fn show(state: Arc<AppState>, req: Request) -> Result<Response, TaskError> {
    let id = task_id(&req)?;
    let task = state
        .api
        .get(id)
        .await
        .map_err(TaskError::downstream("Failed to fetch task"))?;
    let task = normalize::map_task_for_view(task);
    Ok(Response::html(views::show(&task, csrf::token(&req))))
}

async fn edit_form(state: Arc<AppState>, req: Request) -> Result<Response, TaskError> {
    let id = task_id(&req)?;
    let mut task = state
        .api
        .get(id)
        .await
        .map_err(TaskError::downstream("Failed to fetch task for editing"))?;
    task.due_date = normalize::to_editable_date_time(&task.due_date);
    Ok(Response::html(views::edit(&task, csrf::token(&req))))
}

async fn update(state: Arc<AppState>, req: Request) -> Result<Response, TaskError> {
    let id = task_id(&req)?;
    let form = req.form();
    let payload = TaskPayload {
        title: form.get("title").map(str::to_owned),
        description: form.get("description").map(str::to_owned),
        status: form.get("status").map(str::to_owned),
        due_date: normalize::to_optional_backend_date_time(DUE_DATE, form.get(DUE_DATE))?,
    };

    state
        .api
        .update(id, &payload)
        .await
        .map_err(TaskError::downstream("Failed to update task"))?;
    info!(id, "task updated");
    Ok(Response::redirect(&format!("/tasks/{id}")))
}

async fn delete(state: Arc<AppState>, req: Request) -> Result<Response, TaskError> {
    let id = task_id(&req)?;
    state
        .api
        .delete(id)
        .await
        .map_err(TaskError::downstream("Failed to delete task"))?;
    info!(id, "task deleted");
    Ok(Response::redirect("/tasks"))
}
