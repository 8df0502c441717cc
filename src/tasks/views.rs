//! HTML views.
//!
//! Each view renders a complete page to a `String`. Every interpolated value
//! goes through [`escape`]; query strings are built with `form_urlencoded`.

use std::fmt::Write as _;

use http::StatusCode;
use url::form_urlencoded;

use super::model::{Task, TaskListView};
use crate::middleware::csrf::FIELD_NAME;
use crate::response::Response;

/// Status values the API accepts, with their labels.
const STATUSES: [(&str, &str); 3] = [
    ("PENDING", "Pending"),
    ("IN_PROGRESS", "In progress"),
    ("COMPLETED", "Completed"),
];

/// Sortable list columns: API field and heading.
const COLUMNS: [(&str, &str); 4] = [
    ("id", "ID"),
    ("title", "Title"),
    ("status", "Status"),
    ("dueDate", "Due date"),
];

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - Tasks</title>
</head>
<body>
<header><a href="/tasks">Tasks</a></header>
<main id="main-content">
{main}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn csrf_field(token: &str) -> String {
    format!(r#"<input type="hidden" name="{FIELD_NAME}" value="{}">"#, escape(token))
}

fn status_label(status: &str) -> &str {
    STATUSES
        .iter()
        .find(|(value, _)| *value == status)
        .map(|(_, label)| *label)
        .unwrap_or(status)
}

fn status_options(selected: &str) -> String {
    STATUSES
        .iter()
        .map(|(value, label)| {
            let attr = if *value == selected { " selected" } else { "" };
            format!(r#"<option value="{value}"{attr}>{label}</option>"#)
        })
        .collect()
}

fn list_href(page: u32, size: u32, sort_by: &str, direction: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("page", &page.to_string())
        .append_pair("size", &size.to_string())
        .append_pair("sortBy", sort_by)
        .append_pair("direction", direction)
        .finish();
    format!("/tasks?{query}")
}

/// `GET /tasks`
pub fn index(view: &TaskListView) -> String {
    let mut main = String::from(
        r#"<h1>Tasks</h1>
<p><a href="/tasks/new">Create a new task</a></p>
"#,
    );

    if view.tasks.is_empty() {
        main.push_str("<p>No tasks found.</p>\n");
    } else {
        main.push_str("<table>\n<thead><tr>");
        for (field, heading) in COLUMNS {
            // Clicking the active column flips it; any other column starts ascending.
            let (direction, aria) = match (field == view.sort_by, view.direction.as_str()) {
                (true, "asc") => ("desc", r#" aria-sort="ascending""#),
                (true, _) => ("asc", r#" aria-sort="descending""#),
                (false, _) => ("asc", ""),
            };
            let href = list_href(0, view.size, field, direction);
            let _ = write!(main, r#"<th{aria}><a href="{}">{heading}</a></th>"#, escape(&href));
        }
        main.push_str("</tr></thead>\n<tbody>\n");
        for task in &view.tasks {
            let _ = writeln!(
                main,
                r#"<tr><td>{id}</td><td><a href="/tasks/{id}">{title}</a></td><td>{status}</td><td>{due}</td></tr>"#,
                id = task.id,
                title = escape(&task.title),
                status = escape(status_label(&task.status)),
                due = escape(&task.due_date),
            );
        }
        main.push_str("</tbody>\n</table>\n");
    }

    let _ = writeln!(
        main,
        "<p>Page {} of {} ({} tasks)</p>",
        view.page.saturating_add(1),
        view.total_pages.max(1),
        view.total_elements,
    );
    main.push_str("<nav aria-label=\"Pagination\">");
    if !view.first {
        let prev = view.page.saturating_sub(1);
        let href = list_href(prev, view.size, &view.sort_by, &view.direction);
        let _ = write!(main, r#"<a href="{}" rel="prev">Previous</a> "#, escape(&href));
    }
    if let Some(next) = view.page.checked_add(1).filter(|_| !view.last) {
        let href = list_href(next, view.size, &view.sort_by, &view.direction);
        let _ = write!(main, r#"<a href="{}" rel="next">Next</a>"#, escape(&href));
    }
    main.push_str("</nav>");

    layout("Tasks", &main)
}

/// `GET /tasks/new`
pub fn new_task(csrf_token: &str) -> String {
    let main = format!(
        r#"<h1>Create a new task</h1>
<form method="post" action="/tasks">
{csrf}
<label for="title">Title</label>
<input id="title" name="title" type="text" required>
<label for="description">Description (optional)</label>
<textarea id="description" name="description"></textarea>
<label for="status">Status</label>
<select id="status" name="status">{options}</select>
<label for="dueDate">Due date</label>
<input id="dueDate" name="dueDate" type="date" required>
<button type="submit">Create task</button>
</form>"#,
        csrf = csrf_field(csrf_token),
        options = status_options("PENDING"),
    );
    layout("Create a new task", &main)
}

/// `GET /tasks/{id}`; `task` carries a display-formatted due date.
pub fn show(task: &Task, csrf_token: &str) -> String {
    let mut main = format!(
        r#"<h1>{title}</h1>
<dl>
<dt>Status</dt><dd>{status}</dd>
<dt>Due</dt><dd>{due}</dd>
"#,
        title = escape(&task.title),
        status = escape(status_label(&task.status)),
        due = escape(&task.due_date),
    );
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(main, "<dt>Description</dt><dd>{}</dd>", escape(description));
    }
    main.push_str("</dl>\n");
    let _ = write!(
        main,
        r#"<p><a href="/tasks/{id}/edit">Edit task</a></p>
<form method="post" action="/tasks/{id}/delete">
{csrf}
<button type="submit">Delete task</button>
</form>
<p><a href="/tasks">Back to all tasks</a></p>"#,
        id = task.id,
        csrf = csrf_field(csrf_token),
    );
    layout(&task.title, &main)
}

/// `GET /tasks/{id}/edit`; `task` carries a minute-precision due date.
pub fn edit(task: &Task, csrf_token: &str) -> String {
    let main = format!(
        r#"<h1>Edit task</h1>
<form method="post" action="/tasks/{id}/edit">
{csrf}
<label for="title">Title</label>
<input id="title" name="title" type="text" value="{title}" required>
<label for="description">Description (optional)</label>
<textarea id="description" name="description">{description}</textarea>
<label for="status">Status</label>
<select id="status" name="status">{options}</select>
<label for="dueDate">Due date</label>
<input id="dueDate" name="dueDate" type="datetime-local" value="{due}">
<button type="submit">Save changes</button>
</form>
<p><a href="/tasks/{id}">Cancel</a></p>"#,
        id = task.id,
        csrf = csrf_field(csrf_token),
        title = escape(&task.title),
        description = escape(task.description.as_deref().unwrap_or_default()),
        options = status_options(&task.status),
        due = escape(&task.due_date),
    );
    layout("Edit task", &main)
}

pub fn error(message: &str) -> String {
    let main = format!(
        r#"<h1>Sorry, there is a problem</h1>
<p class="error-message">{}</p>
<p><a href="/tasks">Back to all tasks</a></p>"#,
        escape(message),
    );
    layout("Error", &main)
}

/// The error page as a response with `status`.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    Response::builder().status(status).html(error(message))
}
