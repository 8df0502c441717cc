//! Conversions between raw request input, API payloads and view models.
//!
//! Everything here is pure: no I/O, no shared state. Inputs from the browser
//! are untrusted and degrade to defaults (list parameters) or to a typed
//! [`TaskError`] (dates and required fields) instead of reaching the API
//! malformed.
//!
//! # Date-times
//!
//! The API accepts one shape, the canonical local date-time
//! `YYYY-MM-DDTHH:MM:SS` with no offset. Forms send three:
//!
//! | Control | Sends | Canonical |
//! |---|---|---|
//! | `<input type="date">` | `2027-12-20` | `2027-12-20T00:00:00` |
//! | `<input type="datetime-local">` | `2027-12-20T15:45` | `2027-12-20T15:45:00` |
//! | API echo / scripted client | `2027-12-20T15:45:30` | unchanged |
//!
//! Those shapes are matched literally, in that order, before any general
//! parsing, so a value that is already canonical is passed through
//! byte-for-byte.
//!
//! Display formatting ([`format_task_due_date`]) is one-way: its output is
//! never parsed back.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;

use super::error::TaskError;
use super::model::{Task, TaskListQuery, TaskListView, TaskPage};
use crate::request::FormData;

pub const DEFAULT_PAGE: u32 = 0;
pub const DEFAULT_SIZE: u32 = 5;
pub const DEFAULT_SORT_BY: &str = "id";
pub const DEFAULT_DIRECTION: &str = "desc";

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const EDITABLE_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DISPLAY_FORMAT: &str = "%d %b %Y, %H:%M";

// `[0-9]`, not `\d`: the latter also matches non-ASCII digits.
static DATE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date pattern"));
static DATE_TIME_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}$")
        .expect("valid date-time pattern")
});
static DATE_TIME_SECONDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}$")
        .expect("valid date-time pattern")
});

/// Offset-free layouts tried by [`parse_date_time`], most specific first.
const NAIVE_LAYOUTS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
];

// ── List parameters ──────────────────────────────────────────────────────────

/// Builds list parameters from the raw query string. Never fails.
///
/// `page` and `size` read the leading digits of a single value, so `10abc`
/// is `10` and `1.5` is `1`. Anything without leading digits (absent, blank,
/// repeated, non-numeric, negative) or too large for a `u32` takes the default.
/// `sortBy` and `direction` accept any single non-blank value unchanged.
pub fn build_task_list_query(raw: &FormData) -> TaskListQuery {
    TaskListQuery {
        page: parse_count(raw.get("page"), DEFAULT_PAGE),
        size: parse_count(raw.get("size"), DEFAULT_SIZE),
        sort_by: non_blank_or(raw.get("sortBy"), DEFAULT_SORT_BY),
        direction: non_blank_or(raw.get("direction"), DEFAULT_DIRECTION),
    }
}

fn parse_count(value: Option<&str>, fallback: u32) -> u32 {
    value
        .map(str::trim)
        .map(|v| {
            let end = v.find(|c: char| !c.is_ascii_digit()).unwrap_or(v.len());
            &v[..end]
        })
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(fallback)
}

fn non_blank_or(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(fallback)
        .to_owned()
}

// ── View models ──────────────────────────────────────────────────────────────

/// Human-readable due date, e.g. `14 Feb 2026, 10:00`. Input that does not
/// parse is returned unchanged.
pub fn format_task_due_date(due_date: &str) -> String {
    parse_date_time(due_date)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| due_date.to_owned())
}

/// Copy of `task` with its due date formatted for display.
pub fn map_task_for_view(task: Task) -> Task {
    Task { due_date: format_task_due_date(&task.due_date), ..task }
}

/// Builds the list view from an API page.
///
/// Pagination metadata comes from the payload when present, with
/// conservative fallbacks. Sort state always comes from `query`: the API is
/// not relied on to echo it.
pub fn map_task_page_to_view_model(payload: TaskPage, query: &TaskListQuery) -> TaskListView {
    let tasks: Vec<Task> = payload
        .items
        .unwrap_or_default()
        .into_iter()
        .map(map_task_for_view)
        .collect();
    let count = tasks.len() as u64;

    TaskListView {
        tasks,
        page: payload.page.unwrap_or(0),
        size: payload.size.unwrap_or(query.size),
        total_elements: payload.total_elements.unwrap_or(count),
        total_pages: payload.total_pages.unwrap_or(1),
        first: payload.first.unwrap_or(true),
        last: payload.last.unwrap_or(true),
        sort_by: query.sort_by.clone(),
        direction: query.direction.clone(),
    }
}

/// Value for a `datetime-local` control: minute precision. Input that does
/// not parse is returned unchanged.
pub fn to_editable_date_time(due_date: &str) -> String {
    parse_date_time(due_date)
        .map(|dt| dt.format(EDITABLE_FORMAT).to_string())
        .unwrap_or_else(|| due_date.to_owned())
}

// ── Form input ───────────────────────────────────────────────────────────────

/// Normalizes a non-blank date-time to the canonical local shape.
///
/// Literal shapes are checked first, in order; only then is the value
/// parsed. Values carrying an offset are converted to this server's local
/// time.
pub fn normalize_date_time(field: &'static str, raw: &str) -> Result<String, TaskError> {
    let value = raw.trim();

    if DATE_ONLY.is_match(value) {
        return Ok(format!("{value}T00:00:00"));
    }
    if DATE_TIME_MINUTES.is_match(value) {
        return Ok(format!("{value}:00"));
    }
    if DATE_TIME_SECONDS.is_match(value) {
        return Ok(value.to_owned());
    }

    parse_date_time(value)
        .map(|dt| dt.format(CANONICAL_FORMAT).to_string())
        .ok_or_else(|| TaskError::InvalidDateTime { field, value: raw.to_owned() })
}

/// A date-time the request must carry.
pub fn to_required_backend_date_time(
    field: &'static str,
    raw: Option<&str>,
) -> Result<String, TaskError> {
    match raw {
        Some(value) if !value.trim().is_empty() => normalize_date_time(field, value),
        _ => Err(TaskError::MissingRequiredField { field }),
    }
}

/// A date-time the request may leave out. Absent or blank is `Ok(None)`;
/// a present value must still be valid.
pub fn to_optional_backend_date_time(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<String>, TaskError> {
    match raw {
        Some(value) if !value.trim().is_empty() => normalize_date_time(field, value).map(Some),
        _ => Ok(None),
    }
}

/// A text field the request must carry. The value is kept as sent.
pub fn required_text(field: &'static str, raw: Option<&str>) -> Result<String, TaskError> {
    raw.filter(|v| !v.trim().is_empty())
        .map(str::to_owned)
        .ok_or(TaskError::MissingRequiredField { field })
}

/// General date-time parsing: RFC 3339 / RFC 2822 (converted to local
/// time), the offset-free layouts above, then a bare date at midnight.
fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    let with_offset =
        DateTime::parse_from_rfc3339(raw).or_else(|_| DateTime::parse_from_rfc2822(raw));
    if let Ok(dt) = with_offset {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> FormData {
        pairs.iter().copied().collect()
    }

    fn task(due_date: &str) -> Task {
        Task {
            id: 1,
            title: "Task 1".into(),
            description: Some("Desc".into()),
            status: "PENDING".into(),
            due_date: due_date.into(),
            version: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn list_query(direction: &str) -> TaskListQuery {
        TaskListQuery { page: 0, size: 5, sort_by: "id".into(), direction: direction.into() }
    }

    #[test]
    fn list_query_defaults_when_empty() {
        let q = build_task_list_query(&FormData::default());
        let expected = TaskListQuery {
            page: 0,
            size: 5,
            sort_by: "id".into(),
            direction: "desc".into(),
        };
        assert_eq!(q, expected);
    }

    #[test]
    fn list_query_parses_valid_values() {
        let q = build_task_list_query(&query(&[
            ("page", "2"),
            ("size", "10"),
            ("sortBy", "title"),
            ("direction", "asc"),
        ]));
        let expected = TaskListQuery {
            page: 2,
            size: 10,
            sort_by: "title".into(),
            direction: "asc".into(),
        };
        assert_eq!(q, expected);
    }

    #[test]
    fn list_query_reads_leading_digits() {
        let q = build_task_list_query(&query(&[("page", " 10abc"), ("size", "1.5")]));
        assert_eq!((q.page, q.size), (10, 1));
    }

    #[test]
    fn list_query_falls_back_for_bad_numbers() {
        for bad in ["abc", "", "   ", "-1", ".5", "99999999999"] {
            let q = build_task_list_query(&query(&[("page", bad), ("size", bad)]));
            assert_eq!((q.page, q.size), (0, 5), "input {bad:?}");
        }
    }

    #[test]
    fn list_query_treats_repeated_keys_as_absent() {
        let q = build_task_list_query(&query(&[
            ("page", "1"),
            ("page", "2"),
            ("sortBy", "title"),
            ("sortBy", "status"),
        ]));
        assert_eq!(q.page, 0);
        assert_eq!(q.sort_by, "id");
    }

    #[test]
    fn list_query_passes_sort_values_through() {
        let q = build_task_list_query(&query(&[("sortBy", "dueDate"), ("direction", "sideways")]));
        assert_eq!(q.sort_by, "dueDate");
        assert_eq!(q.direction, "sideways");

        let q = build_task_list_query(&query(&[("sortBy", "  "), ("direction", "")]));
        assert_eq!((q.sort_by.as_str(), q.direction.as_str()), ("id", "desc"));
    }

    #[test]
    fn formats_due_dates_for_display() {
        let formatted = format_task_due_date("2026-02-14T10:00:00");
        assert_eq!(formatted, "14 Feb 2026, 10:00");
        assert!(formatted.contains("2026"));
        assert!(formatted.contains(':'));

        assert_eq!(format_task_due_date("2026-02-14T10:00:00.123456"), "14 Feb 2026, 10:00");
        assert_eq!(format_task_due_date("2026-02-14"), "14 Feb 2026, 00:00");
    }

    #[test]
    fn unparseable_due_dates_are_returned_unchanged() {
        assert_eq!(format_task_due_date("not-a-date"), "not-a-date");
        assert_eq!(format_task_due_date(""), "");
    }

    #[test]
    fn map_task_for_view_only_touches_due_date() {
        let mapped = map_task_for_view(task("2026-02-14T10:00:00"));
        assert_eq!(mapped.title, "Task 1");
        assert_eq!(mapped.description.as_deref(), Some("Desc"));
        assert_eq!(mapped.status, "PENDING");
        assert_ne!(mapped.due_date, "2026-02-14T10:00:00");
    }

    #[test]
    fn page_view_keeps_payload_metadata() {
        let payload = TaskPage {
            items: Some(vec![task("2026-02-14T10:00:00")]),
            page: Some(3),
            size: Some(10),
            total_elements: Some(31),
            total_pages: Some(4),
            first: Some(false),
            last: Some(true),
        };
        let view = map_task_page_to_view_model(payload, &list_query("asc"));

        assert_eq!(view.tasks.len(), 1);
        assert_eq!(view.tasks[0].due_date, "14 Feb 2026, 10:00");
        assert_eq!((view.page, view.size, view.total_elements, view.total_pages), (3, 10, 31, 4));
        assert!(!view.first);
        assert!(view.last);
        assert_eq!(view.sort_by, "id");
        assert_eq!(view.direction, "asc");
    }

    #[test]
    fn page_view_defaults_for_empty_payload() {
        let view = map_task_page_to_view_model(TaskPage::default(), &list_query("asc"));
        assert_eq!(
            view,
            TaskListView {
                tasks: vec![],
                page: 0,
                size: 5,
                total_elements: 0,
                total_pages: 1,
                first: true,
                last: true,
                sort_by: "id".into(),
                direction: "asc".into(),
            }
        );
    }

    #[test]
    fn page_view_counts_items_when_total_missing() {
        let payload = TaskPage {
            items: Some(vec![task("x"), task("y")]),
            ..TaskPage::default()
        };
        let view = map_task_page_to_view_model(payload, &list_query("desc"));
        assert_eq!(view.total_elements, 2);
        assert_eq!(view.tasks[0].due_date, "x");
    }

    #[test]
    fn sort_state_never_comes_from_payload() {
        // Even a payload that disagrees cannot move sort state: TaskPage has
        // no sort fields, and the view copies them from the query.
        let view = map_task_page_to_view_model(TaskPage::default(), &list_query("desc"));
        assert_eq!((view.sort_by.as_str(), view.direction.as_str()), ("id", "desc"));
    }

    #[test]
    fn required_date_ladder() {
        let req = |v| to_required_backend_date_time("dueDate", Some(v)).unwrap();
        assert_eq!(req("2027-12-20"), "2027-12-20T00:00:00");
        assert_eq!(req("2027-12-20T15:45"), "2027-12-20T15:45:00");
        assert_eq!(req("2027-12-20T15:45:30"), "2027-12-20T15:45:30");
        assert_eq!(req("  2027-12-20  "), "2027-12-20T00:00:00");
    }

    #[test]
    fn general_parsing_truncates_to_seconds() {
        let norm = |v| normalize_date_time("dueDate", v).unwrap();
        assert_eq!(norm("2027-12-20T15:45:30.987"), "2027-12-20T15:45:30");
        assert_eq!(norm("2027-12-20 15:45"), "2027-12-20T15:45:00");
    }

    #[test]
    fn offset_values_become_server_local_time() {
        let local = |raw: &str| {
            DateTime::parse_from_rfc3339(raw)
                .or_else(|_| DateTime::parse_from_rfc2822(raw))
                .unwrap()
                .with_timezone(&Local)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string()
        };

        let rfc3339 = "2027-12-20T15:45:30+02:00";
        assert_eq!(normalize_date_time("dueDate", rfc3339).unwrap(), local(rfc3339));
        let utc = "2027-12-20T13:45:30Z";
        assert_eq!(normalize_date_time("dueDate", utc).unwrap(), local(rfc3339));

        let rfc2822 = "Mon, 20 Dec 2027 15:45:30 +0200";
        assert_eq!(normalize_date_time("dueDate", rfc2822).unwrap(), local(rfc2822));
        assert_eq!(local(rfc2822), local(rfc3339));
    }

    #[test]
    fn canonical_values_are_idempotent() {
        let once = normalize_date_time("dueDate", "2027-12-20T15:45").unwrap();
        assert_eq!(normalize_date_time("dueDate", &once).unwrap(), once);
    }

    #[test]
    fn required_date_errors() {
        assert!(matches!(
            to_required_backend_date_time("dueDate", None),
            Err(TaskError::MissingRequiredField { field: "dueDate" })
        ));
        assert!(matches!(
            to_required_backend_date_time("dueDate", Some("  ")),
            Err(TaskError::MissingRequiredField { .. })
        ));

        let err = to_required_backend_date_time("dueDate", Some("not-a-date")).unwrap_err();
        assert!(matches!(
            err,
            TaskError::InvalidDateTime { field: "dueDate", ref value } if value == "not-a-date"
        ));
        assert_eq!(err.to_string(), "dueDate must be a valid date");
    }

    #[test]
    fn optional_date_absent_sentinel() {
        assert_eq!(to_optional_backend_date_time("dueDate", Some("")).unwrap(), None);
        assert_eq!(to_optional_backend_date_time("dueDate", Some("   ")).unwrap(), None);
        assert_eq!(to_optional_backend_date_time("dueDate", None).unwrap(), None);
    }

    #[test]
    fn optional_date_still_validates() {
        assert_eq!(
            to_optional_backend_date_time("dueDate", Some("2027-12-20")).unwrap().as_deref(),
            Some("2027-12-20T00:00:00")
        );
        assert_eq!(
            to_optional_backend_date_time("dueDate", Some("2027-12-20T15:45")).unwrap().as_deref(),
            Some("2027-12-20T15:45:00")
        );
        assert!(matches!(
            to_optional_backend_date_time("dueDate", Some("tomorrow")),
            Err(TaskError::InvalidDateTime { .. })
        ));
    }

    #[test]
    fn editable_date_time_has_minute_precision() {
        assert_eq!(to_editable_date_time("2026-02-14T10:30:59"), "2026-02-14T10:30");
        assert_eq!(to_editable_date_time("2026-02-14"), "2026-02-14T00:00");
        assert_eq!(to_editable_date_time("garbage"), "garbage");
    }

    #[test]
    fn required_text_rejects_blank() {
        assert_eq!(required_text("title", Some(" Write ")).unwrap(), " Write ");
        assert!(matches!(
            required_text("title", Some("\t")),
            Err(TaskError::MissingRequiredField { field: "title" })
        ));
        assert!(required_text("status", None).is_err());
    }
}
