use super::{done, parse, HandlerResult, ToolDefinition};
use crate::format::hours;
use crate::http::FreeloClient;
use crate::schema::{Field, ObjectSchema};
use crate::types::{CreateWorkReportParams, TimeTrackingStartParams, WorkReport, WorkReportFilter};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};

pub(super) fn tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "freelo_start_timer",
            "Start time tracking on a task",
            ObjectSchema::new()
                .field(Field::positive_int("task_id", "Task ID to track time on").required())
                .field(Field::string("note", "Optional note for the time entry")),
            start_timer,
        ),
        ToolDefinition::new(
            "freelo_stop_timer",
            "Stop the currently running time tracking",
            ObjectSchema::new(),
            stop_timer,
        ),
        ToolDefinition::new(
            "freelo_create_work_report",
            "Log time spent on a task",
            ObjectSchema::new()
                .field(Field::positive_int("task_id", "Task ID").required())
                .field(Field::positive_int("minutes", "Minutes worked").required())
                .field(Field::string("note", "Description of the work"))
                .field(Field::date("date_reported", "Date of the work (ISO 8601 format)").required()),
            create_work_report,
        ),
        ToolDefinition::new(
            "freelo_list_work_reports",
            "List work reports with totals",
            ObjectSchema::new()
                .field(Field::int_list("project_ids", "Filter by project IDs"))
                .field(Field::int_list("user_ids", "Filter by user IDs"))
                .field(Field::int_list("task_ids", "Filter by task IDs"))
                .field(Field::string_list("task_labels", "Filter by task labels"))
                .field(Field::date_range(
                    "date_reported_range",
                    "Date range (YYYY-MM-DD..YYYY-MM-DD)",
                ))
                .field(Field::page()),
            list_work_reports,
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct CreateWorkReportInput {
    task_id: i64,
    #[serde(flatten)]
    params: CreateWorkReportParams,
}

#[derive(Debug, Deserialize)]
struct ListWorkReportsInput {
    page: u64,
    project_ids: Option<Vec<i64>>,
    user_ids: Option<Vec<i64>>,
    task_ids: Option<Vec<i64>>,
    task_labels: Option<Vec<String>>,
    date_reported_range: Option<String>,
}

/// Per-report hours plus the minute and hour totals of `reports`.
pub fn summarize_reports(reports: &[WorkReport]) -> Value {
    let total_minutes: i64 = reports.iter().map(|r| r.minutes).sum();
    json!({
        "work_reports": reports.iter().map(|r| json!({
            "id": r.id,
            "task_id": r.task_id,
            "user_id": r.user_id,
            "minutes": r.minutes,
            "hours": hours(r.minutes),
            "note": r.note,
            "date_reported": r.date_reported,
            "created_at": r.created_at,
        })).collect::<Vec<_>>(),
        "total_minutes": total_minutes,
        "total_hours": hours(total_minutes),
    })
}

fn start_timer(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let params: TimeTrackingStartParams = parse(input)?;
        client.start_time_tracking(&params).await?;
        let mut out = done(format!("Time tracking started for task {}", params.task_id));
        out["note"] = json!(params.note);
        Ok(out)
    }
    .boxed()
}

fn stop_timer(_input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        client.stop_time_tracking().await?;
        Ok(done("Time tracking stopped".to_string()))
    }
    .boxed()
}

fn create_work_report(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: CreateWorkReportInput = parse(input)?;
        let r = client.create_work_report(input.task_id, &input.params).await?;
        Ok(json!({
            "success": true,
            "work_report": {
                "id": r.id,
                "task_id": r.task_id.unwrap_or(input.task_id),
                "minutes": r.minutes,
                "hours": hours(r.minutes),
                "note": r.note,
                "date_reported": r.date_reported,
                "created_at": r.created_at,
            },
        }))
    }
    .boxed()
}

fn list_work_reports(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: ListWorkReportsInput = parse(input)?;
        let filter = WorkReportFilter {
            projects_ids: input.project_ids,
            users_ids: input.user_ids,
            tasks_ids: input.task_ids,
            tasks_labels: input.task_labels,
            date_reported_range: input.date_reported_range,
        };
        let page = client
            .get_work_reports(&filter, Some(input.page))
            .await?
            .normalize(input.page);
        let mut out = summarize_reports(&page.items);
        out["total"] = json!(page.total);
        out["count"] = json!(page.count);
        out["page"] = json!(page.page);
        out["per_page"] = json!(page.per_page);
        Ok(out)
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(id: i64, minutes: i64) -> WorkReport {
        WorkReport {
            id,
            minutes,
            ..Default::default()
        }
    }

    #[test]
    fn totals_add_up() {
        let v = summarize_reports(&[report(1, 30), report(2, 90)]);
        assert_eq!(v["total_minutes"], 120);
        assert_eq!(v["total_hours"], "2.00");
        assert_eq!(v["work_reports"][0]["hours"], "0.50");
        assert_eq!(v["work_reports"][1]["hours"], "1.50");
    }

    #[test]
    fn report_rows_keep_creation_time() {
        let r = WorkReport {
            created_at: Some("2025-03-01 08:15:00".to_string()),
            ..report(3, 45)
        };
        let v = summarize_reports(&[r]);
        assert_eq!(v["work_reports"][0]["created_at"], "2025-03-01 08:15:00");
    }

    #[test]
    fn empty_listing_is_zero() {
        let v = summarize_reports(&[]);
        assert_eq!(v["total_minutes"], 0);
        assert_eq!(v["total_hours"], "0.00");
        assert_eq!(v["work_reports"], json!([]));
    }
}
