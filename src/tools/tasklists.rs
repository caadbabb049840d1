use super::{parse, HandlerResult, ToolDefinition};
use crate::http::FreeloClient;
use crate::schema::{Field, ObjectSchema};
use crate::types::{Ordering, Tasklist, TasklistFilter};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};

pub(super) fn tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "freelo_list_tasklists",
            "List tasklists across projects",
            ObjectSchema::new()
                .field(Field::int_list("project_ids", "Filter by project IDs"))
                .field(Field::order_by())
                .field(Field::order())
                .field(Field::page()),
            list_tasklists,
        ),
        ToolDefinition::new(
            "freelo_get_tasklist",
            "Get detailed information about a specific tasklist",
            ObjectSchema::new()
                .field(Field::positive_int("tasklist_id", "Tasklist ID").required()),
            get_tasklist,
        ),
        ToolDefinition::new(
            "freelo_create_tasklist",
            "Create a new tasklist in a project",
            ObjectSchema::new()
                .field(Field::positive_int("project_id", "Project ID").required())
                .field(Field::non_empty("name", "Tasklist name").required()),
            create_tasklist,
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct ListTasklistsInput {
    page: u64,
    #[serde(flatten)]
    ordering: Ordering,
    project_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
struct TasklistIdInput {
    tasklist_id: i64,
}

#[derive(Debug, Deserialize)]
struct CreateTasklistInput {
    project_id: i64,
    name: String,
}

/// Missing counters count as zero.
fn counters(t: &Tasklist) -> (i64, i64) {
    (
        t.tasks_count.unwrap_or(0),
        t.finished_tasks_count.unwrap_or(0),
    )
}

fn unfinished(t: &Tasklist) -> i64 {
    let (total, finished) = counters(t);
    total.saturating_sub(finished)
}

fn tasklist_summary(t: &Tasklist) -> Value {
    let (total, finished) = counters(t);
    json!({
        "id": t.id,
        "name": t.name,
        "project_id": t.project_id,
        "tasks_count": total,
        "finished_tasks_count": finished,
    })
}

fn list_tasklists(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: ListTasklistsInput = parse(input)?;
        let filter = TasklistFilter {
            ordering: input.ordering,
            projects_ids: input.project_ids,
        };
        let page = client
            .get_tasklists(&filter, Some(input.page))
            .await?
            .normalize(input.page);
        Ok(json!({
            "total": page.total,
            "count": page.count,
            "page": page.page,
            "per_page": page.per_page,
            "tasklists": page.items.iter().map(tasklist_summary).collect::<Vec<_>>(),
        }))
    }
    .boxed()
}

fn get_tasklist(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: TasklistIdInput = parse(input)?;
        let t = client.get_tasklist(input.tasklist_id).await?;
        let (total, finished) = counters(&t);
        Ok(json!({
            "id": t.id,
            "name": t.name,
            "project_id": t.project_id,
            "position": t.position,
            "created_at": t.created_at,
            "updated_at": t.updated_at,
            "tasks_count": total,
            "finished_tasks_count": finished,
            "unfinished_tasks_count": unfinished(&t),
        }))
    }
    .boxed()
}

fn create_tasklist(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: CreateTasklistInput = parse(input)?;
        let t = client
            .create_tasklist(input.project_id, &input.name)
            .await?;
        Ok(json!({
            "success": true,
            "tasklist": {
                "id": t.id,
                "project_id": t.project_id,
                "name": t.name,
                "position": t.position,
            },
        }))
    }
    .boxed()
}
