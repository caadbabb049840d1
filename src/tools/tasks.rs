use super::{done, not_confirmed, parse, HandlerResult, ToolDefinition};
use crate::http::FreeloClient;
use crate::schema::{Field, ObjectSchema};
use crate::types::{CreateTaskParams, Ordering, Task, TaskFilter, UpdateTaskParams, User};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};

pub(super) fn tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "freelo_list_tasks",
            "List tasks in a specific tasklist",
            ObjectSchema::new()
                .field(Field::positive_int("project_id", "Project ID").required())
                .field(Field::positive_int("tasklist_id", "Tasklist ID").required())
                .field(Field::order_by())
                .field(Field::order()),
            list_tasks,
        ),
        ToolDefinition::new(
            "freelo_get_all_tasks",
            "Search and list tasks across all projects with filters",
            ObjectSchema::new()
                .field(Field::string("search_query", "Search query"))
                .field(Field::integer("state_id", "State ID (1=active, 2=finished)"))
                .field(Field::int_list("project_ids", "Filter by project IDs"))
                .field(Field::int_list("tasklist_ids", "Filter by tasklist IDs"))
                .field(Field::integer("worker_id", "Filter by assigned worker ID"))
                .field(Field::string("with_label", "Filter by label name"))
                .field(Field::date_range(
                    "due_date_range",
                    "Due date range (YYYY-MM-DD..YYYY-MM-DD)",
                ))
                .field(Field::order_by())
                .field(Field::order())
                .field(Field::page()),
            get_all_tasks,
        ),
        ToolDefinition::new(
            "freelo_get_task",
            "Get detailed information about a specific task",
            ObjectSchema::new().field(Field::positive_int("task_id", "Task ID").required()),
            get_task,
        ),
        ToolDefinition::new(
            "freelo_create_task",
            "Create a new task in a tasklist",
            ObjectSchema::new()
                .field(Field::positive_int("project_id", "Project ID").required())
                .field(Field::positive_int("tasklist_id", "Tasklist ID").required())
                .field(Field::non_empty("name", "Task name").required())
                .field(Field::string("content", "Task description"))
                .field(Field::positive_int("worker_id", "Assigned worker ID"))
                .field(Field::date("due_date", "Due date (ISO 8601 format)"))
                .field(Field::date("due_date_end", "Due date end (ISO 8601 format)"))
                .field(Field::int_list("labels", "Label IDs to assign"))
                .field(Field::string_list("subtasks", "Subtask names"))
                .field(Field::boolean("is_private", "Make task private")),
            create_task,
        ),
        ToolDefinition::new(
            "freelo_update_task",
            "Update an existing task",
            ObjectSchema::new()
                .field(Field::positive_int("task_id", "Task ID").required())
                .field(Field::string("name", "New task name"))
                .field(Field::string("content", "New task description"))
                .field(
                    Field::positive_int("worker_id", "New worker ID (null to unassign)").nullable(),
                )
                .field(Field::date("due_date", "New due date (null to remove)").nullable())
                .field(
                    Field::date("due_date_end", "New due date end (null to remove)").nullable(),
                )
                .field(Field::int_list("labels", "New label IDs (replaces existing)"))
                .field(Field::boolean("is_private", "Update private status")),
            update_task,
        ),
        ToolDefinition::new(
            "freelo_finish_task",
            "Mark a task as finished",
            ObjectSchema::new().field(Field::positive_int("task_id", "Task ID to finish").required()),
            finish_task,
        ),
        ToolDefinition::new(
            "freelo_activate_task",
            "Reactivate a finished task",
            ObjectSchema::new()
                .field(Field::positive_int("task_id", "Task ID to activate").required()),
            activate_task,
        ),
        ToolDefinition::new(
            "freelo_move_task",
            "Move a task to a different tasklist",
            ObjectSchema::new()
                .field(Field::positive_int("task_id", "Task ID to move").required())
                .field(Field::positive_int("tasklist_id", "Target tasklist ID").required()),
            move_task,
        ),
        ToolDefinition::new(
            "freelo_delete_task",
            "Delete a task permanently",
            ObjectSchema::new()
                .field(Field::positive_int("task_id", "Task ID to delete").required())
                .field(Field::boolean("confirm", "Confirm deletion (must be true)")),
            delete_task,
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct ListTasksInput {
    project_id: i64,
    tasklist_id: i64,
    #[serde(flatten)]
    ordering: Ordering,
}

#[derive(Debug, Deserialize)]
struct AllTasksInput {
    page: u64,
    #[serde(flatten)]
    ordering: Ordering,
    search_query: Option<String>,
    state_id: Option<i64>,
    project_ids: Option<Vec<i64>>,
    tasklist_ids: Option<Vec<i64>>,
    worker_id: Option<i64>,
    with_label: Option<String>,
    due_date_range: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskIdInput {
    task_id: i64,
}

#[derive(Debug, Deserialize)]
struct CreateTaskInput {
    project_id: i64,
    tasklist_id: i64,
    #[serde(flatten)]
    params: CreateTaskParams,
}

#[derive(Debug, Deserialize)]
struct UpdateTaskInput {
    task_id: i64,
    #[serde(flatten)]
    params: UpdateTaskParams,
}

#[derive(Debug, Deserialize)]
struct MoveTaskInput {
    task_id: i64,
    tasklist_id: i64,
}

#[derive(Debug, Deserialize)]
struct DeleteTaskInput {
    task_id: i64,
    #[serde(default)]
    confirm: bool,
}

fn person(u: &User) -> Value {
    json!({ "id": u.id, "name": u.display_name(), "email": u.email })
}

fn list_tasks(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: ListTasksInput = parse(input)?;
        let tasks = client
            .get_tasks(input.project_id, input.tasklist_id, &input.ordering)
            .await?;
        Ok(json!({
            "count": tasks.len(),
            "tasks": tasks.iter().map(|t| json!({
                "id": t.id,
                "name": t.name,
                "worker": t.worker_name(),
                "due_date": t.due_date,
                "is_finished": t.is_finished,
                "labels": t.label_names(),
                "comments_count": t.comments_count.unwrap_or(0),
                "attachments_count": t.attachments_count.unwrap_or(0),
            })).collect::<Vec<_>>(),
        }))
    }
    .boxed()
}

fn get_all_tasks(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: AllTasksInput = parse(input)?;
        let filter = TaskFilter {
            ordering: input.ordering,
            search_query: input.search_query,
            state_id: input.state_id,
            projects_ids: input.project_ids,
            tasklists_ids: input.tasklist_ids,
            with_label: input.with_label,
            due_date_range: input.due_date_range,
            worker_id: input.worker_id,
        };
        let page = client
            .get_all_tasks(&filter, Some(input.page))
            .await?
            .normalize(input.page);
        Ok(json!({
            "total": page.total,
            "count": page.count,
            "page": page.page,
            "per_page": page.per_page,
            "tasks": page.items.iter().map(|t| json!({
                "id": t.id,
                "name": t.name,
                "project_id": t.project_id,
                "tasklist_id": t.tasklist_id,
                "worker": t.worker_name(),
                "author": t.author.as_ref().map(User::display_name),
                "due_date": t.due_date,
                "is_finished": t.is_finished,
                "finished_at": t.finished_at,
                "labels": t.label_names(),
            })).collect::<Vec<_>>(),
        }))
    }
    .boxed()
}

/// Task fields copied verbatim from the API's extra payload.
const PASSTHROUGH_FIELDS: &[&str] = &[
    "state",
    "cost",
    "minutes",
    "total_time_estimate",
    "count_subtasks",
    "custom_fields",
    "project",
    "tasklist",
];

fn task_detail(task: &Task) -> Value {
    let extra = |key: &str| task.extra.get(key).cloned().unwrap_or(Value::Null);
    let mut detail = json!({
        "id": task.id,
        "name": task.name,
        "content": task.content,
        "project_id": task.project_id,
        "tasklist_id": task.tasklist_id,
        "created_at": task.created_at,
        "updated_at": task.updated_at,
        "finished_at": task.finished_at,
        "due_date": task.due_date,
        "due_date_end": task.due_date_end,
        "worker": task.worker.as_ref().map(person),
        "author": task.author.as_ref().map(person),
        "labels": task.labels.as_deref().unwrap_or_default().iter().map(|l| json!({
            "id": l.id,
            "name": l.name,
            "color": l.color,
        })).collect::<Vec<_>>(),
        "subtasks": task.subtasks.as_deref().unwrap_or_default().iter().map(|s| json!({
            "id": s.id,
            "name": s.name,
            "is_finished": s.is_finished,
            "worker": s.worker.as_ref().map(User::display_name),
        })).collect::<Vec<_>>(),
        "comments": task.extra.get("comments").cloned().unwrap_or_else(|| json!([])),
        "priority": extra("priority_enum"),
        "is_finished": task.is_finished,
        "is_private": task.is_private,
        "comments_count": task.comments_count.unwrap_or(0),
        "attachments_count": task.attachments_count.unwrap_or(0),
    });
    for &key in PASSTHROUGH_FIELDS {
        detail[key] = extra(key);
    }
    detail
}

fn get_task(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: TaskIdInput = parse(input)?;
        let task = client.get_task(input.task_id).await?;
        Ok(task_detail(&task))
    }
    .boxed()
}

fn create_task(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: CreateTaskInput = parse(input)?;
        let task = client
            .create_task(input.project_id, input.tasklist_id, &input.params)
            .await?;
        Ok(json!({
            "success": true,
            "task": {
                "id": task.id,
                "name": task.name,
                "worker": task.worker_name(),
                "due_date": task.due_date,
                "labels": task.label_names(),
            },
        }))
    }
    .boxed()
}

fn update_task(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: UpdateTaskInput = parse(input)?;
        let task = client.update_task(input.task_id, &input.params).await?;
        Ok(json!({
            "success": true,
            "task": {
                "id": task.id,
                "name": task.name,
                "worker": task.worker_name(),
                "due_date": task.due_date,
                "is_private": task.is_private,
            },
        }))
    }
    .boxed()
}

fn finish_task(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: TaskIdInput = parse(input)?;
        client.finish_task(input.task_id).await?;
        Ok(done(format!("Task {} has been marked as finished", input.task_id)))
    }
    .boxed()
}

fn activate_task(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: TaskIdInput = parse(input)?;
        client.activate_task(input.task_id).await?;
        Ok(done(format!("Task {} has been reactivated", input.task_id)))
    }
    .boxed()
}

fn move_task(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: MoveTaskInput = parse(input)?;
        client.move_task(input.task_id, input.tasklist_id).await?;
        Ok(done(format!(
            "Task {} has been moved to tasklist {}",
            input.task_id, input.tasklist_id
        )))
    }
    .boxed()
}

fn delete_task(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: DeleteTaskInput = parse(input)?;
        if !input.confirm {
            return Ok(not_confirmed());
        }
        client.delete_task(input.task_id).await?;
        Ok(done(format!(
            "Task {} has been permanently deleted",
            input.task_id
        )))
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_surfaces_extra_fields_and_defaults() {
        let task: Task = serde_json::from_value(json!({
            "id": 12,
            "name": "Ship it",
            "date_add": "2025-01-02T10:00:00+01:00",
            "priority_enum": "high",
            "comments": [{"id": 1, "content": "hi"}],
            "author": {"id": 2, "name": "Jana"},
            "labels": [{"id": 1, "name": "bug", "color": "#f00"}]
        }))
        .unwrap();
        let v = task_detail(&task);
        assert_eq!(v["created_at"], "2025-01-02T10:00:00+01:00");
        assert_eq!(v["priority"], "high");
        assert_eq!(v["comments"][0]["content"], "hi");
        assert!(v["worker"].is_null());
        assert_eq!(v["author"]["name"], "Jana");
        assert_eq!(v["labels"][0]["color"], "#f00");
        assert_eq!(v["subtasks"], json!([]));
        assert_eq!(v["comments_count"], 0);
    }
}
