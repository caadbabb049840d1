use super::{done, not_confirmed, parse, HandlerResult, ToolDefinition};
use crate::format::parse_currency;
use crate::http::FreeloClient;
use crate::schema::{Field, ObjectSchema};
use crate::types::{CreateProjectParams, Currency, Ordering, Project, ProjectFilter};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};

pub(super) fn tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "freelo_list_projects",
            "List active projects in Freelo",
            ObjectSchema::new()
                .field(Field::order_by())
                .field(Field::order()),
            list_projects,
        ),
        ToolDefinition::new(
            "freelo_get_all_projects",
            "Get all projects (active, archived, templates) with pagination",
            ObjectSchema::new()
                .field(Field::page())
                .field(Field::order_by())
                .field(Field::order())
                .field(Field::string_list("tags", "Filter by tags"))
                .field(Field::int_list("states_ids", "Filter by state IDs"))
                .field(Field::int_list("users_ids", "Filter by user IDs"))
                .field(Field::date_range(
                    "created_in_range",
                    "Date range in format: YYYY-MM-DD..YYYY-MM-DD",
                )),
            get_all_projects,
        ),
        ToolDefinition::new(
            "freelo_get_project",
            "Get detailed information about a specific project",
            ObjectSchema::new().field(Field::positive_int("project_id", "Project ID").required()),
            get_project,
        ),
        ToolDefinition::new(
            "freelo_create_project",
            "Create a new project in Freelo",
            ObjectSchema::new()
                .field(Field::non_empty("name", "Project name").required())
                .field(Field::currency("currency", "Project currency (CZK, EUR, or USD)").required())
                .field(Field::positive_int(
                    "owner_id",
                    "Project owner user ID (defaults to current user)",
                )),
            create_project,
        ),
        ToolDefinition::new(
            "freelo_archive_project",
            "Archive an active project",
            ObjectSchema::new()
                .field(Field::positive_int("project_id", "Project ID to archive").required()),
            archive_project,
        ),
        ToolDefinition::new(
            "freelo_activate_project",
            "Activate an archived project",
            ObjectSchema::new()
                .field(Field::positive_int("project_id", "Project ID to activate").required()),
            activate_project,
        ),
        ToolDefinition::new(
            "freelo_delete_project",
            "Permanently delete a project (use with caution)",
            ObjectSchema::new()
                .field(Field::positive_int("project_id", "Project ID to delete").required())
                .field(Field::boolean("confirm", "Confirm deletion (must be true)")),
            delete_project,
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct AllProjectsInput {
    page: u64,
    #[serde(flatten)]
    ordering: Ordering,
    tags: Option<Vec<String>>,
    states_ids: Option<Vec<i64>>,
    users_ids: Option<Vec<i64>>,
    created_in_range: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectIdInput {
    project_id: i64,
}

#[derive(Debug, Deserialize)]
struct CreateProjectInput {
    name: String,
    currency: String,
    owner_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DeleteProjectInput {
    project_id: i64,
    #[serde(default)]
    confirm: bool,
}

/// Decoded amount next to the raw wire value.
fn money(c: &Currency) -> Value {
    json!({
        "amount": c.amount,
        "currency": c.currency,
        "value": parse_currency(&c.amount).ok(),
    })
}

fn list_projects(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let ordering: Ordering = parse(input)?;
        let projects = client.get_projects(&ordering).await?;
        Ok(json!({
            "count": projects.len(),
            "projects": projects.iter().map(|p| json!({
                "id": p.id,
                "name": p.name,
                "owner": p.owner_name(),
                "currency": p.currency_code(),
                "workers_count": p.workers.as_ref().map_or(0, Vec::len),
                "tasklists_count": p.tasklists.as_ref().map_or(0, Vec::len),
                "is_archived": p.is_archived,
                "is_template": p.is_template,
            })).collect::<Vec<_>>(),
        }))
    }
    .boxed()
}

fn get_all_projects(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: AllProjectsInput = parse(input)?;
        let filter = ProjectFilter {
            ordering: input.ordering,
            tags: input.tags,
            states_ids: input.states_ids,
            users_ids: input.users_ids,
            created_in_range: input.created_in_range,
        };
        let page = client
            .get_all_projects(&filter, Some(input.page))
            .await?
            .normalize(input.page);
        Ok(json!({
            "total": page.total,
            "count": page.count,
            "page": page.page,
            "per_page": page.per_page,
            "projects": page.items.iter().map(|p| json!({
                "id": p.id,
                "name": p.name,
                "owner": p.owner_name(),
                "currency": p.currency_code(),
                "state_id": p.state_id,
                "is_archived": p.is_archived,
                "is_template": p.is_template,
                "created_at": p.created_at,
            })).collect::<Vec<_>>(),
        }))
    }
    .boxed()
}

fn project_detail(project: &Project) -> Value {
    json!({
        "id": project.id,
        "name": project.name,
        "created_at": project.created_at,
        "updated_at": project.updated_at,
        "owner": project.project_owner.as_ref().map(|o| json!({
            "id": o.id,
            "name": o.display_name(),
            "email": o.email,
        })),
        "currency": project.currency.as_ref().map(money),
        "budget": project.budget.as_ref().map(money),
        "budget_amount": project
            .budget
            .as_ref()
            .and_then(|b| parse_currency(&b.amount).ok()),
        "color": project.color,
        "workers": project.workers.as_ref().map(|ws| ws.iter().map(|w| json!({
            "id": w.id,
            "name": w.display_name(),
            "email": w.email,
        })).collect::<Vec<_>>()),
        "tasklists": project.tasklists.as_ref().map(|ts| ts.iter().map(|t| json!({
            "id": t.id,
            "name": t.name,
            "tasks_count": t.tasks_count,
            "finished_tasks_count": t.finished_tasks_count,
        })).collect::<Vec<_>>()),
        "state_id": project.state_id,
        "is_archived": project.is_archived,
        "is_template": project.is_template,
    })
}

fn get_project(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: ProjectIdInput = parse(input)?;
        let project = client.get_project(input.project_id).await?;
        Ok(project_detail(&project))
    }
    .boxed()
}

fn create_project(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: CreateProjectInput = parse(input)?;
        let project = client
            .create_project(&CreateProjectParams {
                name: input.name,
                currency_iso: input.currency,
                project_owner_id: input.owner_id,
            })
            .await?;
        Ok(json!({
            "success": true,
            "project": {
                "id": project.id,
                "name": project.name,
                "currency": project.currency_code(),
                "owner": project.owner_name(),
            },
        }))
    }
    .boxed()
}

fn archive_project(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: ProjectIdInput = parse(input)?;
        client.archive_project(input.project_id).await?;
        Ok(done(format!("Project {} has been archived", input.project_id)))
    }
    .boxed()
}

fn activate_project(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: ProjectIdInput = parse(input)?;
        client.activate_project(input.project_id).await?;
        Ok(done(format!("Project {} has been activated", input.project_id)))
    }
    .boxed()
}

fn delete_project(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: DeleteProjectInput = parse(input)?;
        if !input.confirm {
            return Ok(not_confirmed());
        }
        client.delete_project(input.project_id).await?;
        Ok(done(format!(
            "Project {} has been permanently deleted",
            input.project_id
        )))
    }
    .boxed()
}
