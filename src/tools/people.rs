use super::{done, parse, HandlerResult, ToolDefinition};
use crate::http::FreeloClient;
use crate::schema::{Field, ObjectSchema};
use crate::types::{NotificationFilter, SearchFilters, SearchParams};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};

pub(super) fn tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "freelo_list_users",
            "List all users in the workspace",
            ObjectSchema::new(),
            list_users,
        ),
        ToolDefinition::new(
            "freelo_list_notifications",
            "List notifications for the current user",
            ObjectSchema::new()
                .field(Field::int_list("project_ids", "Filter by project IDs"))
                .field(Field::int_list("user_ids", "Filter by user IDs"))
                .field(Field::string_list("team_uuids", "Filter by team UUIDs"))
                .field(Field::string_list("notification_types", "Filter by notification types"))
                .field(Field::boolean("only_unread", "Only return unread notifications"))
                .field(Field::page()),
            list_notifications,
        ),
        ToolDefinition::new(
            "freelo_mark_notification_read",
            "Mark a notification as read",
            ObjectSchema::new()
                .field(Field::positive_int("notification_id", "Notification ID").required()),
            mark_notification_read,
        ),
        ToolDefinition::new(
            "freelo_search",
            "Full-text search across projects, tasks, comments and files",
            ObjectSchema::new()
                .field(Field::non_empty("query", "Search query").required())
                .field(Field::positive_int("size", "Maximum number of results"))
                .field(Field::integer("from", "Result offset"))
                .field(Field::int_list("project_ids", "Limit to project IDs"))
                .field(Field::int_list("user_ids", "Limit to user IDs"))
                .field(Field::string_list("types", "Entity types to search")),
            search,
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct NotificationsInput {
    page: u64,
    project_ids: Option<Vec<i64>>,
    user_ids: Option<Vec<i64>>,
    team_uuids: Option<Vec<String>>,
    notification_types: Option<Vec<String>>,
    only_unread: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct NotificationIdInput {
    notification_id: i64,
}

#[derive(Debug, Deserialize)]
struct SearchInput {
    query: String,
    size: Option<i64>,
    from: Option<i64>,
    project_ids: Option<Vec<i64>>,
    user_ids: Option<Vec<i64>>,
    types: Option<Vec<String>>,
}

impl From<SearchInput> for SearchParams {
    fn from(input: SearchInput) -> Self {
        SearchParams {
            query: input.query,
            size: input.size,
            from: input.from,
            filters: SearchFilters {
                projects_ids: input.project_ids,
                users_ids: input.user_ids,
                types: input.types,
            },
        }
    }
}

fn list_users(_input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let users = client.get_users().await?;
        Ok(json!({
            "count": users.len(),
            "users": users.iter().map(|u| json!({
                "id": u.id,
                "name": u.display_name(),
                "email": u.email,
                "avatar": u.avatar,
            })).collect::<Vec<_>>(),
        }))
    }
    .boxed()
}

fn list_notifications(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: NotificationsInput = parse(input)?;
        let filter = NotificationFilter {
            projects_ids: input.project_ids,
            users_ids: input.user_ids,
            teams_uuids: input.team_uuids,
            notification_types: input.notification_types,
            only_unread: input.only_unread,
        };
        let page = client
            .get_notifications(&filter, Some(input.page))
            .await?
            .normalize(input.page);
        Ok(json!({
            "total": page.total,
            "count": page.count,
            "page": page.page,
            "per_page": page.per_page,
            "notifications": page.items.iter().map(|n| json!({
                "id": n.id,
                "type": n.kind,
                "project_id": n.project_id,
                "task_id": n.task_id,
                "is_read": n.is_read,
                "created_at": n.created_at,
                "data": n.data,
            })).collect::<Vec<_>>(),
        }))
    }
    .boxed()
}

fn mark_notification_read(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: NotificationIdInput = parse(input)?;
        client
            .mark_notification_as_read(input.notification_id)
            .await?;
        Ok(done(format!(
            "Notification {} marked as read",
            input.notification_id
        )))
    }
    .boxed()
}

fn search(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: SearchInput = parse(input)?;
        Ok(client.search(&input.into()).await?)
    }
    .boxed()
}
