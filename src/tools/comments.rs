use super::{parse, HandlerResult, ToolDefinition};
use crate::http::FreeloClient;
use crate::schema::{Field, ObjectSchema};
use crate::types::{Comment, CommentFilter, CreateCommentParams, ListingResponse, Ordering, User};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{json, Value};

pub(super) fn tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "freelo_add_comment",
            "Add a comment to a task",
            ObjectSchema::new()
                .field(Field::positive_int("task_id", "Task ID").required())
                .field(Field::non_empty("content", "Comment text").required())
                .field(Field::string_list(
                    "attachment_uuids",
                    "UUIDs of previously uploaded files to attach",
                )),
            add_comment,
        ),
        ToolDefinition::new(
            "freelo_list_comments",
            "List comments across projects",
            ObjectSchema::new()
                .field(Field::int_list("project_ids", "Filter by project IDs"))
                .field(Field::string("type", "Comment type filter"))
                .field(Field::order_by())
                .field(Field::order())
                .field(Field::page()),
            list_comments,
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct AddCommentInput {
    task_id: i64,
    content: String,
    attachment_uuids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ListCommentsInput {
    page: u64,
    #[serde(flatten)]
    ordering: Ordering,
    project_ids: Option<Vec<i64>>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn comment_summary(c: &Comment) -> Value {
    json!({
        "id": c.id,
        "task_id": c.task_id,
        "project_id": c.project_id,
        "content": c.content,
        "author": c.author.as_ref().map(User::display_name),
        "created_at": c.created_at,
        "attachments_count": c.attachments.as_ref().map_or(0, Vec::len),
    })
}

/// Created comment; `task_id` falls back to the task it was posted on.
fn created_comment(c: &Comment, task_id: i64) -> Value {
    json!({
        "id": c.id,
        "task_id": c.task_id.unwrap_or(task_id),
        "author": c.author.as_ref().map(User::display_name),
        "content": c.content,
        "created_at": c.created_at,
        "attachments": c.attachments.as_deref().unwrap_or_default().iter().map(|a| json!({
            "uuid": a.uuid,
            "name": a.name,
            "size": a.size,
            "mime_type": a.mime_type,
        })).collect::<Vec<_>>(),
    })
}

/// Pagination envelope plus comments, whichever shape the API answered with.
fn comments_page(listing: ListingResponse<Comment>, requested_page: u64) -> Value {
    let page = listing.normalize(requested_page);
    json!({
        "total": page.total,
        "count": page.count,
        "page": page.page,
        "per_page": page.per_page,
        "comments": page.items.iter().map(comment_summary).collect::<Vec<_>>(),
    })
}

fn add_comment(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: AddCommentInput = parse(input)?;
        let params = CreateCommentParams {
            content: input.content,
            attachments: input.attachment_uuids,
        };
        let comment = client.create_comment(input.task_id, &params).await?;
        Ok(json!({
            "success": true,
            "comment": created_comment(&comment, input.task_id),
        }))
    }
    .boxed()
}

fn list_comments(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: ListCommentsInput = parse(input)?;
        let filter = CommentFilter {
            ordering: input.ordering,
            projects_ids: input.project_ids,
            kind: input.kind,
        };
        let listing = client.get_all_comments(&filter, Some(input.page)).await?;
        Ok(comments_page(listing, input.page))
    }
    .boxed()
}
