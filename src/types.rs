use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// Remote entity records. Fields the API may omit default so a sparse payload
// still deserializes.

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    /// `name`, else `firstname lastname`, else the email.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let full = [self.firstname.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        self.email.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Currency {
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub budget: Option<Currency>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "owner")]
    pub project_owner: Option<User>,
    #[serde(default)]
    pub workers: Option<Vec<User>>,
    #[serde(default)]
    pub tasklists: Option<Vec<Tasklist>>,
    #[serde(default)]
    pub state_id: Option<i64>,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub is_archived: bool,
}

impl Project {
    pub fn owner_name(&self) -> Option<String> {
        self.project_owner.as_ref().map(User::display_name)
    }

    pub fn currency_code(&self) -> Option<String> {
        self.currency.as_ref().map(|c| c.currency.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Tasklist {
    pub id: i64,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub tasks_count: Option<i64>,
    #[serde(default)]
    pub finished_tasks_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Label {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Subtask {
    pub id: i64,
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub is_finished: bool,
    #[serde(default)]
    pub worker: Option<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: i64,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub tasklist_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "date_add")]
    pub created_at: Option<String>,
    #[serde(default, alias = "date_edited_at")]
    pub updated_at: Option<String>,
    #[serde(default, alias = "date_finished")]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub due_date_end: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub worker: Option<User>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub labels: Option<Vec<Label>>,
    #[serde(default)]
    pub subtasks: Option<Vec<Subtask>>,
    #[serde(default)]
    pub comments_count: Option<i64>,
    #[serde(default)]
    pub attachments_count: Option<i64>,
    #[serde(default)]
    pub is_finished: bool,
    #[serde(default)]
    pub is_private: bool,
    /// Fields the API returns beyond the modelled ones (priority, cost, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const UNASSIGNED: &str = "Unassigned";

impl Task {
    pub fn worker_name(&self) -> String {
        self.worker
            .as_ref()
            .map(User::display_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNASSIGNED.to_string())
    }

    pub fn label_names(&self) -> Vec<String> {
        self.labels
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|l| l.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "date_add")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkReport {
    pub id: i64,
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub minutes: i64,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub date_reported: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub task_id: Option<i64>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub data: Value,
}

// Listings

/// Wire `data` of a paginated listing: a plain array, or an object keyed by
/// the resource name (`{"tasks": [...]}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PageItems<T> {
    Flat(Vec<T>),
    Keyed(BTreeMap<String, Vec<T>>),
}

impl<T> PageItems<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            PageItems::Flat(v) => v,
            PageItems::Keyed(map) => map.into_values().flatten().collect(),
        }
    }
}

fn page_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    PageItems::<T>::deserialize(deserializer).map(PageItems::into_vec)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResult<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub per_page: u64,
    #[serde(
        rename(serialize = "items", deserialize = "data"),
        deserialize_with = "page_items",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub items: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PaginatedResult<U> {
        PaginatedResult {
            total: self.total,
            count: self.count,
            page: self.page,
            per_page: self.per_page,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// A listing as the API returned it: with a pagination envelope or as a bare
/// array.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged, bound(deserialize = "T: Deserialize<'de>"))]
pub enum ListingResponse<T> {
    Paged(PaginatedResult<T>),
    Bare(Vec<T>),
}

impl<T> ListingResponse<T> {
    /// Collapse both shapes into one page. A bare array is treated as a single
    /// complete page at `requested_page`.
    pub fn normalize(self, requested_page: u64) -> PaginatedResult<T> {
        match self {
            ListingResponse::Paged(p) => p,
            ListingResponse::Bare(items) => {
                let len = items.len() as u64;
                PaginatedResult {
                    total: len,
                    count: len,
                    page: requested_page,
                    per_page: len,
                    items,
                }
            }
        }
    }
}

// Request parameters

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ordering {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateProjectParams {
    pub name: String,
    pub currency_iso: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_owner_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateTaskParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

/// Three states for a nullable update field: leave unchanged, clear, or set.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(v) => v.serialize(s),
            Patch::Keep | Patch::Clear => s.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        // only reached when the key is present; absent keys use Default (Keep)
        Option::<T>::deserialize(d).map(|v| v.map_or(Patch::Clear, Patch::Set))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateTaskParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub worker_id: Patch<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub due_date: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub due_date_end: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateCommentParams {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeTrackingStartParams {
    pub task_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateWorkReportParams {
    pub minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub date_reported: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.projects_ids.is_none() && self.users_ids.is_none() && self.types.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchParams {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    #[serde(skip_serializing_if = "SearchFilters::is_empty")]
    pub filters: SearchFilters,
}

// Listing filters; each maps onto query parameters in `resources`.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub ordering: Ordering,
    pub tags: Option<Vec<String>>,
    pub states_ids: Option<Vec<i64>>,
    pub users_ids: Option<Vec<i64>>,
    pub created_in_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub ordering: Ordering,
    pub search_query: Option<String>,
    pub state_id: Option<i64>,
    pub projects_ids: Option<Vec<i64>>,
    pub tasklists_ids: Option<Vec<i64>>,
    pub with_label: Option<String>,
    pub due_date_range: Option<String>,
    pub worker_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasklistFilter {
    pub ordering: Ordering,
    pub projects_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentFilter {
    pub ordering: Ordering,
    pub projects_ids: Option<Vec<i64>>,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkReportFilter {
    pub projects_ids: Option<Vec<i64>>,
    pub users_ids: Option<Vec<i64>>,
    pub tasks_ids: Option<Vec<i64>>,
    pub tasks_labels: Option<Vec<String>>,
    pub date_reported_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationFilter {
    pub projects_ids: Option<Vec<i64>>,
    pub users_ids: Option<Vec<i64>>,
    pub teams_uuids: Option<Vec<String>>,
    pub notification_types: Option<Vec<String>>,
    pub only_unread: Option<bool>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
