//! One method per Freelo REST operation. Each maps its parameters onto a
//! single [`FreeloClient`] call; nothing here retries, caches or walks pages.

use crate::error::ClientError;
use crate::http::{encode_path_segment, FreeloClient, Query};
use crate::types::*;
use reqwest::Method;
use serde_json::Value;

fn ordered(q: Query, o: &Ordering) -> Query {
    q.opt("order_by", o.order_by.as_deref())
        .opt("order", o.order.as_deref())
}

impl FreeloClient {
    // Projects

    pub async fn get_projects(&self, ordering: &Ordering) -> Result<Vec<Project>, ClientError> {
        let q = ordered(Query::new(), ordering);
        self.invoke(Method::GET, "/projects", &q, None).await
    }

    pub async fn get_all_projects(
        &self,
        filter: &ProjectFilter,
        page: Option<u64>,
    ) -> Result<ListingResponse<Project>, ClientError> {
        let q = ordered(Query::new(), &filter.ordering)
            .list("tags", filter.tags.as_deref())
            .list("states_ids", filter.states_ids.as_deref())
            .list("users_ids", filter.users_ids.as_deref())
            .opt("created_in_range", filter.created_in_range.as_deref())
            .opt("p", page);
        self.invoke(Method::GET, "/all-projects", &q, None).await
    }

    pub async fn get_project(&self, project_id: i64) -> Result<Project, ClientError> {
        let path = format!("/project/{}", project_id);
        self.invoke(Method::GET, &path, &Query::new(), None).await
    }

    pub async fn create_project(&self, params: &CreateProjectParams) -> Result<Project, ClientError> {
        let body = Self::to_body(params)?;
        self.invoke(Method::POST, "/projects", &Query::new(), Some(&body))
            .await
    }

    pub async fn archive_project(&self, project_id: i64) -> Result<(), ClientError> {
        let path = format!("/project/{}/archive", project_id);
        self.invoke_unit(Method::POST, &path, None).await
    }

    pub async fn activate_project(&self, project_id: i64) -> Result<(), ClientError> {
        let path = format!("/project/{}/activate", project_id);
        self.invoke_unit(Method::POST, &path, None).await
    }

    pub async fn delete_project(&self, project_id: i64) -> Result<(), ClientError> {
        let path = format!("/project/{}", project_id);
        self.invoke_unit(Method::DELETE, &path, None).await
    }

    // Tasks

    pub async fn get_tasks(
        &self,
        project_id: i64,
        tasklist_id: i64,
        ordering: &Ordering,
    ) -> Result<Vec<Task>, ClientError> {
        let path = format!("/project/{}/tasklist/{}/tasks", project_id, tasklist_id);
        let q = ordered(Query::new(), ordering);
        self.invoke(Method::GET, &path, &q, None).await
    }

    pub async fn get_all_tasks(
        &self,
        filter: &TaskFilter,
        page: Option<u64>,
    ) -> Result<ListingResponse<Task>, ClientError> {
        let q = ordered(Query::new(), &filter.ordering)
            .opt("search_query", filter.search_query.as_deref())
            .opt("state_id", filter.state_id)
            .list("projects_ids", filter.projects_ids.as_deref())
            .list("tasklists_ids", filter.tasklists_ids.as_deref())
            .opt("with_label", filter.with_label.as_deref())
            .opt("due_date_range", filter.due_date_range.as_deref())
            .opt("worker_id", filter.worker_id)
            .opt("p", page);
        self.invoke(Method::GET, "/all-tasks", &q, None).await
    }

    pub async fn get_task(&self, task_id: i64) -> Result<Task, ClientError> {
        let path = format!("/task/{}", task_id);
        self.invoke(Method::GET, &path, &Query::new(), None).await
    }

    pub async fn create_task(
        &self,
        project_id: i64,
        tasklist_id: i64,
        params: &CreateTaskParams,
    ) -> Result<Task, ClientError> {
        let path = format!("/project/{}/tasklist/{}/tasks", project_id, tasklist_id);
        let body = Self::to_body(params)?;
        self.invoke(Method::POST, &path, &Query::new(), Some(&body))
            .await
    }

    pub async fn update_task(
        &self,
        task_id: i64,
        params: &UpdateTaskParams,
    ) -> Result<Task, ClientError> {
        let path = format!("/task/{}", task_id);
        let body = Self::to_body(params)?;
        self.invoke(Method::POST, &path, &Query::new(), Some(&body))
            .await
    }

    pub async fn finish_task(&self, task_id: i64) -> Result<(), ClientError> {
        let path = format!("/task/{}/finish", task_id);
        self.invoke_unit(Method::POST, &path, None).await
    }

    pub async fn activate_task(&self, task_id: i64) -> Result<(), ClientError> {
        let path = format!("/task/{}/activate", task_id);
        self.invoke_unit(Method::POST, &path, None).await
    }

    pub async fn move_task(&self, task_id: i64, tasklist_id: i64) -> Result<(), ClientError> {
        let path = format!("/task/{}/move/{}", task_id, tasklist_id);
        self.invoke_unit(Method::POST, &path, None).await
    }

    pub async fn delete_task(&self, task_id: i64) -> Result<(), ClientError> {
        let path = format!("/task/{}", task_id);
        self.invoke_unit(Method::DELETE, &path, None).await
    }

    // Tasklists

    pub async fn get_tasklists(
        &self,
        filter: &TasklistFilter,
        page: Option<u64>,
    ) -> Result<ListingResponse<Tasklist>, ClientError> {
        let q = ordered(Query::new(), &filter.ordering)
            .list("projects_ids", filter.projects_ids.as_deref())
            .opt("p", page);
        self.invoke(Method::GET, "/all-tasklists", &q, None).await
    }

    pub async fn get_tasklist(&self, tasklist_id: i64) -> Result<Tasklist, ClientError> {
        let path = format!("/tasklist/{}", tasklist_id);
        self.invoke(Method::GET, &path, &Query::new(), None).await
    }

    pub async fn create_tasklist(&self, project_id: i64, name: &str) -> Result<Tasklist, ClientError> {
        let path = format!("/project/{}/tasklists", project_id);
        let body = serde_json::json!({ "name": name });
        self.invoke(Method::POST, &path, &Query::new(), Some(&body))
            .await
    }

    // Comments

    pub async fn create_comment(
        &self,
        task_id: i64,
        params: &CreateCommentParams,
    ) -> Result<Comment, ClientError> {
        let path = format!("/task/{}/comments", task_id);
        let body = Self::to_body(params)?;
        self.invoke(Method::POST, &path, &Query::new(), Some(&body))
            .await
    }

    pub async fn get_all_comments(
        &self,
        filter: &CommentFilter,
        page: Option<u64>,
    ) -> Result<ListingResponse<Comment>, ClientError> {
        let q = ordered(Query::new(), &filter.ordering)
            .list("projects_ids", filter.projects_ids.as_deref())
            .opt("type", filter.kind.as_deref())
            .opt("p", page);
        self.invoke(Method::GET, "/all-comments", &q, None).await
    }

    // Time tracking and work reports

    pub async fn start_time_tracking(
        &self,
        params: &TimeTrackingStartParams,
    ) -> Result<(), ClientError> {
        let body = Self::to_body(params)?;
        self.invoke_unit(Method::POST, "/timetracking/start", Some(&body))
            .await
    }

    pub async fn stop_time_tracking(&self) -> Result<(), ClientError> {
        self.invoke_unit(Method::POST, "/timetracking/stop", None)
            .await
    }

    pub async fn create_work_report(
        &self,
        task_id: i64,
        params: &CreateWorkReportParams,
    ) -> Result<WorkReport, ClientError> {
        let path = format!("/task/{}/work-reports", task_id);
        let body = Self::to_body(params)?;
        self.invoke(Method::POST, &path, &Query::new(), Some(&body))
            .await
    }

    pub async fn get_work_reports(
        &self,
        filter: &WorkReportFilter,
        page: Option<u64>,
    ) -> Result<ListingResponse<WorkReport>, ClientError> {
        let q = Query::new()
            .list("projects_ids", filter.projects_ids.as_deref())
            .list("users_ids", filter.users_ids.as_deref())
            .list("tasks_ids", filter.tasks_ids.as_deref())
            .list("tasks_labels", filter.tasks_labels.as_deref())
            .opt("date_reported_range", filter.date_reported_range.as_deref())
            .opt("p", page);
        self.invoke(Method::GET, "/work-reports", &q, None).await
    }

    // Users, notifications, search

    pub async fn get_users(&self) -> Result<Vec<User>, ClientError> {
        self.invoke(Method::GET, "/users", &Query::new(), None).await
    }

    pub async fn get_notifications(
        &self,
        filter: &NotificationFilter,
        page: Option<u64>,
    ) -> Result<ListingResponse<Notification>, ClientError> {
        let q = Query::new()
            .list("projects_ids", filter.projects_ids.as_deref())
            .list("users_ids", filter.users_ids.as_deref())
            .list("teams_uuids", filter.teams_uuids.as_deref())
            .list("notification_types", filter.notification_types.as_deref())
            .opt("only_unread", filter.only_unread)
            .opt("p", page);
        self.invoke(Method::GET, "/all-notifications", &q, None)
            .await
    }

    pub async fn mark_notification_as_read(&self, notification_id: i64) -> Result<(), ClientError> {
        let path = format!("/notification/{}/mark-as-read", notification_id);
        self.invoke_unit(Method::POST, &path, None).await
    }

    pub async fn search(&self, params: &SearchParams) -> Result<Value, ClientError> {
        let body = Self::to_body(params)?;
        self.invoke(Method::POST, "/search", &Query::new(), Some(&body))
            .await
    }

    // Files

    pub async fn upload_file(&self, bytes: Vec<u8>, filename: &str) -> Result<Attachment, ClientError> {
        self.upload("/file/upload", bytes, filename).await
    }

    pub async fn download_file(&self, file_uuid: &str) -> Result<Vec<u8>, ClientError> {
        let path = format!("/file/{}", encode_path_segment(file_uuid));
        self.download(&path).await
    }
}
