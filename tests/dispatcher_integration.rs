use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use freelo_mcp::{Config, Dispatcher, ToolError};
use httpmock::Method::{DELETE, GET, POST};
use httpmock::MockServer;
use serde_json::json;

fn config(base: &str) -> Config {
    Config::from_lookup(|key| match key {
        "FREELO_EMAIL" => Some("dev@example.com".to_string()),
        "FREELO_API_KEY" => Some("secret".to_string()),
        "FREELO_API_URL" => Some(base.to_string()),
        _ => None,
    })
    .unwrap()
}

fn dispatcher(server: &MockServer) -> Dispatcher {
    Dispatcher::from_config(Ok::<_, String>(config(&server.base_url())))
}

#[tokio::test]
async fn invalid_params_never_reach_the_api() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(200).json_body(json!({}));
        })
        .await;
    let d = dispatcher(&server);

    let err = d
        .call_tool("freelo_get_task", json!({"task_id": 0}))
        .await
        .unwrap_err();
    match err {
        ToolError::InvalidParams(errors) => {
            assert_eq!(errors, vec!["task_id: Number must be greater than 0".to_string()])
        }
        other => panic!("unexpected {:?}", other),
    }
    let err = d
        .call_tool("freelo_create_work_report", json!({"task_id": 1, "minutes": 30}))
        .await
        .unwrap_err();
    assert_eq!(err.rpc_code(), -32602);
    assert_eq!(any.hits_async().await, 0);
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let server = MockServer::start_async().await;
    let del = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/task/42");
            then.status(200).json_body(json!({"result": "success"}));
        })
        .await;
    let d = dispatcher(&server);

    let v = d
        .call_tool("freelo_delete_task", json!({"task_id": 42}))
        .await
        .unwrap();
    assert_eq!(v["success"], false);
    assert_eq!(
        v["error"],
        "Deletion not confirmed. Set confirm to true to delete."
    );
    assert_eq!(del.hits_async().await, 0);

    let v = d
        .call_tool("freelo_delete_task", json!({"task_id": 42, "confirm": true}))
        .await
        .unwrap();
    assert_eq!(v["success"], true);
    del.assert_hits_async(1).await;
}

#[tokio::test]
async fn project_delete_requires_confirmation() {
    let server = MockServer::start_async().await;
    let del = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/project/8");
            then.status(200).json_body(json!({"result": "success"}));
        })
        .await;
    let d = dispatcher(&server);

    for args in [json!({"project_id": 8}), json!({"project_id": 8, "confirm": false})] {
        let v = d.call_tool("freelo_delete_project", args).await.unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(
            v["error"],
            "Deletion not confirmed. Set confirm to true to delete."
        );
    }
    assert_eq!(del.hits_async().await, 0);

    let v = d
        .call_tool("freelo_delete_project", json!({"project_id": 8, "confirm": true}))
        .await
        .unwrap();
    assert_eq!(v["success"], true);
    assert_eq!(v["message"], "Project 8 has been permanently deleted");
    del.assert_hits_async(1).await;
}

#[tokio::test]
async fn requests_use_basic_auth_and_user_agent() {
    let server = MockServer::start_async().await;
    let auth = format!("Basic {}", STANDARD.encode("dev@example.com:secret"));
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users")
                .header("authorization", auth.as_str())
                .header("user-agent", "FreeloMCP/1.0 (dev@example.com)");
            then.status(200)
                .json_body(json!([{"id": 1, "firstname": "Jana", "lastname": "Nova", "email": "j@x.cz"}]));
        })
        .await;
    let v = dispatcher(&server)
        .call_tool("freelo_list_users", json!({}))
        .await
        .unwrap();
    m.assert_async().await;
    assert_eq!(v["count"], 1);
    assert_eq!(v["users"][0]["name"], "Jana Nova");
}

#[tokio::test]
async fn listing_filters_become_query_parameters() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/all-tasks")
                .query_param_exists("projects_ids[]")
                .query_param("order", "desc")
                .query_param("p", "2");
            then.status(200).json_body(json!({
                "total": 51, "count": 1, "page": 2, "per_page": 25,
                "data": {"tasks": [{"id": 7, "name": "Write docs", "worker": null}]}
            }));
        })
        .await;
    let v = dispatcher(&server)
        .call_tool(
            "freelo_get_all_tasks",
            json!({"project_ids": [1, 2], "order": "desc", "page": 2}),
        )
        .await
        .unwrap();
    m.assert_async().await;
    assert_eq!(v["total"], 51);
    assert_eq!(v["page"], 2);
    assert_eq!(v["tasks"][0]["worker"], "Unassigned");
}

#[tokio::test]
async fn bare_comment_array_is_one_page() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/all-comments");
            then.status(200).json_body(json!([
                {"id": 1, "content": "a"},
                {"id": 2, "content": "b"},
                {"id": 3, "content": "c"}
            ]));
        })
        .await;
    let v = dispatcher(&server)
        .call_tool("freelo_list_comments", json!({}))
        .await
        .unwrap();
    assert_eq!(v["total"], 3);
    assert_eq!(v["count"], 3);
    assert_eq!(v["per_page"], 3);
    assert_eq!(v["page"], 0);
}

#[tokio::test]
async fn work_report_totals() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/work-reports");
            then.status(200).json_body(json!({
                "total": 2, "count": 2, "page": 0, "per_page": 25,
                "data": {"work_reports": [
                    {"id": 1, "minutes": 30, "date_reported": "2025-03-01"},
                    {"id": 2, "minutes": 90, "date_reported": "2025-03-02"}
                ]}
            }));
        })
        .await;
    let v = dispatcher(&server)
        .call_tool("freelo_list_work_reports", json!({}))
        .await
        .unwrap();
    assert_eq!(v["total_minutes"], 120);
    assert_eq!(v["total_hours"], "2.00");
    assert_eq!(v["work_reports"][1]["hours"], "1.50");
}

#[tokio::test]
async fn update_sends_null_to_clear_fields() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/task/9")
                .json_body(json!({"worker_id": null, "name": "Renamed"}));
            then.status(200).json_body(json!({"id": 9, "name": "Renamed"}));
        })
        .await;
    let v = dispatcher(&server)
        .call_tool(
            "freelo_update_task",
            json!({"task_id": 9, "worker_id": null, "name": "Renamed"}),
        )
        .await
        .unwrap();
    m.assert_async().await;
    assert_eq!(v["task"]["worker"], "Unassigned");
}

#[tokio::test]
async fn api_errors_become_execution_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/task/404");
            then.status(404).json_body(json!({"errors": ["Task not found"]}));
        })
        .await;
    let err = dispatcher(&server)
        .call_tool("freelo_get_task", json!({"task_id": 404}))
        .await
        .unwrap_err();
    match err {
        ToolError::Execution {
            message,
            status_code,
        } => {
            assert_eq!(message, "Not Found: Task not found");
            assert_eq!(status_code, Some(404));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn transport_failure_has_no_status() {
    let d = Dispatcher::from_config(Ok::<_, String>(config("http://127.0.0.1:1")));
    let err = d
        .call_tool("freelo_list_users", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ToolError::Execution {
            status_code: None,
            ..
        }
    ));
}

#[tokio::test]
async fn upload_and_download_round_trip_bytes() {
    let server = MockServer::start_async().await;
    let up = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/file/upload")
                .header_exists("content-type")
                .body_includes("hello freelo");
            then.status(200)
                .json_body(json!({"uuid": "f-1", "name": "note.txt", "size": 12}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/file/f-1");
            then.status(200).body("hello freelo");
        })
        .await;
    let d = dispatcher(&server);

    let v = d
        .call_tool(
            "freelo_upload_file",
            json!({"filename": "note.txt", "content_base64": STANDARD.encode("hello freelo")}),
        )
        .await
        .unwrap();
    up.assert_async().await;
    assert_eq!(v["attachment"]["uuid"], "f-1");

    let v = d
        .call_tool("freelo_download_file", json!({"file_uuid": "f-1"}))
        .await
        .unwrap();
    assert_eq!(v["size_bytes"], 12);
    assert_eq!(v["content_base64"], STANDARD.encode("hello freelo"));
}

#[tokio::test]
async fn bodiless_requests_send_no_content_type() {
    let server = MockServer::start_async().await;
    let finish = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/task/5/finish")
                .header_missing("content-type");
            then.status(200).json_body(json!({"result": "success"}));
        })
        .await;
    let download = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/file/f-2")
                .header_missing("content-type");
            then.status(200).body("abc");
        })
        .await;
    let d = dispatcher(&server);

    let v = d
        .call_tool("freelo_finish_task", json!({"task_id": 5}))
        .await
        .unwrap();
    assert_eq!(v["success"], true);
    d.call_tool("freelo_download_file", json!({"file_uuid": "f-2"}))
        .await
        .unwrap();
    finish.assert_async().await;
    download.assert_async().await;
}

#[tokio::test]
async fn bad_base64_is_an_execution_error() {
    let server = MockServer::start_async().await;
    let err = dispatcher(&server)
        .call_tool(
            "freelo_upload_file",
            json!({"filename": "x.bin", "content_base64": "@@not base64@@"}),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Invalid base64 content"));
}
