use super::{parse, HandlerResult, ToolDefinition};
use crate::http::FreeloClient;
use crate::schema::{Field, ObjectSchema};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::info;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub(super) fn tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "freelo_upload_file",
            "Upload a file to Freelo; the returned UUID can be attached to comments",
            ObjectSchema::new()
                .field(Field::non_empty("filename", "File name including extension").required())
                .field(Field::string("content_base64", "File content, base64 encoded").required()),
            upload_file,
        ),
        ToolDefinition::new(
            "freelo_download_file",
            "Download a file attachment by UUID. Returns base64 content, or saves to a temp file if save_to_file is true",
            ObjectSchema::new()
                .field(Field::non_empty("file_uuid", "File UUID from attachment").required())
                .field(
                    Field::boolean(
                        "save_to_file",
                        "Save to a temp file and return its path instead of base64",
                    )
                    .default_value(json!(false)),
                )
                .field(Field::string(
                    "filename",
                    "File name for the saved file (used with save_to_file)",
                )),
            download_file,
        ),
    ]
}

#[derive(Debug, Deserialize)]
struct UploadInput {
    filename: String,
    content_base64: String,
}

#[derive(Debug, Deserialize)]
struct DownloadInput {
    file_uuid: String,
    save_to_file: bool,
    filename: Option<String>,
}

/// Where a downloaded file lands: the temp dir plus the last path component
/// of the requested name, or `freelo_<uuid>`.
fn download_target(dir: &Path, file_uuid: &str, filename: Option<&str>) -> PathBuf {
    let name = filename
        .and_then(|f| Path::new(f).file_name())
        .map(|f| f.to_os_string())
        .unwrap_or_else(|| format!("freelo_{}", file_uuid).into());
    dir.join(name)
}

fn upload_file(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: UploadInput = parse(input)?;
        let bytes = STANDARD.decode(input.content_base64.trim())?;
        let size = bytes.len();
        let a = client.upload_file(bytes, &input.filename).await?;
        Ok(json!({
            "success": true,
            "attachment": {
                "uuid": a.uuid,
                "name": a.name,
                "size": a.size,
                "mime_type": a.mime_type,
                "url": a.url,
            },
            "size_bytes": size,
        }))
    }
    .boxed()
}

fn download_file(input: Value, client: &FreeloClient) -> BoxFuture<'_, HandlerResult> {
    async move {
        let input: DownloadInput = parse(input)?;
        let bytes = client.download_file(&input.file_uuid).await?;
        if input.save_to_file {
            let path = download_target(
                &std::env::temp_dir(),
                &input.file_uuid,
                input.filename.as_deref(),
            );
            tokio::fs::write(&path, &bytes).await?;
            info!("saved file {} to {}", input.file_uuid, path.display());
            return Ok(json!({
                "success": true,
                "file_uuid": input.file_uuid,
                "saved_to": path.to_string_lossy(),
                "size_bytes": bytes.len(),
            }));
        }
        Ok(json!({
            "success": true,
            "file_uuid": input.file_uuid,
            "content_base64": STANDARD.encode(&bytes),
            "size_bytes": bytes.len(),
        }))
    }
    .boxed()
}
