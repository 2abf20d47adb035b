use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Json, Response};
use depot_store::StoreError;

use crate::api::{
    HealthResponse, ListResponse, MetricsResponse, RootResponse, UploadResponse, UPLOAD_FIELD,
};
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse::default())
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Download a stored file as raw bytes.
pub async fn get_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ServerResult<Response> {
    let (name, data) = state
        .run_blocking(move |s| {
            let target = s.resolver().resolve(&name)?;
            let data = s.store().read(&target)?;
            Ok((target.name().to_string(), data))
        })
        .await?;

    let mut response = ([(CONTENT_TYPE, "application/octet-stream")], data).into_response();
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name.replace('"', "\\\"")))
    {
        response.headers_mut().insert(CONTENT_DISPOSITION, disposition);
    }
    Ok(response)
}

/// Store the multipart field `file` under its sanitized filename.
pub async fn store_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_owned).unwrap_or_default();
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await?;
        upload = Some((filename, content_type, data));
        break;
    }
    let (raw_name, content_type, data) = upload.ok_or_else(|| {
        ServerError::BadRequest(format!("missing multipart field '{UPLOAD_FIELD}'"))
    })?;

    let (filename, outcome) = state
        .run_blocking(move |s| {
            let target = s.resolver().resolve(&raw_name)?;
            let outcome = s.store().write(&target, &data).map_err(|e| match e {
                StoreError::Io(io) => ServerError::StoreFailed(io.to_string()),
                other => other.into(),
            })?;
            s.tracker().record_upload(outcome.was_new_file);
            Ok((target.name().to_string(), outcome))
        })
        .await?;

    tracing::info!(
        filename = %filename,
        size = outcome.size,
        new = outcome.was_new_file,
        "file stored"
    );
    Ok(Json(UploadResponse {
        message: "File stored successfully".into(),
        filename,
        size: outcome.size,
        content_type,
    }))
}

pub async fn list_files(State(state): State<AppState>) -> ServerResult<Json<ListResponse>> {
    let entries = state.run_blocking(|s| Ok(s.store().list()?)).await?;
    let files: Vec<String> = entries.into_iter().map(|e| e.name).collect();
    Ok(Json(ListResponse {
        count: files.len(),
        files,
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> ServerResult<Json<MetricsResponse>> {
    let snapshot = state
        .run_blocking(|s| Ok(s.tracker().snapshot(s.store())?))
        .await?;
    Ok(Json(MetricsResponse::from(snapshot)))
}
