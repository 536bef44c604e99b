use axum::{
    body::Bytes,
    extract::{Extension, Json, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::application::{
    column_groups, line_chart, LineChart, LoadSummary, Session, SessionId, SessionRegistry,
};
use crate::config::AppConfig;
use crate::domain::engine::QueryEngine;
use crate::domain::entity::{Column, ExportFormat, FileFormat, QueryOutcome, Row};
use crate::VERSION;

/// 検索結果を表示するときのグループ数
const DEFAULT_COLUMN_GROUPS: usize = 3;

/// API エラー
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session {0} not found")]
    SessionNotFound(SessionId),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    App(#[from] crate::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::App(e) => match e {
                crate::Error::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
                crate::Error::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
                crate::Error::NoDataset | crate::Error::NoQueryResult => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// エラーレスポンス
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// ヘルスチェックのレスポンス
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// セッション作成のレスポンス
#[derive(Serialize)]
pub struct SessionCreatedResponse {
    session_id: SessionId,
}

/// ファイルアップロードのパラメータ
#[derive(Deserialize)]
pub struct UploadParams {
    file_name: String,
}

/// データ表示のパラメータ
#[derive(Deserialize)]
pub struct PreviewParams {
    limit: Option<usize>,
}

/// 読み込み済みデータの表示
#[derive(Serialize)]
pub struct PreviewResponse {
    file_name: String,
    format: FileFormat,
    loaded_at: DateTime<Utc>,
    row_count: usize,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

/// カラム検索のパラメータ
#[derive(Deserialize)]
pub struct ColumnSearchParams {
    #[serde(default)]
    search: String,
    groups: Option<usize>,
}

/// カラム検索の結果
#[derive(Serialize)]
pub struct ColumnSearchResponse {
    columns: Vec<String>,
    groups: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// SQLクエリのリクエスト
#[derive(Deserialize)]
pub struct QueryRequest {
    sql: Option<String>,
}

/// クエリ成功時のレスポンス
#[derive(Serialize)]
pub struct QuerySuccessResponse {
    status: &'static str,
    message: String,
    row_count: usize,
    columns: Vec<Column>,
    rows: Vec<Row>,
    chart: Option<LineChart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chart_message: Option<String>,
}

/// クエリ失敗時のレスポンス
#[derive(Serialize)]
pub struct QueryFailureResponse {
    status: &'static str,
    error: String,
}

/// エクスポートのパラメータ
#[derive(Deserialize)]
pub struct ExportParams {
    format: String,
}

async fn find_session(
    registry: &SessionRegistry,
    session_id: SessionId,
) -> Result<Arc<Mutex<Session>>, ApiError> {
    registry
        .get(session_id)
        .await
        .ok_or(ApiError::SessionNotFound(session_id))
}

/// ヘルスチェックハンドラー
pub async fn health_check_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: VERSION,
    })
}

/// セッション作成ハンドラー
pub async fn create_session_handler(
    Extension(registry): Extension<Arc<SessionRegistry>>,
) -> impl IntoResponse {
    let session_id = registry.create().await;
    (StatusCode::CREATED, Json(SessionCreatedResponse { session_id }))
}

/// セッション削除ハンドラー
pub async fn delete_session_handler(
    Path(session_id): Path<SessionId>,
    Extension(registry): Extension<Arc<SessionRegistry>>,
) -> Result<StatusCode, ApiError> {
    if registry.remove(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(session_id))
    }
}

/// ファイルアップロードハンドラー（ボディはファイルの生バイト列）
pub async fn upload_dataset_handler(
    Path(session_id): Path<SessionId>,
    Query(params): Query<UploadParams>,
    Extension(registry): Extension<Arc<SessionRegistry>>,
    body: Bytes,
) -> Result<Json<LoadSummary>, ApiError> {
    let session = find_session(&registry, session_id).await?;
    let mut session = session.lock().await;
    let summary = session.load_file(&params.file_name, body)?;
    Ok(Json(summary))
}

/// 読み込み済みデータの表示ハンドラー
pub async fn preview_dataset_handler(
    Path(session_id): Path<SessionId>,
    Query(params): Query<PreviewParams>,
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Extension(config): Extension<Arc<AppConfig>>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let session = find_session(&registry, session_id).await?;
    let session = session.lock().await;
    let loaded = session.loaded().ok_or(crate::Error::NoDataset)?;

    let limit = params.limit.unwrap_or(config.query.preview_rows);
    Ok(Json(PreviewResponse {
        file_name: loaded.file_name.clone(),
        format: loaded.format,
        loaded_at: loaded.loaded_at,
        row_count: loaded.dataset.num_rows(),
        columns: loaded.dataset.columns(),
        rows: loaded.dataset.preview(limit)?,
    }))
}

/// カラム検索ハンドラー
pub async fn search_columns_handler(
    Path(session_id): Path<SessionId>,
    Query(params): Query<ColumnSearchParams>,
    Extension(registry): Extension<Arc<SessionRegistry>>,
) -> Result<Json<ColumnSearchResponse>, ApiError> {
    let session = find_session(&registry, session_id).await?;
    let session = session.lock().await;
    let columns = session.search_columns(&params.search)?;

    let groups = column_groups(&columns, params.groups.unwrap_or(DEFAULT_COLUMN_GROUPS));
    let message = columns.is_empty().then(|| "No columns found".to_string());

    Ok(Json(ColumnSearchResponse {
        columns,
        groups,
        message,
    }))
}

/// SQL実行ハンドラー
pub async fn execute_query_handler(
    Path(session_id): Path<SessionId>,
    Extension(registry): Extension<Arc<SessionRegistry>>,
    Extension(engine): Extension<Arc<dyn QueryEngine>>,
    Extension(config): Extension<Arc<AppConfig>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Response, ApiError> {
    let sql = payload
        .sql
        .unwrap_or_else(|| config.query.default_sql.clone());

    let session = find_session(&registry, session_id).await?;
    let mut session = session.lock().await;
    let outcome = session.run_query(engine.as_ref(), &sql).await?;

    match outcome {
        QueryOutcome::Success(result) => {
            let chart = line_chart(&result)?;
            let chart_message = chart
                .is_none()
                .then(|| "No numeric columns to chart".to_string());

            let body = QuerySuccessResponse {
                status: "success",
                message: format!("Query executed: {} rows", result.num_rows()),
                row_count: result.num_rows(),
                columns: result.columns(),
                rows: result.preview(config.query.preview_rows)?,
                chart,
                chart_message,
            };
            Ok(Json(body).into_response())
        }
        QueryOutcome::Failure(message) => {
            let body = QueryFailureResponse {
                status: "failure",
                error: format!("Query error: {}", message),
            };
            Ok((StatusCode::BAD_REQUEST, Json(body)).into_response())
        }
    }
}

/// エクスポートハンドラー
pub async fn export_result_handler(
    Path(session_id): Path<SessionId>,
    Query(params): Query<ExportParams>,
    Extension(registry): Extension<Arc<SessionRegistry>>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::from_str(&params.format)
        .map_err(|_| ApiError::BadRequest(format!("Unknown export format: {}", params.format)))?;

    let session = find_session(&registry, session_id).await?;
    let session = session.lock().await;
    let artifact = session.export_last(format)?;

    let headers = [
        (header::CONTENT_TYPE, artifact.mime_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        ),
    ];
    Ok((headers, artifact.bytes).into_response())
}
