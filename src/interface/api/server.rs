use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Extension, Router, Server,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::application::SessionRegistry;
use crate::config::AppConfig;
use crate::domain::engine::QueryEngine;
use crate::infrastructure::engine::DataFusionEngine;
use crate::interface::api::handler::{
    create_session_handler, delete_session_handler, execute_query_handler,
    export_result_handler, health_check_handler, preview_dataset_handler,
    search_columns_handler, upload_dataset_handler,
};

fn session_registry(config: &AppConfig) -> SessionRegistry {
    match config.server.session_idle_timeout() {
        Some(timeout) => SessionRegistry::with_idle_timeout(timeout),
        None => SessionRegistry::new(),
    }
}

/// ルーターを組み立てる
pub fn build_router(config: Arc<AppConfig>, engine: Arc<dyn QueryEngine>) -> Router {
    let registry = Arc::new(session_registry(&config));
    routes(config, engine, registry)
}

fn routes(
    config: Arc<AppConfig>,
    engine: Arc<dyn QueryEngine>,
    registry: Arc<SessionRegistry>,
) -> Router {
    let body_limit = config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check_handler))
        .route("/api/sessions", post(create_session_handler))
        .route("/api/sessions/:session_id", delete(delete_session_handler))
        .route(
            "/api/sessions/:session_id/dataset",
            put(upload_dataset_handler).get(preview_dataset_handler),
        )
        .route("/api/sessions/:session_id/columns", get(search_columns_handler))
        .route("/api/sessions/:session_id/query", post(execute_query_handler))
        .route("/api/sessions/:session_id/export", get(export_result_handler))
        .layer(Extension(registry)) // セッション
        .layer(Extension(engine)) // クエリエンジン
        .layer(Extension(config)) // 設定
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr()?;
    let engine: Arc<dyn QueryEngine> = Arc::new(DataFusionEngine::new());
    info!(engine = engine.name(), "query engine ready");

    let registry = Arc::new(session_registry(&config));
    // 放置されたセッションはタイムアウトの半分の間隔で掃除する
    let sweeper = config
        .server
        .session_idle_timeout()
        .map(|timeout| registry.spawn_eviction((timeout / 2).max(Duration::from_secs(1))));

    let app = routes(Arc::new(config), engine, registry);

    info!("サーバーを{}で起動中...", addr);

    // サーバーの起動
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("サーバーを停止します");
}
