use std::path::PathBuf;

use sqlviewer::config::AppConfig;
use sqlviewer::interface::api::start_server;
use sqlviewer::VERSION;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 第1引数があれば設定ファイルのパスとして扱う
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("sqlviewer version: {}", VERSION);

    start_server(config).await
}
