// Configuration module
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::domain::engine::DEFAULT_QUERY;
use crate::{Error, Result};

/// 設定ファイルを指定しなかった場合に探すパス
pub const DEFAULT_CONFIG_FILE: &str = "sqlviewer.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// アップロードを受け付ける最大バイト数
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// この秒数アクセスの無いセッションを破棄する（0で無効）
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

/// Query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    /// SQL入力欄の初期値
    #[serde(default = "default_sql")]
    pub default_sql: String,
    /// 表示用に返す最大行数
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `RUST_LOG` が無い場合のフィルター
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    200 * 1024 * 1024
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

fn default_sql() -> String {
    DEFAULT_QUERY.to_string()
}

fn default_preview_rows() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl ServerSettings {
    /// セッションの放置タイムアウト
    pub fn session_idle_timeout(&self) -> Option<Duration> {
        (self.session_idle_secs > 0).then(|| Duration::from_secs(self.session_idle_secs))
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_sql: default_sql(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 設定を読み込む
    ///
    /// `path` を指定した場合はそのファイルが必須。指定しない場合は
    /// `sqlviewer.toml` があれば読み、無ければデフォルト値を使う。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// 待ち受けアドレス
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address: {}", e)))
    }
}
