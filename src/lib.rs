pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod interface;
pub mod config;

// sqlviewer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("No dataset loaded")]
    NoDataset,

    #[error("No successful query result to export")]
    NoQueryResult,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Internal error: {0}")]
    Internal(String),
}
