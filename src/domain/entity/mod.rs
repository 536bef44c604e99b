pub mod column_type;
pub mod value;
pub mod column;
pub mod dataset;
pub mod format;
pub mod outcome;
// src/domain/entity/mod.rs

pub use column_type::ColumnType;
pub use value::Value;
pub use column::Column;
pub use dataset::{TabularDataset, Row, DatasetError};
pub use format::{FileFormat, ExportFormat};
pub use outcome::QueryOutcome;
