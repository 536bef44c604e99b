pub mod columns;
pub mod chart;
pub mod session;
pub mod registry;

pub use columns::{filter_columns, column_groups, numeric_columns};
pub use chart::{line_chart, LineChart, ChartSeries};
pub use session::{Session, LoadedDataset, LoadSummary, ExportArtifact};
pub use registry::{SessionRegistry, SessionId};
