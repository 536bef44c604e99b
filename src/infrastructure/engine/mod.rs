pub mod datafusion_engine;

pub use datafusion_engine::DataFusionEngine;
