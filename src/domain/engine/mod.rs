pub mod query_engine;

pub use query_engine::{QueryEngine, TABLE_NAME, DEFAULT_QUERY};

#[cfg(test)]
pub use query_engine::MockQueryEngine;
