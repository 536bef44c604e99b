pub mod entity;
pub mod engine;
