pub mod codec;
pub mod engine;
