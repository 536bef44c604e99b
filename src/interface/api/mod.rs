pub mod handler;
pub mod server;

pub use handler::ApiError;
pub use server::{build_router, start_server};
