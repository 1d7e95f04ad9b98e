//! API layer for the Files domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::FilesState;
pub use routes::routes;
