//! API layer for the Appointments domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::AppointmentsState;
pub use routes::routes;
