//! Route definitions for Appointments domain API

use axum::{routing::get, Router};

use super::handlers::appointments;
use super::middleware::AppointmentsState;

/// Create all Appointments domain routes
pub fn routes() -> Router<AppointmentsState> {
    Router::new()
        .route(
            "/v1/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/v1/appointments/{id}",
            get(appointments::get_appointment)
                .patch(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route(
            "/v1/patients/{id}/appointments",
            get(appointments::list_patient_appointments),
        )
}
