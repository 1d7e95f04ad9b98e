//! Appointments domain state and auth backend integration

use std::sync::Arc;

use axum::extract::FromRef;
use carepoint_accounts::UserStore;
use carepoint_auth::AuthBackend;

use crate::repository::AppointmentStore;

/// Application state for the Appointments domain
#[derive(Clone)]
pub struct AppointmentsState {
    pub appointments: Arc<dyn AppointmentStore>,
    /// Patient, doctor, and creator lookups
    pub users: Arc<dyn UserStore>,
    pub auth: AuthBackend,
}

impl FromRef<AppointmentsState> for AuthBackend {
    fn from_ref(state: &AppointmentsState) -> Self {
        state.auth.clone()
    }
}
