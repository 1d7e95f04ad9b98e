//! Repository implementations for the Appointments domain

pub mod appointments;
pub mod memory;

use carepoint_common::RepositoryError;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::entities::Appointment;

pub use appointments::PgAppointmentStore;
pub use memory::InMemoryAppointmentStore;

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Appointment persistence
#[async_trait::async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create(&self, appointment: &Appointment) -> RepositoryResult<Appointment>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Appointment>>;

    /// All appointments ordered by date and time, optionally for one day
    async fn list(&self, date: Option<NaiveDate>) -> RepositoryResult<Vec<Appointment>>;

    async fn list_for_patient(&self, patient_id: Uuid) -> RepositoryResult<Vec<Appointment>>;

    /// `NotFound` if the appointment does not exist
    async fn update(&self, appointment: &Appointment) -> RepositoryResult<Appointment>;

    /// `NotFound` if the appointment does not exist
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
