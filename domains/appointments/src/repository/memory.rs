//! In-memory appointment store

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use carepoint_common::RepositoryError;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{AppointmentStore, RepositoryResult};
use crate::domain::entities::Appointment;

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: Mutex<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, HashMap<Uuid, Appointment>>> {
        self.appointments.lock().map_err(|_| {
            RepositoryError::Unavailable("appointment store lock poisoned".to_string())
        })
    }

    fn select(&self, filter: impl Fn(&Appointment) -> bool) -> RepositoryResult<Vec<Appointment>> {
        let mut selected: Vec<Appointment> = self
            .lock()?
            .values()
            .filter(|appointment| filter(appointment))
            .cloned()
            .collect();
        selected.sort_by(|a, b| {
            (a.appointment_date, a.appointment_time, a.id).cmp(&(
                b.appointment_date,
                b.appointment_time,
                b.id,
            ))
        });
        Ok(selected)
    }
}

#[async_trait::async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn create(&self, appointment: &Appointment) -> RepositoryResult<Appointment> {
        let mut appointments = self.lock()?;
        if appointments.contains_key(&appointment.id) {
            return Err(RepositoryError::AlreadyExists);
        }
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Appointment>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn list(&self, date: Option<NaiveDate>) -> RepositoryResult<Vec<Appointment>> {
        self.select(|appointment| date.is_none_or(|day| appointment.appointment_date == day))
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> RepositoryResult<Vec<Appointment>> {
        self.select(|appointment| appointment.patient_id == patient_id)
    }

    async fn update(&self, appointment: &Appointment) -> RepositoryResult<Appointment> {
        let mut appointments = self.lock()?;
        let stored = appointments
            .get_mut(&appointment.id)
            .ok_or(RepositoryError::NotFound)?;

        stored.doctor_id = appointment.doctor_id;
        stored.appointment_date = appointment.appointment_date;
        stored.appointment_time = appointment.appointment_time;
        stored.status = appointment.status;
        stored.notes = appointment.notes.clone();
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        self.lock()?
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
