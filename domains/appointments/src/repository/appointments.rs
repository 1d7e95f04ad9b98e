//! PostgreSQL appointment store

use carepoint_common::RepositoryError;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AppointmentStore, RepositoryResult};
use crate::domain::entities::Appointment;

/// All columns in the appointments table, used for SELECT and RETURNING clauses.
const APPOINTMENT_COLUMNS: &str = "\
    id, patient_id, doctor_id, created_by, \
    appointment_date, appointment_time, status, notes, \
    created_at, updated_at";

#[derive(Clone)]
pub struct PgAppointmentStore {
    pool: PgPool,
}

impl PgAppointmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn create(&self, appointment: &Appointment) -> RepositoryResult<Appointment> {
        let query = format!(
            "INSERT INTO appointments \
                (id, patient_id, doctor_id, created_by, appointment_date, \
                 appointment_time, status, notes, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {APPOINTMENT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Appointment>(&query)
            .bind(appointment.id)
            .bind(appointment.patient_id)
            .bind(appointment.doctor_id)
            .bind(appointment.created_by)
            .bind(appointment.appointment_date)
            .bind(appointment.appointment_time)
            .bind(appointment.status)
            .bind(&appointment.notes)
            .bind(appointment.created_at)
            .bind(appointment.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Appointment>> {
        let query = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1");
        let appointment = sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(appointment)
    }

    async fn list(&self, date: Option<NaiveDate>) -> RepositoryResult<Vec<Appointment>> {
        let query = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE ($1::date IS NULL OR appointment_date = $1) \
             ORDER BY appointment_date, appointment_time, id"
        );
        let appointments = sqlx::query_as::<_, Appointment>(&query)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(appointments)
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> RepositoryResult<Vec<Appointment>> {
        let query = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE patient_id = $1 \
             ORDER BY appointment_date, appointment_time, id"
        );
        let appointments = sqlx::query_as::<_, Appointment>(&query)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(appointments)
    }

    async fn update(&self, appointment: &Appointment) -> RepositoryResult<Appointment> {
        let query = format!(
            "UPDATE appointments SET \
                doctor_id = $2, appointment_date = $3, appointment_time = $4, \
                status = $5, notes = $6, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {APPOINTMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(appointment.id)
            .bind(appointment.doctor_id)
            .bind(appointment.appointment_date)
            .bind(appointment.appointment_time)
            .bind(appointment.status)
            .bind(&appointment.notes)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
