//! Domain entities for the Appointments domain

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "appointment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    CheckedIn,
    Cancelled,
    Completed,
    NoShow,
    LabTests,
}

impl AppointmentStatus {
    /// Whether the visit has reached an end state
    pub fn is_closed(&self) -> bool {
        match self {
            AppointmentStatus::Cancelled
            | AppointmentStatus::Completed
            | AppointmentStatus::NoShow => true,
            AppointmentStatus::Scheduled
            | AppointmentStatus::CheckedIn
            | AppointmentStatus::LabTests => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// Subject of the token that booked the appointment
    pub created_by: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(
        patient_id: Uuid,
        doctor_id: Uuid,
        created_by: Uuid,
        appointment_date: NaiveDate,
        appointment_time: NaiveTime,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            created_by,
            appointment_date,
            appointment_time,
            status: AppointmentStatus::default(),
            notes,
            created_at: now,
            updated_at: now,
        }
    }
}
