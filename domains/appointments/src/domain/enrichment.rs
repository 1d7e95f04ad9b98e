//! Attach patient, doctor, and creator names to appointment listings

use std::collections::HashMap;

use carepoint_accounts::{RepositoryResult, User, UserStore};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{Appointment, AppointmentStatus};

/// First and last name of a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for PersonName {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Appointment with participant names resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient: Option<PersonName>,
    pub doctor_id: Uuid,
    pub doctor: Option<PersonName>,
    pub created_by: Uuid,
    pub creator: Option<PersonName>,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppointmentResponse {
    fn build(appointment: Appointment, names: &HashMap<Uuid, PersonName>) -> Self {
        Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            patient: names.get(&appointment.patient_id).cloned(),
            doctor_id: appointment.doctor_id,
            doctor: names.get(&appointment.doctor_id).cloned(),
            created_by: appointment.created_by,
            creator: names.get(&appointment.created_by).cloned(),
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            status: appointment.status,
            notes: appointment.notes,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }
}

/// Look each participant up once. Users that no longer exist are left out.
async fn resolve_names(
    users: &dyn UserStore,
    appointments: &[Appointment],
) -> RepositoryResult<HashMap<Uuid, PersonName>> {
    let mut names: HashMap<Uuid, PersonName> = HashMap::new();
    let mut missing: Vec<Uuid> = Vec::new();

    for appointment in appointments {
        for id in [
            appointment.patient_id,
            appointment.doctor_id,
            appointment.created_by,
        ] {
            if names.contains_key(&id) || missing.contains(&id) {
                continue;
            }
            match users.find_by_id(id).await? {
                Some(user) => {
                    names.insert(id, PersonName::from(&user));
                }
                None => missing.push(id),
            }
        }
    }

    Ok(names)
}

/// Resolve participant names for a listing
pub async fn enrich(
    users: &dyn UserStore,
    appointments: Vec<Appointment>,
) -> RepositoryResult<Vec<AppointmentResponse>> {
    let names = resolve_names(users, &appointments).await?;

    Ok(appointments
        .into_iter()
        .map(|appointment| AppointmentResponse::build(appointment, &names))
        .collect())
}

pub async fn enrich_one(
    users: &dyn UserStore,
    appointment: Appointment,
) -> RepositoryResult<AppointmentResponse> {
    let names = resolve_names(users, std::slice::from_ref(&appointment)).await?;
    Ok(AppointmentResponse::build(appointment, &names))
}
