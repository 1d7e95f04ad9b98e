//! Appointment API handlers
//!
//! Patients see and book only their own appointments. Rescheduling,
//! status changes, and deletion are clinic-side operations.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use carepoint_accounts::User;
use carepoint_auth::{AuthContext, AuthUser, Role};
use carepoint_common::{Error, RepositoryError, Result, ValidatedJson};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::AppointmentsState;
use crate::domain::enrichment::{enrich, enrich_one, AppointmentResponse};
use crate::domain::entities::{Appointment, AppointmentStatus};

/// Request for booking an appointment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Request for changing an appointment. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAppointmentRequest {
    pub doctor_id: Option<Uuid>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub status: Option<AppointmentStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    fn reschedules(&self) -> bool {
        self.doctor_id.is_some() || self.appointment_date.is_some() || self.appointment_time.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListAppointmentsQuery {
    pub date: Option<NaiveDate>,
}

fn appointment_not_found() -> Error {
    Error::NotFound("Appointment not found".to_string())
}

fn require_clinical_staff(auth_context: &AuthContext) -> Result<()> {
    if auth_context.role.is_clinical_staff() {
        Ok(())
    } else {
        Err(Error::Authorization(
            "Only clinic staff can change appointments".to_string(),
        ))
    }
}

fn require_patient_access(auth_context: &AuthContext, patient_id: Uuid) -> Result<()> {
    if auth_context.can_access_patient(patient_id) {
        Ok(())
    } else {
        Err(Error::Authorization(
            "You can only access your own appointments".to_string(),
        ))
    }
}

/// Fetch a participant and check it holds the expected role
async fn require_participant(
    state: &AppointmentsState,
    user_id: Uuid,
    expected: Role,
) -> Result<User> {
    let label = match expected {
        Role::Patient => "Patient",
        Role::Doctor => "Doctor",
        Role::Admin | Role::Staff => "User",
    };

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("{} not found", label)))?;

    if user.role != expected {
        return Err(Error::Validation(format!(
            "User {} is not a {}",
            user_id,
            expected.as_str().to_lowercase()
        )));
    }
    Ok(user)
}

/// List appointments, optionally for one day. Patients only see their own.
pub async fn list_appointments(
    AuthUser(auth_context): AuthUser,
    State(state): State<AppointmentsState>,
    Query(params): Query<ListAppointmentsQuery>,
) -> Result<Json<Vec<AppointmentResponse>>> {
    let appointments = if auth_context.role.is_clinical_staff() {
        state.appointments.list(params.date).await?
    } else {
        let mut own = state
            .appointments
            .list_for_patient(auth_context.user_id)
            .await?;
        if let Some(date) = params.date {
            own.retain(|appointment| appointment.appointment_date == date);
        }
        own
    };

    let enriched = enrich(state.users.as_ref(), appointments).await?;
    Ok(Json(enriched))
}

/// Book an appointment; the caller is recorded as its creator
pub async fn create_appointment(
    AuthUser(auth_context): AuthUser,
    State(state): State<AppointmentsState>,
    ValidatedJson(request): ValidatedJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>)> {
    require_patient_access(&auth_context, request.patient_id)?;
    require_participant(&state, request.patient_id, Role::Patient).await?;
    require_participant(&state, request.doctor_id, Role::Doctor).await?;

    let appointment = Appointment::new(
        request.patient_id,
        request.doctor_id,
        auth_context.user_id,
        request.appointment_date,
        request.appointment_time,
        request.notes,
    );
    let created = state.appointments.create(&appointment).await?;

    tracing::info!(
        appointment_id = %created.id,
        patient_id = %created.patient_id,
        created_by = %created.created_by,
        "Appointment created"
    );

    let response = enrich_one(state.users.as_ref(), created).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get one appointment
pub async fn get_appointment(
    AuthUser(auth_context): AuthUser,
    State(state): State<AppointmentsState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>> {
    let appointment = state
        .appointments
        .find_by_id(appointment_id)
        .await?
        .ok_or_else(appointment_not_found)?;
    require_patient_access(&auth_context, appointment.patient_id)?;

    let response = enrich_one(state.users.as_ref(), appointment).await?;
    Ok(Json(response))
}

/// List one patient's appointments
pub async fn list_patient_appointments(
    AuthUser(auth_context): AuthUser,
    State(state): State<AppointmentsState>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<AppointmentResponse>>> {
    require_patient_access(&auth_context, patient_id)?;

    let appointments = state.appointments.list_for_patient(patient_id).await?;
    let enriched = enrich(state.users.as_ref(), appointments).await?;
    Ok(Json(enriched))
}

/// Reschedule, reassign, annotate, or change the status of an appointment
pub async fn update_appointment(
    AuthUser(auth_context): AuthUser,
    State(state): State<AppointmentsState>,
    Path(appointment_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>> {
    require_clinical_staff(&auth_context)?;

    let mut appointment = state
        .appointments
        .find_by_id(appointment_id)
        .await?
        .ok_or_else(appointment_not_found)?;

    if request.reschedules() && appointment.status.is_closed() {
        return Err(Error::Validation(
            "Closed appointments cannot be rescheduled".to_string(),
        ));
    }

    if let Some(doctor_id) = request.doctor_id {
        require_participant(&state, doctor_id, Role::Doctor).await?;
        appointment.doctor_id = doctor_id;
    }
    if let Some(date) = request.appointment_date {
        appointment.appointment_date = date;
    }
    if let Some(time) = request.appointment_time {
        appointment.appointment_time = time;
    }
    if let Some(status) = request.status {
        appointment.status = status;
    }
    if let Some(notes) = request.notes {
        appointment.notes = Some(notes);
    }

    let updated = state
        .appointments
        .update(&appointment)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => appointment_not_found(),
            other => other.into(),
        })?;

    tracing::info!(
        appointment_id = %updated.id,
        status = ?updated.status,
        actor = %auth_context.user_id,
        "Appointment updated"
    );

    let response = enrich_one(state.users.as_ref(), updated).await?;
    Ok(Json(response))
}

/// Delete an appointment
pub async fn delete_appointment(
    AuthUser(auth_context): AuthUser,
    State(state): State<AppointmentsState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode> {
    require_clinical_staff(&auth_context)?;

    state
        .appointments
        .delete(appointment_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => appointment_not_found(),
            other => other.into(),
        })?;

    tracing::info!(
        appointment_id = %appointment_id,
        actor = %auth_context.user_id,
        "Appointment deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
