//! HTTP handlers for the Appointments domain

pub mod appointments;
