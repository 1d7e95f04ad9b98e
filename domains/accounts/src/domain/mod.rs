//! Accounts domain layer: entities, authentication flows, validation

pub mod auth;
pub mod entities;
pub mod validation;
