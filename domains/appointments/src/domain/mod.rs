//! Appointments domain layer: entities and listing enrichment

pub mod enrichment;
pub mod entities;
