//! Files domain layer: entities and upload helpers

pub mod entities;
pub mod upload;
