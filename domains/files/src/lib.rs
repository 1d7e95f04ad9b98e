//! Files domain: patient file metadata, upload, download, inline view
//!
//! File bytes live in object storage under an opaque blob key; this crate
//! owns the metadata that ties a blob to its patient.

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;

// Re-export repository types
pub use repository::{FileStore, InMemoryFileStore, PgFileStore};

// Re-export API types
pub use api::routes;
pub use api::FilesState;
