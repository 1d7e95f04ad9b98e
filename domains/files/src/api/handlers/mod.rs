//! HTTP handlers for the Files domain

pub mod files;
