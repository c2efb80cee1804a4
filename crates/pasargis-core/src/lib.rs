//! Pasar GIS Core - Domain models, error taxonomy, and configuration
//!
//! This crate contains the shared domain types and the port definitions that the
//! ingestion pipeline, storage adapters, and HTTP surface build on.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{IngestError, Result};
