//! Pasar GIS Store - Layer storage adapters
//!
//! The relational database used in production is an external collaborator;
//! this crate provides the in-memory adapter used by the API server in
//! development and by tests.

pub mod memory;

pub use memory::MemoryLayerStore;
