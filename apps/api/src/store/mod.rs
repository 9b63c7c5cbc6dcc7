//! Flat-file persistence: one JSON document per resource, rewritten whole.

pub mod document;

pub use document::{JsonDocument, ReadPolicy, StoreError};
