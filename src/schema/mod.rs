//! Schema inference
//!
//! Derives a single structural schema from a sample of heterogeneous rows,
//! unifying the types each field takes across the sample.

pub mod inference;

pub use inference::{infer_properties, SchemaInferencer, DEFAULT_MAX_SCAN};
