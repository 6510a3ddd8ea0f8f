//! Shared primitives: canvas geometry, colors, pixel math and the error taxonomy.

pub mod color;
pub mod core;
pub mod error;
pub(crate) mod math;
