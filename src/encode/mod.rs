//! Byte encodings at the engine boundary.

/// `data:` URL transport for image payloads.
pub mod data_url;
/// PNG flattening of rendered designs.
pub mod png;
