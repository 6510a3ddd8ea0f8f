//! Handing flattened designs to persistence.

/// Design store contract and built-in stores.
pub mod store;
