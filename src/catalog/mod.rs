//! Garment catalog: the (product, color, view) triple and its base-image lookup table.

/// Garment selection types.
pub mod garment;
/// Injectable base-image lookup table.
pub mod table;
