//! Editable design model: layers and the immutable design snapshot.

/// Design snapshots and the edit seam.
pub mod design;
/// Image/text layer model.
pub mod layer;
