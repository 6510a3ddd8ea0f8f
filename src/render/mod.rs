//! CPU compositing of design snapshots.

/// The design compositor and its render report.
pub mod compositor;
/// Rendered pixel buffers.
pub mod raster;
