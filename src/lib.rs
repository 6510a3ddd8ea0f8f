//! garment-studio composes customer designs onto garment photos.
//!
//! A design is an immutable [`DesignState`] snapshot: a garment selection plus at most one
//! uploaded image layer and one text layer. The public API is session-oriented:
//!
//! - Edit through a [`DesignSession`] (discrete edits, drafts, undo/redo)
//! - Render snapshots with a [`Compositor`]
//! - [`flatten`] the result to PNG and hand it to a [`DesignStore`]
#![forbid(unsafe_code)]

/// Font, raster and SVG assets.
pub mod assets;
/// Garment selections and the base-image catalog.
pub mod catalog;
/// Deployment configuration.
pub mod config;
/// Byte encodings (PNG, data URLs).
pub mod encode;
/// Persistence of flattened designs.
pub mod export;
mod foundation;
/// CPU compositor.
pub mod render;
/// Layer model and design snapshots.
pub mod scene;
/// Editing sessions.
pub mod session;

pub use crate::foundation::color::Rgba8;
pub use crate::foundation::core::{Affine, Canvas, Point, Vec2};
pub use crate::foundation::error::{StudioError, StudioResult};
pub use crate::foundation::math::normalize_degrees;

pub use crate::assets::fonts::FontBook;
pub use crate::assets::loader::{AssetSource, FsAssetSource, MemoryAssetSource};
pub use crate::catalog::garment::{GarmentColor, GarmentSelection, ProductType, ViewAngle};
pub use crate::catalog::table::{GarmentCatalog, ImageReference};
pub use crate::config::StudioConfig;
pub use crate::encode::data_url::{from_data_url, to_data_url};
pub use crate::encode::png::flatten;
pub use crate::export::store::{
    DesignRecordId, DesignSlot, DesignStore, DesignSubmission, FsDesignStore,
    InMemoryDesignStore, submit,
};
pub use crate::render::compositor::{Compositor, RenderReport, RenderWarning};
pub use crate::render::raster::RasterImage;
pub use crate::scene::design::{DesignPatch, DesignState, EditContext, apply_edit};
pub use crate::scene::layer::{
    Anchor, ApproxTextMeasure, ImageLayer, ImageSource, LayerLimits, LayerSize, LayerTransform,
    Placement, TextAlign, TextLayer, TextMeasure, TextStyle,
};
pub use crate::session::history::HistoryStack;
pub use crate::session::studio::{DesignSession, RenderRequest};
pub use crate::session::ticket::{RenderTicket, TicketBook};
