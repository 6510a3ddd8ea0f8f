/// Convenience result type used across the studio engine.
pub type StudioResult<T> = Result<T, StudioError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only [`StudioError::Persistence`] is ever surfaced from the save path. Asset and decode
/// failures are absorbed by the compositor and reported as warnings instead.
#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    /// A garment selection or asset reference could not be resolved.
    #[error("asset resolution error: {0}")]
    AssetResolution(String),

    /// An uploaded or base raster payload could not be decoded.
    #[error("layer decode error: {0}")]
    LayerDecode(String),

    /// Invalid user-provided or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The persistence collaborator rejected a flattened design.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    /// Build a [`StudioError::AssetResolution`] value.
    pub fn asset_resolution(msg: impl Into<String>) -> Self {
        Self::AssetResolution(msg.into())
    }

    /// Build a [`StudioError::LayerDecode`] value.
    pub fn layer_decode(msg: impl Into<String>) -> Self {
        Self::LayerDecode(msg.into())
    }

    /// Build a [`StudioError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StudioError::Persistence`] value.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build a [`StudioError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors that only degrade visual fidelity.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::AssetResolution(_) | Self::LayerDecode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
