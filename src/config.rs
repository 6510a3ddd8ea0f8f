use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::assets::fonts::FontBook;
use crate::assets::loader::FsAssetSource;
use crate::catalog::table::GarmentCatalog;
use crate::foundation::core::Canvas;
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::compositor::Compositor;
use crate::scene::layer::LayerLimits;
use crate::session::studio::DesignSession;

/// Environment variable that replaces [`StudioConfig::assets_root`].
pub const ASSETS_ROOT_ENV: &str = "GARMENT_STUDIO_ASSETS_ROOT";

/// Deployment settings for a studio instance. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Output canvas; 800x1000 matches the storefront.
    pub canvas: Canvas,
    /// Directory catalog references are resolved against.
    pub assets_root: PathBuf,
    /// Extra font directories loaded on top of system fonts.
    pub font_dirs: Vec<PathBuf>,
    /// Maximum number of history entries kept; unbounded when absent.
    pub history_limit: Option<usize>,
    pub min_layer_size_px: f64,
    /// Largest layer side as a multiple of the larger canvas side.
    pub max_layer_size_factor: f64,
    /// Garment table; the built-in storefront table when absent.
    pub catalog: Option<GarmentCatalog>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            assets_root: PathBuf::from("."),
            font_dirs: Vec::new(),
            history_limit: None,
            min_layer_size_px: LayerLimits::DEFAULT_MIN_SIZE_PX,
            max_layer_size_factor: LayerLimits::DEFAULT_MAX_FACTOR,
            catalog: None,
        }
    }
}

impl StudioConfig {
    /// Parse and validate a JSON config.
    pub fn from_reader(r: impl Read) -> StudioResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| StudioError::serde(format!("parse studio config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a JSON config file.
    ///
    /// Relative `assets_root` and `font_dirs` are taken relative to the file's directory.
    pub fn from_json_file(path: &Path) -> StudioResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        if let Some(base) = path.parent() {
            cfg.assets_root = rebase(base, &cfg.assets_root);
            cfg.font_dirs = cfg.font_dirs.iter().map(|d| rebase(base, d)).collect();
        }
        Ok(cfg)
    }

    /// Reject settings no studio can run with.
    pub fn validate(&self) -> StudioResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        if !self.min_layer_size_px.is_finite() || self.min_layer_size_px < 1.0 {
            return Err(StudioError::validation(
                "min_layer_size_px must be finite and >= 1",
            ));
        }
        if !self.max_layer_size_factor.is_finite() || self.max_layer_size_factor <= 0.0 {
            return Err(StudioError::validation(
                "max_layer_size_factor must be finite and > 0",
            ));
        }
        if self.history_limit == Some(0) {
            return Err(StudioError::validation("history_limit must be > 0"));
        }
        Ok(())
    }

    /// Apply environment overrides ([`ASSETS_ROOT_ENV`]).
    pub fn with_env_overrides(self) -> Self {
        self.with_assets_root_override(std::env::var(ASSETS_ROOT_ENV).ok())
    }

    /// Replace `assets_root` when `root` is a non-empty value.
    pub fn with_assets_root_override(mut self, root: Option<String>) -> Self {
        if let Some(root) = root.filter(|r| !r.trim().is_empty()) {
            self.assets_root = PathBuf::from(root);
        }
        self
    }

    pub fn limits(&self) -> LayerLimits {
        LayerLimits::for_canvas(
            self.canvas,
            self.min_layer_size_px,
            self.max_layer_size_factor,
        )
    }

    pub fn catalog(&self) -> GarmentCatalog {
        self.catalog.clone().unwrap_or_else(GarmentCatalog::builtin)
    }

    /// System fonts plus `font_dirs`.
    pub fn font_book(&self) -> FontBook {
        FontBook::with_dirs(&self.font_dirs)
    }

    /// A compositor reading base images from `assets_root`.
    pub fn compositor(&self) -> Compositor {
        Compositor::new(
            self.catalog(),
            FsAssetSource::new(self.assets_root.clone()),
            self.font_book(),
        )
    }

    /// A fresh editing session honoring the configured limits.
    pub fn session(&self) -> DesignSession {
        DesignSession::new(self.limits(), self.history_limit)
    }
}

fn rebase(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
