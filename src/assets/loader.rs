use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::catalog::table::ImageReference;
use crate::foundation::error::{StudioError, StudioResult};

/// Where base garment images come from.
///
/// Implementations report every failure as [`StudioError::AssetResolution`] so the compositor can
/// fall back without inspecting the cause.
pub trait AssetSource {
    /// Fetch the encoded bytes behind `reference`.
    fn read(&self, reference: &ImageReference) -> StudioResult<Vec<u8>>;
}

/// Normalize and validate catalog-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> StudioResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StudioError::asset_resolution("asset paths must be relative"));
    }
    if s.trim().is_empty() {
        return Err(StudioError::asset_resolution("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StudioError::asset_resolution(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StudioError::asset_resolution(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Reads catalog references as paths below a root directory.
///
/// URL references are never fetched; they resolve to an error and the caller falls back.
#[derive(Clone, Debug)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssetSource {
    fn read(&self, reference: &ImageReference) -> StudioResult<Vec<u8>> {
        if reference.is_url() {
            return Err(StudioError::asset_resolution(format!(
                "remote reference '{}' is not fetched",
                reference.as_str()
            )));
        }
        let norm = normalize_rel_path(reference.as_str())?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path)
            .with_context(|| format!("read asset bytes from '{}'", path.display()))
            .map_err(|e| StudioError::asset_resolution(format!("{e:#}")))
    }
}

/// In-memory asset table keyed by normalized reference.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `reference`.
    pub fn insert(&mut self, reference: &str, bytes: impl Into<Vec<u8>>) -> StudioResult<()> {
        let key = normalize_rel_path(reference)?;
        self.files.insert(key, bytes.into());
        Ok(())
    }

    /// Builder-style [`MemoryAssetSource::insert`].
    pub fn with(mut self, reference: &str, bytes: impl Into<Vec<u8>>) -> StudioResult<Self> {
        self.insert(reference, bytes)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetSource for MemoryAssetSource {
    fn read(&self, reference: &ImageReference) -> StudioResult<Vec<u8>> {
        let key = normalize_rel_path(reference.as_str())?;
        self.files.get(&key).cloned().ok_or_else(|| {
            StudioError::asset_resolution(format!("no asset registered for '{key}'"))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
