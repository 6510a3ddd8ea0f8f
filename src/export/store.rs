use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::catalog::garment::{GarmentSelection, ViewAngle};
use crate::encode::data_url::to_data_url;
use crate::foundation::error::{StudioError, StudioResult};

/// Order column a flattened design is stored under, one per garment view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignSlot {
    FrontDesign,
    BackDesign,
    LeftDesign,
    RightDesign,
}

impl DesignSlot {
    pub fn for_view(view: ViewAngle) -> Self {
        match view {
            ViewAngle::Front => Self::FrontDesign,
            ViewAngle::Back => Self::BackDesign,
            ViewAngle::Left => Self::LeftDesign,
            ViewAngle::Right => Self::RightDesign,
        }
    }

    /// Column name on the order record.
    pub fn column(self) -> &'static str {
        match self {
            Self::FrontDesign => "front_design",
            Self::BackDesign => "back_design",
            Self::LeftDesign => "left_design",
            Self::RightDesign => "right_design",
        }
    }
}

/// Identifier handed back by a [`DesignStore`] for a persisted design.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignRecordId(pub String);

impl DesignRecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DesignRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A flattened design plus the garment it was composed on.
#[derive(Clone, PartialEq, Eq)]
pub struct DesignSubmission {
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
    pub garment: GarmentSelection,
    pub slot: DesignSlot,
}

impl DesignSubmission {
    pub fn new(png: Vec<u8>, garment: GarmentSelection) -> Self {
        Self {
            png,
            slot: DesignSlot::for_view(garment.view),
            garment,
        }
    }

    /// The PNG as a `data:image/png;base64,...` URL.
    pub fn data_url(&self) -> String {
        to_data_url("image/png", &self.png)
    }
}

impl fmt::Debug for DesignSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesignSubmission")
            .field("png_len", &self.png.len())
            .field("garment", &self.garment)
            .field("slot", &self.slot)
            .finish()
    }
}

/// Persistence contract for flattened designs.
///
/// Implementations must either store the submission completely or fail; a failed call leaves
/// nothing behind.
pub trait DesignStore {
    fn persist(&mut self, submission: &DesignSubmission) -> StudioResult<DesignRecordId>;
}

/// Hand `png` to `store`, mapping every failure to [`StudioError::Persistence`].
pub fn submit(
    store: &mut dyn DesignStore,
    png: Vec<u8>,
    garment: GarmentSelection,
) -> StudioResult<DesignRecordId> {
    if png.is_empty() {
        return Err(StudioError::persistence("refusing to persist an empty design"));
    }
    let submission = DesignSubmission::new(png, garment);
    let id = store.persist(&submission).map_err(|e| match e {
        StudioError::Persistence(_) => e,
        other => StudioError::persistence(other.to_string()),
    })?;
    tracing::info!(id = %id, garment = %garment, slot = submission.slot.column(), "design saved");
    Ok(id)
}

/// In-memory store for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryDesignStore {
    records: Vec<(DesignRecordId, DesignSubmission)>,
    reject: Option<String>,
}

impl InMemoryDesignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every call with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            reject: Some(reason.into()),
        }
    }

    /// Switch rejection on (`Some`) or off (`None`).
    pub fn set_rejecting(&mut self, reason: Option<String>) {
        self.reject = reason;
    }

    pub fn records(&self) -> &[(DesignRecordId, DesignSubmission)] {
        &self.records
    }
}

impl DesignStore for InMemoryDesignStore {
    fn persist(&mut self, submission: &DesignSubmission) -> StudioResult<DesignRecordId> {
        if let Some(reason) = &self.reject {
            return Err(StudioError::persistence(reason.clone()));
        }
        let id = DesignRecordId(format!("mem-{}", self.records.len() + 1));
        self.records.push((id.clone(), submission.clone()));
        Ok(id)
    }
}

/// Writes each design as `<uuid>.png` inside a directory.
#[derive(Clone, Debug)]
pub struct FsDesignStore {
    dir: PathBuf,
}

impl FsDesignStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a record id is stored at.
    pub fn path_for(&self, id: &DesignRecordId) -> PathBuf {
        self.dir.join(format!("{}.png", id.as_str()))
    }
}

impl DesignStore for FsDesignStore {
    fn persist(&mut self, submission: &DesignSubmission) -> StudioResult<DesignRecordId> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create design directory '{}'", self.dir.display()))
            .map_err(|e| StudioError::persistence(format!("{e:#}")))?;

        let id = DesignRecordId(uuid::Uuid::new_v4().to_string());
        let path = self.path_for(&id);
        if let Err(e) = std::fs::write(&path, &submission.png) {
            let _ = std::fs::remove_file(&path);
            return Err(StudioError::persistence(format!(
                "write design '{}': {e}",
                path.display()
            )));
        }
        Ok(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/store.rs"]
mod tests;
