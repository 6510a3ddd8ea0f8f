use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::garment::{GarmentColor, GarmentSelection, ProductType, ViewAngle};
use crate::foundation::error::{StudioError, StudioResult};

/// Reference to a garment base image (relative file path or URL).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(pub String);

impl ImageReference {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for `http://` / `https://` references.
    pub fn is_url(&self) -> bool {
        let s = self.0.trim_start();
        s.starts_with("http://") || s.starts_with("https://")
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lookup table from garment selection to base-image reference.
///
/// Resolution is total: selections missing from the table yield the default reference, which
/// is the one registered for (t-shirt, black, front).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GarmentCatalog {
    default_ref: ImageReference,
    entries: BTreeMap<GarmentSelection, ImageReference>,
}

#[derive(Serialize, Deserialize)]
struct CatalogEntryDef {
    product: ProductType,
    color: GarmentColor,
    view: ViewAngle,
    image: ImageReference,
}

#[derive(Serialize, Deserialize)]
struct CatalogDef {
    default: ImageReference,
    #[serde(default)]
    entries: Vec<CatalogEntryDef>,
}

impl GarmentCatalog {
    /// An empty catalog that resolves everything to `default_ref`.
    pub fn new(default_ref: ImageReference) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(GarmentSelection::default(), default_ref.clone());
        Self {
            default_ref,
            entries,
        }
    }

    /// The storefront's shipped asset table.
    ///
    /// Only t-shirt photography exists; other product lines fall back to the default image.
    pub fn builtin() -> Self {
        use GarmentColor as C;
        use ViewAngle as V;

        let mut out = Self::new(ImageReference::new("images/black t-shirts/black-front.jpg"));

        let folder_sets: [(C, [&str; 4]); 6] = [
            (
                C::Black,
                [
                    "images/black t-shirts/black-front.jpg",
                    "images/black t-shirts/behind.jpg",
                    "images/black t-shirts/left.jpg",
                    "images/black t-shirts/right.jpg",
                ],
            ),
            (
                C::White,
                [
                    "images/white t-shirts/front.jpg",
                    "images/white t-shirts/behind.jpg",
                    "images/white t-shirts/left.jpg",
                    "images/white t-shirts/right.jpg",
                ],
            ),
            (
                C::Red,
                [
                    "images/red t-shirts/front.jpg",
                    "images/red t-shirts/back.jpg",
                    "images/red t-shirts/left.jpg",
                    "images/red t-shirts/right.jpg",
                ],
            ),
            (
                C::Blue,
                [
                    "images/bleu t-shirts/front.jpg",
                    "images/bleu t-shirts/back.jpg",
                    "images/bleu t-shirts/left.jpg",
                    "images/bleu t-shirts/right.jpg",
                ],
            ),
            (
                C::Green,
                [
                    "images/green t-shirts/front.jpg",
                    "images/green t-shirts/behind.jpg",
                    "images/green t-shirts/left.jpg",
                    "images/green t-shirts/right.jpg",
                ],
            ),
            (
                C::Gray,
                [
                    "images/grey t-shirts/front.jpg",
                    "images/grey t-shirts/behind.jpg",
                    "images/grey t-shirts/left.jpg",
                    "images/grey t-shirts/right.jpg",
                ],
            ),
        ];
        for (color, paths) in folder_sets {
            for (view, path) in V::ALL.into_iter().zip(paths) {
                out.insert(
                    GarmentSelection::new(ProductType::TShirt, color, view),
                    ImageReference::new(path),
                );
            }
        }

        for (color, stem) in [(C::Yellow, "yellow"), (C::Pink, "pink")] {
            for view in V::ALL {
                out.insert(
                    GarmentSelection::new(ProductType::TShirt, color, view),
                    ImageReference::new(format!("images/{stem}-{}.jpg", view.as_str())),
                );
            }
        }

        out
    }

    /// Register (or replace) the reference for `selection`.
    ///
    /// Registering the default selection also replaces the fallback reference.
    pub fn insert(&mut self, selection: GarmentSelection, reference: ImageReference) {
        if selection == GarmentSelection::default() {
            self.default_ref = reference.clone();
        }
        self.entries.insert(selection, reference);
    }

    /// Resolve a selection, falling back to the default reference. Never fails.
    pub fn resolve(&self, selection: &GarmentSelection) -> &ImageReference {
        match self.entries.get(selection) {
            Some(r) => r,
            None => {
                tracing::debug!(%selection, fallback = %self.default_ref, "garment not in catalog");
                &self.default_ref
            }
        }
    }

    /// Strict variant of [`GarmentCatalog::resolve`] that reports missing selections.
    pub fn try_resolve(&self, selection: &GarmentSelection) -> StudioResult<&ImageReference> {
        self.entries.get(selection).ok_or_else(|| {
            StudioError::asset_resolution(format!("no catalog entry for {selection}"))
        })
    }

    /// The fallback reference.
    pub fn default_reference(&self) -> &ImageReference {
        &self.default_ref
    }

    /// Number of explicit entries (including the default selection).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in selection order.
    pub fn iter(&self) -> impl Iterator<Item = (&GarmentSelection, &ImageReference)> {
        self.entries.iter()
    }
}

impl Default for GarmentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Serialize for GarmentCatalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let def = CatalogDef {
            default: self.default_ref.clone(),
            entries: self
                .entries
                .iter()
                .map(|(sel, image)| CatalogEntryDef {
                    product: sel.product,
                    color: sel.color,
                    view: sel.view,
                    image: image.clone(),
                })
                .collect(),
        };
        def.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GarmentCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let def = CatalogDef::deserialize(deserializer)?;
        let mut out = Self::new(def.default);
        for e in def.entries {
            out.insert(GarmentSelection::new(e.product, e.color, e.view), e.image);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/table.rs"]
mod tests;
