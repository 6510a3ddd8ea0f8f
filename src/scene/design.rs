use serde::{Deserialize, Serialize};

use crate::catalog::garment::{GarmentColor, GarmentSelection, ProductType, ViewAngle};
use crate::scene::layer::{
    ApproxTextMeasure, ImageLayer, ImageSource, LayerLimits, LayerTransform, TextAlign,
    TextLayer, TextMeasure, TextStyle,
};

/// One immutable snapshot of an editable design: the garment plus at most one image layer and
/// one text layer.
///
/// Edits never mutate a snapshot; [`apply_edit`] always returns a new value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignState {
    pub garment: GarmentSelection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextLayer>,
}

impl DesignState {
    /// A design with no layers on the given garment.
    pub fn on(garment: GarmentSelection) -> Self {
        Self {
            garment,
            image: None,
            text: None,
        }
    }

    /// `true` when no layer would be drawn over the garment.
    pub fn is_blank(&self) -> bool {
        self.image.is_none() && self.text.is_none()
    }

    /// Apply `patch`, producing the next snapshot.
    pub fn apply(&self, patch: DesignPatch, cx: &EditContext<'_>) -> Self {
        apply_edit(self, patch, cx)
    }

    /// Re-apply layer invariants to a snapshot that came from outside the edit seam
    /// (for example a deserialized design document).
    pub fn sanitized(&self, cx: &EditContext<'_>) -> Self {
        let identity = LayerTransform::default();
        let image = self.image.as_ref().map(|l| {
            let pinned = LayerTransform {
                anchor: Some(l.placement.anchor),
                size: Some(l.size),
                opacity: Some(l.placement.opacity),
                rotation_deg: Some(l.placement.rotation_deg),
            };
            ImageLayer::new(l.source.clone()).transform(&pinned, &cx.limits)
        });
        let text = self.text.as_ref().and_then(|l| {
            let fresh = TextLayer::new(l.content.clone(), l.style.clone(), cx.measure)?;
            let pinned = LayerTransform {
                anchor: Some(l.placement.anchor),
                opacity: Some(l.placement.opacity),
                rotation_deg: Some(l.placement.rotation_deg),
                ..identity
            };
            Some(fresh.transform(&pinned))
        });
        Self {
            garment: self.garment,
            image,
            text,
        }
    }
}

/// Everything an edit needs besides the snapshot itself.
#[derive(Clone, Copy)]
pub struct EditContext<'a> {
    /// Size clamps for the current canvas.
    pub limits: LayerLimits,
    /// Metrics source used to size text layers.
    pub measure: &'a dyn TextMeasure,
}

impl<'a> EditContext<'a> {
    pub fn new(limits: LayerLimits, measure: &'a dyn TextMeasure) -> Self {
        Self { limits, measure }
    }
}

impl Default for EditContext<'static> {
    fn default() -> Self {
        Self {
            limits: LayerLimits::default(),
            measure: &ApproxTextMeasure,
        }
    }
}

impl std::fmt::Debug for EditContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditContext")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// A single user-visible edit.
#[derive(Clone, Debug, PartialEq)]
pub enum DesignPatch {
    /// Replace the whole garment selection.
    SetGarment(GarmentSelection),
    SetProduct(ProductType),
    SetColor(GarmentColor),
    SetView(ViewAngle),
    /// Replace the image layer with a fresh default-placed layer.
    SetImage(ImageSource),
    ClearImage,
    TransformImage(LayerTransform),
    /// Replace the text content and style. Blank content removes the text layer.
    ///
    /// An existing text layer keeps its placement.
    SetText { content: String, style: TextStyle },
    ClearText,
    TransformText(LayerTransform),
    SetTextStyle(TextStyle),
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    SetTextAlign(TextAlign),
    /// Remove both layers, keeping the garment.
    ClearDesign,
}

impl DesignPatch {
    /// `true` for patches that only change the garment.
    pub fn is_garment_change(&self) -> bool {
        matches!(
            self,
            Self::SetGarment(_) | Self::SetProduct(_) | Self::SetColor(_) | Self::SetView(_)
        )
    }
}

/// The single seam through which every edit flows.
///
/// Returns a brand-new snapshot; the caller decides whether to push it onto the history.
/// Patches addressing an absent layer leave the layers unchanged.
pub fn apply_edit(state: &DesignState, patch: DesignPatch, cx: &EditContext<'_>) -> DesignState {
    let mut next = state.clone();
    match patch {
        DesignPatch::SetGarment(g) => next.garment = g,
        DesignPatch::SetProduct(p) => next.garment = next.garment.with_product(p),
        DesignPatch::SetColor(c) => next.garment = next.garment.with_color(c),
        DesignPatch::SetView(v) => next.garment = next.garment.with_view(v),
        DesignPatch::SetImage(source) => next.image = Some(ImageLayer::new(source)),
        DesignPatch::ClearImage => next.image = None,
        DesignPatch::TransformImage(t) => {
            next.image = state.image.as_ref().map(|l| l.transform(&t, &cx.limits));
        }
        DesignPatch::SetText { content, style } => {
            next.text = match &state.text {
                Some(existing) => existing
                    .with_content(content, cx.measure)
                    .map(|l| l.restyle(style, cx.measure)),
                None => TextLayer::new(content, style, cx.measure),
            };
        }
        DesignPatch::ClearText => next.text = None,
        DesignPatch::TransformText(t) => {
            next.text = state.text.as_ref().map(|l| l.transform(&t));
        }
        DesignPatch::SetTextStyle(style) => {
            next.text = state.text.as_ref().map(|l| l.restyle(style, cx.measure));
        }
        DesignPatch::ToggleBold => {
            next.text = restyle_with(state, cx, |s| s.bold = !s.bold);
        }
        DesignPatch::ToggleItalic => {
            next.text = restyle_with(state, cx, |s| s.italic = !s.italic);
        }
        DesignPatch::ToggleUnderline => {
            next.text = restyle_with(state, cx, |s| s.underline = !s.underline);
        }
        DesignPatch::SetTextAlign(align) => {
            next.text = restyle_with(state, cx, |s| s.align = align);
        }
        DesignPatch::ClearDesign => {
            next.image = None;
            next.text = None;
        }
    }
    next
}

fn restyle_with(
    state: &DesignState,
    cx: &EditContext<'_>,
    f: impl FnOnce(&mut TextStyle),
) -> Option<TextLayer> {
    state.text.as_ref().map(|l| {
        let mut style = l.style.clone();
        f(&mut style);
        l.restyle(style, cx.measure)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/design.rs"]
mod tests;
