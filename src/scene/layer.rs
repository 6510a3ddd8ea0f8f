use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Rgba8;
use crate::foundation::core::Canvas;
use crate::foundation::math::{clamp_unit, fnv1a64, normalize_degrees};

/// Position of a layer's center as a percentage of canvas width/height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Horizontal position in `[0, 100]`.
    pub x: f64,
    /// Vertical position in `[0, 100]`.
    pub y: f64,
}

impl Anchor {
    /// Canvas center.
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    /// Build an anchor, clamping both axes into `[0, 100]`.
    ///
    /// Non-finite components fall back to the center.
    pub fn new(x: f64, y: f64) -> Self {
        fn axis(v: f64) -> f64 {
            if v.is_finite() { v.clamp(0.0, 100.0) } else { 50.0 }
        }
        Self {
            x: axis(x),
            y: axis(y),
        }
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Width/height of a layer in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSize {
    pub width: f64,
    pub height: f64,
}

impl LayerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Size bounds applied whenever a layer is resized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerLimits {
    /// Smallest allowed width/height.
    pub min_size_px: f64,
    /// Largest allowed width/height.
    pub max_size_px: f64,
}

impl LayerLimits {
    /// Default minimum side length.
    pub const DEFAULT_MIN_SIZE_PX: f64 = 10.0;
    /// Default maximum, as a multiple of the larger canvas side.
    pub const DEFAULT_MAX_FACTOR: f64 = 4.0;

    /// Limits for `canvas`: `max = factor * max(width, height)`.
    pub fn for_canvas(canvas: Canvas, min_size_px: f64, max_factor: f64) -> Self {
        let min_size_px = if min_size_px.is_finite() {
            min_size_px.max(1.0)
        } else {
            Self::DEFAULT_MIN_SIZE_PX
        };
        let factor = if max_factor.is_finite() && max_factor > 0.0 {
            max_factor
        } else {
            Self::DEFAULT_MAX_FACTOR
        };
        let max_size_px = (factor * f64::from(canvas.max_side())).max(min_size_px);
        Self {
            min_size_px,
            max_size_px,
        }
    }

    fn clamp_side(&self, v: f64, previous: f64) -> f64 {
        if !v.is_finite() {
            return previous;
        }
        v.clamp(self.min_size_px, self.max_size_px)
    }

    /// Clamp both sides, keeping `previous` for non-finite input.
    pub fn clamp_size(&self, size: LayerSize, previous: LayerSize) -> LayerSize {
        LayerSize {
            width: self.clamp_side(size.width, previous.width),
            height: self.clamp_side(size.height, previous.height),
        }
    }
}

impl Default for LayerLimits {
    fn default() -> Self {
        Self::for_canvas(
            Canvas::default(),
            Self::DEFAULT_MIN_SIZE_PX,
            Self::DEFAULT_MAX_FACTOR,
        )
    }
}

/// Partial override of a layer's geometric/visual properties.
///
/// `None` fields are carried over unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerTransform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<LayerSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_deg: Option<f64>,
}

impl LayerTransform {
    pub fn anchor(mut self, x: f64, y: f64) -> Self {
        self.anchor = Some(Anchor { x, y });
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(LayerSize { width, height });
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn rotation(mut self, deg: f64) -> Self {
        self.rotation_deg = Some(deg);
        self
    }

    /// `true` when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.anchor.is_none()
            && self.size.is_none()
            && self.opacity.is_none()
            && self.rotation_deg.is_none()
    }
}

/// Placement shared by both layer kinds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub anchor: Anchor,
    /// Global alpha multiplier in `[0, 1]`.
    pub opacity: f32,
    /// Rotation as entered by the user; see [`Placement::effective_rotation_deg`].
    pub rotation_deg: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            anchor: Anchor::CENTER,
            opacity: 1.0,
            rotation_deg: 0.0,
        }
    }
}

impl Placement {
    /// Rotation reduced into `[0, 360)`. This is the only angle the compositor sees.
    pub fn effective_rotation_deg(&self) -> f64 {
        normalize_degrees(self.rotation_deg)
    }

    fn apply(&self, t: &LayerTransform) -> Self {
        let anchor = t
            .anchor
            .map(|a| Anchor::new(a.x, a.y))
            .unwrap_or(self.anchor);
        let opacity = t
            .opacity
            .and_then(clamp_unit)
            .unwrap_or(self.opacity);
        let rotation_deg = t
            .rotation_deg
            .filter(|r| r.is_finite())
            .unwrap_or(self.rotation_deg);
        Self {
            anchor,
            opacity,
            rotation_deg,
        }
    }
}

/// Encoded raster payload uploaded by the user (PNG/JPEG bytes).
///
/// Cloning is cheap; the bytes are shared. Decoding happens at render time so a corrupt
/// payload only ever costs the layer, never the edit.
#[derive(Clone)]
pub struct ImageSource {
    bytes: Arc<[u8]>,
    digest: u64,
}

impl ImageSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        let digest = fnv1a64(&bytes);
        Self {
            bytes: bytes.into(),
            digest,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content digest used as a decode-cache key.
    pub fn digest(&self) -> u64 {
        self.digest
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for ImageSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
            || (self.digest == other.digest && self.bytes == other.bytes)
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSource")
            .field("len", &self.bytes.len())
            .field("digest", &format_args!("{:016x}", self.digest))
            .finish()
    }
}

impl Serialize for ImageSource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mime = crate::encode::data_url::sniff_mime(&self.bytes);
        serializer.serialize_str(&crate::encode::data_url::to_data_url(mime, &self.bytes))
    }
}

impl<'de> Deserialize<'de> for ImageSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = crate::encode::data_url::from_data_url(&s).map_err(serde::de::Error::custom)?;
        Ok(Self::new(bytes))
    }
}

/// The uploaded-image layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    pub source: ImageSource,
    pub size: LayerSize,
    #[serde(flatten)]
    pub placement: Placement,
}

impl ImageLayer {
    /// Default drawn size for a freshly uploaded image.
    pub const DEFAULT_SIZE: LayerSize = LayerSize {
        width: 200.0,
        height: 200.0,
    };

    /// A new layer centered on the canvas at 200x200, fully opaque, unrotated.
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            size: Self::DEFAULT_SIZE,
            placement: Placement::default(),
        }
    }

    /// Copy of this layer with `t` applied and clamped to `limits`.
    pub fn transform(&self, t: &LayerTransform, limits: &LayerLimits) -> Self {
        let size = t
            .size
            .map(|s| limits.clamp_size(s, self.size))
            .unwrap_or(self.size);
        Self {
            source: self.source.clone(),
            size,
            placement: self.placement.apply(t),
        }
    }
}

/// Horizontal placement of text relative to its anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Text starts at the anchor.
    Left,
    /// Text is centered on the anchor.
    #[default]
    Center,
    /// Text ends at the anchor.
    Right,
}

impl TextAlign {
    /// Horizontal offset of the text start from the anchor, given the text width.
    pub fn start_offset(self, width: f64) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => -width / 2.0,
            Self::Right => -width,
        }
    }
}

/// Font and decoration settings for the text layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size_px: f32,
    pub color: Rgba8,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub align: TextAlign,
}

impl TextStyle {
    pub const MIN_FONT_SIZE_PX: f32 = 1.0;
    pub const MAX_FONT_SIZE_PX: f32 = 512.0;

    /// Copy with the font size clamped into the supported range.
    pub fn sanitized(mut self) -> Self {
        self.font_size_px = if self.font_size_px.is_finite() {
            self.font_size_px
                .clamp(Self::MIN_FONT_SIZE_PX, Self::MAX_FONT_SIZE_PX)
        } else {
            Self::default().font_size_px
        };
        self
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size_px: 24.0,
            color: Rgba8::BLACK,
            bold: false,
            italic: false,
            underline: false,
            align: TextAlign::Center,
        }
    }
}

/// Source of text metrics used to size a text layer.
pub trait TextMeasure {
    /// Width of `content` and line height, in pixels, when set in `style`.
    fn measure(&self, content: &str, style: &TextStyle) -> LayerSize;
}

/// Font-free metrics estimate: 0.6 em per character, 1.2 em line height.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn measure(&self, content: &str, style: &TextStyle) -> LayerSize {
        let em = f64::from(style.font_size_px);
        let advance = if style.bold { 0.65 } else { 0.6 };
        LayerSize {
            width: content.chars().count() as f64 * em * advance,
            height: em * 1.2,
        }
    }
}

/// The single styled text run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub content: String,
    pub style: TextStyle,
    #[serde(flatten)]
    pub placement: Placement,
    /// Measured extent of the run; used for selection bounds, not for drawing.
    pub extent: LayerSize,
}

impl TextLayer {
    /// A new centered text layer, or `None` when `content` has nothing to draw.
    pub fn new(content: impl Into<String>, style: TextStyle, measure: &dyn TextMeasure) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return None;
        }
        let style = style.sanitized();
        let extent = measure.measure(&content, &style);
        Some(Self {
            content,
            style,
            placement: Placement::default(),
            extent,
        })
    }

    /// Copy of this layer with `t` applied.
    ///
    /// Text is sized by its font, so `t.size` is ignored.
    pub fn transform(&self, t: &LayerTransform) -> Self {
        Self {
            placement: self.placement.apply(t),
            ..self.clone()
        }
    }

    /// Copy with a new style, re-measured.
    pub fn restyle(&self, style: TextStyle, measure: &dyn TextMeasure) -> Self {
        let style = style.sanitized();
        let extent = measure.measure(&self.content, &style);
        Self {
            style,
            extent,
            ..self.clone()
        }
    }

    /// Copy with new content, keeping placement and style. `None` when the content is blank.
    pub fn with_content(&self, content: impl Into<String>, measure: &dyn TextMeasure) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return None;
        }
        let extent = measure.measure(&content, &self.style);
        Some(Self {
            content,
            extent,
            ..self.clone()
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;
