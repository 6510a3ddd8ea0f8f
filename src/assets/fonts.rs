use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use usvg::fontdb;

use crate::foundation::color::Rgba8;
use crate::foundation::error::{StudioError, StudioResult};
use crate::scene::layer::{ApproxTextMeasure, LayerSize, TextMeasure, TextStyle};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// One concrete font face picked for a text style.
#[derive(Clone)]
pub struct ResolvedFont {
    id: fontdb::ID,
    family: String,
    bold: bool,
    italic: bool,
    bytes: Arc<Vec<u8>>,
    font: vello_cpu::peniko::FontData,
}

impl ResolvedFont {
    /// Family name as reported by the face itself.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub(crate) fn font_data(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("family", &self.family)
            .field("bold", &self.bold)
            .field("italic", &self.italic)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A single shaped line of text, ready to be drawn.
pub struct ShapedText {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    pub(crate) font: ResolvedFont,
    /// Advance width of the line in pixels.
    pub width: f64,
    /// Line height in pixels.
    pub height: f64,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<fontdb::ID, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            // Only faces registered through `family_for`, so shaping and drawing share one face.
            font_ctx: parley::FontContext {
                collection: parley::fontique::Collection::new(parley::fontique::CollectionOptions {
                    shared: false,
                    system_fonts: false,
                }),
                source_cache: parley::fontique::SourceCache::default(),
            },
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    /// Register `font` with the layout collection once, returning the family name to request.
    fn family_for(&mut self, font: &ResolvedFont) -> StudioResult<String> {
        if let Some(name) = self.registered.get(&font.id) {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.to_vec()), None);
        let mut names = Vec::with_capacity(families.len());
        for (id, _) in &families {
            if let Some(name) = self.font_ctx.collection.family_name(*id) {
                names.push(name.to_string());
            }
        }
        let name = names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(&font.family))
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| {
                StudioError::layer_decode("no font families registered from font bytes")
            })?;
        self.registered.insert(font.id, name.clone());
        Ok(name)
    }

    /// Shape `text` as a single unwrapped line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> StudioResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StudioError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(if font.bold {
            parley::style::FontWeight::BOLD
        } else {
            parley::style::FontWeight::NORMAL
        }));
        builder.push_default(parley::style::StyleProperty::FontStyle(if font.italic {
            parley::style::FontStyle::Italic
        } else {
            parley::style::FontStyle::Normal
        }));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FaceQuery {
    family: String,
    bold: bool,
    italic: bool,
}

/// Font lookup and text shaping backed by the system font database plus extra directories.
///
/// Doubles as the font-accurate [`TextMeasure`]; when no face can be found it falls back to
/// [`ApproxTextMeasure`].
pub struct FontBook {
    db: Arc<fontdb::Database>,
    faces: RefCell<HashMap<FaceQuery, Option<ResolvedFont>>>,
    engine: RefCell<TextLayoutEngine>,
}

impl FontBook {
    /// A book over an explicit database.
    pub fn from_database(db: fontdb::Database) -> Self {
        Self {
            db: Arc::new(db),
            faces: RefCell::new(HashMap::new()),
            engine: RefCell::new(TextLayoutEngine::new()),
        }
    }

    /// A book with no faces at all; every text layer measures approximately and is never drawn.
    pub fn empty() -> Self {
        Self::from_database(fontdb::Database::new())
    }

    /// System fonts plus every `.ttf`/`.otf`/`.ttc` directly inside `dirs`.
    pub fn with_dirs<P: AsRef<Path>>(dirs: &[P]) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self::load_dirs(db, dirs)
    }

    /// Only the fonts directly inside `dirs`; system fonts are not consulted.
    pub fn from_dirs<P: AsRef<Path>>(dirs: &[P]) -> Self {
        Self::load_dirs(fontdb::Database::new(), dirs)
    }

    fn load_dirs<P: AsRef<Path>>(mut db: fontdb::Database, dirs: &[P]) -> Self {
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir.as_ref());
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self::from_database(db)
    }

    /// System fonts only.
    pub fn system() -> Self {
        Self::with_dirs::<PathBuf>(&[])
    }

    /// Shared font database, also handed to the SVG parser.
    pub fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.db)
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }

    /// Pick the face for `family` at the requested weight/slant.
    ///
    /// Unknown families fall back to the generic sans-serif family, then to the first installed
    /// family that has a face with the requested weight and slant. Weight and slant are honored
    /// whenever any installed family can provide them.
    pub fn resolve(&self, family: &str, bold: bool, italic: bool) -> StudioResult<ResolvedFont> {
        let key = FaceQuery {
            family: family.to_string(),
            bold,
            italic,
        };
        let cached = self.faces.borrow().get(&key).cloned();
        let found = match cached {
            Some(hit) => hit,
            None => {
                let found = self.lookup(&key);
                self.faces.borrow_mut().insert(key, found.clone());
                found
            }
        };
        found.ok_or_else(|| StudioError::asset_resolution(format!("no font face for '{family}'")))
    }

    fn lookup(&self, key: &FaceQuery) -> Option<ResolvedFont> {
        let id = self
            .query_face(fontdb::Family::Name(&key.family), key)
            .or_else(|| self.query_face(fontdb::Family::SansSerif, key))
            .or_else(|| self.fallback_face(key))?;
        self.load_face(id, key)
    }

    /// Closest face to `key`'s weight and slant within one family.
    fn query_face(&self, family: fontdb::Family<'_>, key: &FaceQuery) -> Option<fontdb::ID> {
        let families = [family];
        self.db.query(&fontdb::Query {
            families: &families,
            weight: if key.bold {
                fontdb::Weight::BOLD
            } else {
                fontdb::Weight::NORMAL
            },
            stretch: fontdb::Stretch::Normal,
            style: if key.italic {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        })
    }

    /// Best face among installed families, in database order, preferring one that has the
    /// requested weight and slant.
    fn fallback_face(&self, key: &FaceQuery) -> Option<fontdb::ID> {
        let mut seen: Vec<&str> = Vec::new();
        let mut first = None;
        for face in self.db.faces() {
            let Some((name, _)) = face.families.first() else {
                continue;
            };
            if seen.contains(&name.as_str()) {
                continue;
            }
            seen.push(name);
            let Some(id) = self.query_face(fontdb::Family::Name(name), key) else {
                continue;
            };
            let Some(info) = self.db.face(id) else {
                continue;
            };
            if face_is_bold(info) == key.bold && face_is_italic(info) == key.italic {
                return Some(id);
            }
            first.get_or_insert(id);
        }
        first
    }

    fn load_face(&self, id: fontdb::ID, key: &FaceQuery) -> Option<ResolvedFont> {
        let info = self.db.face(id)?;
        let family = info
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| key.family.clone());
        let bold = face_is_bold(info);
        let italic = face_is_italic(info);
        let (bytes, index) = self.db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        if family != key.family {
            tracing::debug!(
                requested = %key.family,
                used = %family,
                bold,
                italic,
                "font family substituted"
            );
        }
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.clone()),
            index,
        );
        Some(ResolvedFont {
            id,
            family,
            bold,
            italic,
            bytes: Arc::new(bytes),
            font,
        })
    }

    /// Shape `content` in `style` as one line.
    pub fn shape(&self, content: &str, style: &TextStyle) -> StudioResult<ShapedText> {
        let font = self.resolve(&style.font_family, style.bold, style.italic)?;
        let layout = self.engine.borrow_mut().layout_line(
            content,
            &font,
            style.font_size_px,
            TextBrushRgba8::from(style.color),
        )?;
        let width = f64::from(layout.width());
        let height = f64::from(layout.height());
        Ok(ShapedText {
            layout,
            font,
            width,
            height,
        })
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .finish_non_exhaustive()
    }
}

impl TextMeasure for FontBook {
    fn measure(&self, content: &str, style: &TextStyle) -> LayerSize {
        match self.shape(content, style) {
            Ok(shaped) => LayerSize::new(shaped.width, shaped.height),
            Err(_) => ApproxTextMeasure.measure(content, style),
        }
    }
}

fn face_is_bold(info: &fontdb::FaceInfo) -> bool {
    info.weight.0 >= 600
}

fn face_is_italic(info: &fontdb::FaceInfo) -> bool {
    info.style != fontdb::Style::Normal
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    // Stable face order for fallback selection.
    let mut paths: Vec<PathBuf> = rd.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to load font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
