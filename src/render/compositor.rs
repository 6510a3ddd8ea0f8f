use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::assets::decode::{PreparedImage, decode_image, looks_like_svg, parse_svg};
use crate::assets::fonts::{FontBook, ShapedText};
use crate::assets::loader::AssetSource;
use crate::assets::svg_raster::rasterize_svg_to_premul_rgba8;
use crate::catalog::garment::GarmentSelection;
use crate::catalog::table::{GarmentCatalog, ImageReference};
use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::foundation::error::{StudioError, StudioResult};
use crate::render::raster::RasterImage;
use crate::scene::design::DesignState;
use crate::scene::layer::{ImageLayer, ImageSource, Placement, TextLayer};

/// Something the compositor had to leave out or substitute while rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderWarning {
    /// The garment's own base image failed to load; the catalog default was drawn instead.
    BaseImageFallback {
        garment: GarmentSelection,
        reference: ImageReference,
        reason: String,
    },
    /// No base image could be loaded; layers were drawn onto a transparent canvas.
    BaseImageMissing { reference: ImageReference, reason: String },
    /// The uploaded image could not be decoded and was skipped.
    ImageLayerSkipped { reason: String },
    /// No usable font was found for the text layer; it was skipped.
    TextLayerSkipped { reason: String },
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BaseImageFallback {
                garment,
                reference,
                reason,
            } => write!(
                f,
                "base image '{reference}' for {garment} unavailable ({reason}); using default"
            ),
            Self::BaseImageMissing { reference, reason } => write!(
                f,
                "base image '{reference}' unavailable ({reason}); rendering on transparent canvas"
            ),
            Self::ImageLayerSkipped { reason } => write!(f, "image layer skipped: {reason}"),
            Self::TextLayerSkipped { reason } => write!(f, "text layer skipped: {reason}"),
        }
    }
}

/// Non-blocking diagnostics for one render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub warnings: Vec<RenderWarning>,
}

impl RenderReport {
    /// `true` when every requested element was drawn as asked.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn push(&mut self, w: RenderWarning) {
        tracing::warn!(warning = %w, "degraded render");
        self.warnings.push(w);
    }
}

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct BaseKey {
    reference: ImageReference,
    w: u32,
    h: u32,
}

/// Draws a [`DesignState`] onto a canvas: base garment, then image layer, then text layer.
///
/// Rendering reads the snapshot only. Decoded assets are cached per reference/content so
/// repeated renders of the same snapshot are cheap and produce identical pixels.
pub struct Compositor {
    catalog: GarmentCatalog,
    assets: Box<dyn AssetSource>,
    fonts: FontBook,
    base_cache: HashMap<BaseKey, ImagePaint>,
    upload_cache: HashMap<u64, Result<ImagePaint, String>>,
}

impl Compositor {
    pub fn new(
        catalog: GarmentCatalog,
        assets: impl AssetSource + 'static,
        fonts: FontBook,
    ) -> Self {
        Self {
            catalog,
            assets: Box::new(assets),
            fonts,
            base_cache: HashMap::new(),
            upload_cache: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &GarmentCatalog {
        &self.catalog
    }

    /// Font book used for drawing; also the [`crate::scene::layer::TextMeasure`] to edit with.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Drop every cached decode.
    pub fn clear_caches(&mut self) {
        self.base_cache.clear();
        self.upload_cache.clear();
    }

    /// Render `state` at `canvas` size, discarding warnings.
    pub fn render(&mut self, state: &DesignState, canvas: Canvas) -> StudioResult<RasterImage> {
        self.render_with_report(state, canvas).map(|(raster, _)| raster)
    }

    /// Render `state` and report everything that had to be skipped or substituted.
    ///
    /// Only an invalid canvas is an error; asset and decode problems degrade the output.
    #[tracing::instrument(
        skip_all,
        fields(garment = %state.garment, width = canvas.width, height = canvas.height)
    )]
    pub fn render_with_report(
        &mut self,
        state: &DesignState,
        canvas: Canvas,
    ) -> StudioResult<(RasterImage, RenderReport)> {
        let canvas = Canvas::new(canvas.width, canvas.height)?;
        let w = u16::try_from(canvas.width)
            .map_err(|_| StudioError::validation("canvas width exceeds u16"))?;
        let h = u16::try_from(canvas.height)
            .map_err(|_| StudioError::validation("canvas height exceeds u16"))?;

        let mut report = RenderReport::default();
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        if let Some(base) = self.base_paint(state.garment, canvas, &mut report) {
            draw_stretched(&mut ctx, &base, canvas);
        }
        if let Some(layer) = &state.image {
            match self.upload_paint(&layer.source) {
                Ok(paint) => draw_image_layer(&mut ctx, layer, &paint, canvas),
                Err(reason) => report.push(RenderWarning::ImageLayerSkipped { reason }),
            }
        }
        if let Some(layer) = &state.text {
            match self.fonts.shape(&layer.content, &layer.style) {
                Ok(shaped) => draw_text_layer(&mut ctx, layer, &shaped, canvas),
                Err(e) => report.push(RenderWarning::TextLayerSkipped {
                    reason: e.to_string(),
                }),
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        let raster = RasterImage {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        };
        Ok((raster, report))
    }

    fn base_paint(
        &mut self,
        garment: GarmentSelection,
        canvas: Canvas,
        report: &mut RenderReport,
    ) -> Option<ImagePaint> {
        let reference = self.catalog.resolve(&garment).clone();
        let err = match self.load_base(&reference, canvas) {
            Ok(p) => return Some(p),
            Err(e) => e,
        };

        let default_ref = self.catalog.default_reference().clone();
        if default_ref == reference {
            report.push(RenderWarning::BaseImageMissing {
                reference,
                reason: err.to_string(),
            });
            return None;
        }
        report.push(RenderWarning::BaseImageFallback {
            garment,
            reference,
            reason: err.to_string(),
        });
        match self.load_base(&default_ref, canvas) {
            Ok(p) => Some(p),
            Err(e) => {
                report.push(RenderWarning::BaseImageMissing {
                    reference: default_ref,
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn load_base(
        &mut self,
        reference: &ImageReference,
        canvas: Canvas,
    ) -> StudioResult<ImagePaint> {
        let key = BaseKey {
            reference: reference.clone(),
            w: canvas.width,
            h: canvas.height,
        };
        if let Some(p) = self.base_cache.get(&key) {
            return Ok(p.clone());
        }
        let bytes = self.assets.read(reference)?;
        let paint = if looks_like_svg(&bytes) {
            let svg = parse_svg(&bytes, Some(self.fonts.database()))?;
            let rgba = rasterize_svg_to_premul_rgba8(&svg.tree, canvas.width, canvas.height)?;
            image_paint(&rgba, canvas.width, canvas.height)?
        } else {
            let prepared = decode_image(&bytes)?;
            prepared_paint(&prepared)?
        };
        self.base_cache.insert(key, paint.clone());
        Ok(paint)
    }

    fn upload_paint(&mut self, source: &ImageSource) -> Result<ImagePaint, String> {
        if let Some(hit) = self.upload_cache.get(&source.digest()) {
            return hit.clone();
        }
        let out = decode_image(source.bytes())
            .and_then(|p| prepared_paint(&p))
            .map_err(|e| e.to_string());
        self.upload_cache.insert(source.digest(), out.clone());
        out
    }
}

impl fmt::Debug for Compositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compositor")
            .field("catalog_entries", &self.catalog.len())
            .field("fonts", &self.fonts)
            .field("cached_bases", &self.base_cache.len())
            .field("cached_uploads", &self.upload_cache.len())
            .finish_non_exhaustive()
    }
}

/// Translate to the anchor and rotate; the layer is then drawn around the origin.
fn placement_transform(placement: &Placement, canvas: Canvas) -> Affine {
    let center = canvas.percent_to_px(placement.anchor.x, placement.anchor.y);
    Affine::translate(center.to_vec2())
        * Affine::rotate(placement.effective_rotation_deg().to_radians())
}

fn draw_stretched(ctx: &mut vello_cpu::RenderContext, p: &ImagePaint, canvas: Canvas) {
    let sx = f64::from(canvas.width) / f64::from(p.w);
    let sy = f64::from(canvas.height) / f64::from(p.h);
    ctx.set_transform(affine_to_cpu(Affine::scale_non_uniform(sx, sy)));
    ctx.set_paint(p.paint.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(p.w),
        f64::from(p.h),
    ));
}

fn draw_image_layer(
    ctx: &mut vello_cpu::RenderContext,
    layer: &ImageLayer,
    p: &ImagePaint,
    canvas: Canvas,
) {
    let (w, h) = (layer.size.width, layer.size.height);
    let tr = placement_transform(&layer.placement, canvas)
        * Affine::translate(Vec2::new(-w / 2.0, -h / 2.0))
        * Affine::scale_non_uniform(w / f64::from(p.w), h / f64::from(p.h));
    let opacity = layer.placement.opacity;

    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(p.paint.clone());
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(p.w),
        f64::from(p.h),
    ));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn draw_text_layer(
    ctx: &mut vello_cpu::RenderContext,
    layer: &TextLayer,
    shaped: &ShapedText,
    canvas: Canvas,
) {
    let origin = placement_transform(&layer.placement, canvas);
    let x0 = layer.style.align.start_offset(shaped.width);
    // Lines are laid out from y = 0 down; shift so the line box is centered on the anchor.
    let text_tr = origin * Affine::translate(Vec2::new(x0, -shaped.height / 2.0));
    let opacity = layer.placement.opacity;

    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }

    ctx.set_transform(affine_to_cpu(text_tr));
    for line in shaped.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            let mut x = run.offset();
            let y = run.baseline();
            let glyphs: Vec<vello_cpu::Glyph> = run
                .glyphs()
                .map(|g| {
                    let gx = x + g.x;
                    let gy = y - g.y;
                    x += g.advance;
                    vello_cpu::Glyph {
                        id: g.id,
                        x: gx,
                        y: gy,
                    }
                })
                .collect();
            ctx.glyph_run(shaped.font.font_data())
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs.into_iter());
        }
    }

    if layer.style.underline {
        let c = layer.style.color;
        let y = f64::from(layer.style.font_size_px) / 2.0 + 2.0;
        ctx.set_transform(affine_to_cpu(origin));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            x0,
            y - 0.5,
            x0 + shaped.width,
            y + 0.5,
        ));
    }

    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn prepared_paint(prepared: &PreparedImage) -> StudioResult<ImagePaint> {
    image_paint(&prepared.rgba8_premul, prepared.width, prepared.height)
}

fn image_paint(bytes_premul: &[u8], width: u32, height: u32) -> StudioResult<ImagePaint> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(ImagePaint {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        w: width,
        h: height,
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StudioResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StudioError::layer_decode("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StudioError::layer_decode("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StudioError::layer_decode("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
