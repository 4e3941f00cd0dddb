use std::sync::Arc;

use crate::{
    assets::decode::PreparedFrame,
    foundation::{
        core::{Affine, BackingSize},
        error::{FilmrollError, FilmrollResult},
        math::over_opaque,
    },
};

/// Read-back of the canvas contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA of pixel `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Composite the canvas at `opacity` over an opaque page color.
    ///
    /// The result is straight-alpha and fully opaque, ready for PNG encoding.
    pub fn flatten_over(&self, bg_rgba: [u8; 4], opacity: f64) -> FrameRGBA {
        let bg = [bg_rgba[0], bg_rgba[1], bg_rgba[2]];
        let mut data = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            data.extend_from_slice(&over_opaque([px[0], px[1], px[2], px[3]], opacity as f32, bg));
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }
}

/// Work counters for a canvas. A resize discards the canvas contents, so callers keep
/// `resizes` as low as possible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CanvasStats {
    pub resizes: u64,
    pub clears: u64,
    pub draws: u64,
}

/// A 2D drawing surface with a device-pixel backing store.
pub trait Canvas2d {
    fn backing_size(&self) -> BackingSize;

    /// Reallocate the backing store. Contents are discarded, even when the size is
    /// unchanged.
    fn resize(&mut self, size: BackingSize) -> FilmrollResult<()>;

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Draw `frame` with the image-to-canvas `transform`.
    fn draw_frame(&mut self, frame: &PreparedFrame, transform: Affine) -> FilmrollResult<()>;

    fn snapshot(&self) -> FrameRGBA;

    fn stats(&self) -> CanvasStats;
}

/// Which drawing surface the host can provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasKind {
    /// CPU raster canvas.
    Cpu,
    /// Host has no 2D drawing support.
    Unavailable,
}

/// Acquire a drawing surface of `kind`.
pub fn create_canvas(kind: CanvasKind) -> FilmrollResult<Box<dyn Canvas2d>> {
    match kind {
        CanvasKind::Cpu => Ok(Box::new(CpuCanvas::new())),
        CanvasKind::Unavailable => Err(FilmrollError::render(
            "no 2D drawing context is available",
        )),
    }
}

struct CachedPaint {
    source: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

/// [`Canvas2d`] backed by a `vello_cpu` pixmap.
///
/// A zero-sized canvas holds no pixmap; drawing on it is a no-op.
pub struct CpuCanvas {
    size: BackingSize,
    surface: Option<CpuSurface>,
    ctx: Option<vello_cpu::RenderContext>,
    last_paint: Option<CachedPaint>,
    stats: CanvasStats,
}

impl Default for CpuCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuCanvas {
    pub fn new() -> Self {
        Self {
            size: BackingSize::default(),
            surface: None,
            ctx: None,
            last_paint: None,
            stats: CanvasStats::default(),
        }
    }

    /// Converting a frame to a paint is a full copy; repaints of the same frame reuse it.
    fn paint_for(&mut self, frame: &PreparedFrame) -> FilmrollResult<vello_cpu::Image> {
        if let Some(cached) = &self.last_paint
            && Arc::ptr_eq(&cached.source, &frame.rgba8_premul)
            && cached.width == frame.width
            && cached.height == frame.height
        {
            return Ok(cached.paint.clone());
        }

        let pixmap = pixmap_from_premul_bytes(&frame.rgba8_premul, frame.width, frame.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.last_paint = Some(CachedPaint {
            source: Arc::clone(&frame.rgba8_premul),
            paint: paint.clone(),
            width: frame.width,
            height: frame.height,
        });
        Ok(paint)
    }
}

impl Canvas2d for CpuCanvas {
    fn backing_size(&self) -> BackingSize {
        self.size
    }

    fn resize(&mut self, size: BackingSize) -> FilmrollResult<()> {
        let width: u16 = size
            .width
            .try_into()
            .map_err(|_| FilmrollError::render("canvas width exceeds u16"))?;
        let height: u16 = size
            .height
            .try_into()
            .map_err(|_| FilmrollError::render("canvas height exceeds u16"))?;

        self.surface = if size.is_empty() {
            None
        } else {
            Some(CpuSurface {
                width,
                height,
                pixmap: vello_cpu::Pixmap::new(width, height),
            })
        };
        self.size = size;
        self.stats.resizes += 1;
        Ok(())
    }

    fn clear(&mut self) {
        if let Some(surface) = &mut self.surface {
            surface.pixmap.data_as_u8_slice_mut().fill(0);
        }
        self.stats.clears += 1;
    }

    fn draw_frame(&mut self, frame: &PreparedFrame, transform: Affine) -> FilmrollResult<()> {
        if self.surface.is_none() {
            return Ok(());
        }
        let paint = self.paint_for(frame)?;
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == surface.width && ctx.height() == surface.height => ctx,
            _ => vello_cpu::RenderContext::new(surface.width, surface.height),
        };
        ctx.reset();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(frame.width),
            f64::from(frame.height),
        ));
        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);
        self.ctx = Some(ctx);

        self.stats.draws += 1;
        Ok(())
    }

    fn snapshot(&self) -> FrameRGBA {
        let data = self
            .surface
            .as_ref()
            .map(|s| s.pixmap.data_as_u8_slice().to_vec())
            .unwrap_or_default();
        FrameRGBA {
            width: self.size.width,
            height: self.size.height,
            data,
            premultiplied: true,
        }
    }

    fn stats(&self) -> CanvasStats {
        self.stats
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FilmrollResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FilmrollError::render("frame width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FilmrollError::render("frame height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(FilmrollError::render("frame byte length mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity((width as usize) * (height as usize));
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
