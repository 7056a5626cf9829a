//! CPU renderer producing one RGBA frame per surface.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::compositor::{Renderable, Renderer};
use crate::enums::Surface;
use crate::error::RenderError;
use crate::interpolator::Interpolator;
use crate::slice_pipeline::SlicePipeline;
use crate::volume_pipeline::VolumePipeline;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Accumulated alpha after which a ray stops.
const OPAQUE: f32 = 0.99;

#[derive(Debug)]
pub struct SoftwareRenderer {
    frames: [RgbaImage; 4],
    render_counts: [usize; 4],
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frames: std::array::from_fn(|_| RgbaImage::from_pixel(width, height, BACKGROUND)),
            render_counts: [0; 4],
        }
    }

    /// Last frame drawn on `surface`.
    pub fn frame(&self, surface: Surface) -> &RgbaImage {
        &self.frames[surface.index()]
    }

    pub fn render_count(&self, surface: Surface) -> usize {
        self.render_counts[surface.index()]
    }
}

impl Renderer for SoftwareRenderer {
    fn render(&mut self, surface: Surface, scene: &[Renderable<'_>]) -> Result<(), RenderError> {
        let (width, height) = self.frames[surface.index()].dimensions();
        let mut frame = RgbaImage::from_pixel(width, height, BACKGROUND);
        for renderable in scene {
            match renderable {
                Renderable::Slice(pipeline) => draw_slice(&mut frame, pipeline)
                    .map_err(|reason| RenderError::Surface(surface, reason.into()))?,
                Renderable::Volume(pipeline) => draw_volume(&mut frame, pipeline),
            }
        }
        self.frames[surface.index()] = frame;
        self.render_counts[surface.index()] += 1;
        Ok(())
    }
}

/// Largest rectangle with the aspect ratio of `extent`, the source's
/// physical width and height, centred in the frame.
/// Returns `(x0, y0, width, height)` in frame pixels.
fn fit(frame: (u32, u32), extent: (f64, f64)) -> (f32, f32, f32, f32) {
    let (fw, fh) = (frame.0 as f32, frame.1 as f32);
    let (sw, sh) = (extent.0 as f32, extent.1 as f32);
    let scale = (fw / sw).min(fh / sh);
    let (w, h) = (sw * scale, sh * scale);
    ((fw - w) / 2.0, (fh - h) / 2.0, w, h)
}

/// Alpha-blends `color` (straight alpha in `[0, 1]`) over `dst`.
#[inline]
fn blend(dst: &mut [u8], [r, g, b]: [f32; 3], alpha: f32) {
    for (channel, src) in dst.iter_mut().zip([r, g, b]) {
        let mixed = src * 255.0 * alpha + *channel as f32 * (1.0 - alpha);
        *channel = mixed.round().clamp(0.0, 255.0) as u8;
    }
}

fn draw_slice(frame: &mut RgbaImage, pipeline: &SlicePipeline) -> Result<(), &'static str> {
    let section = pipeline.cross_section();
    let (slice_height, slice_width) = section.dim();
    if slice_height == 0 || slice_width == 0 {
        return Err("empty cross-section");
    }
    let (width, _) = frame.dimensions();
    let (column_spacing, row_spacing) = pipeline.pixel_spacing();
    let extent = (
        slice_width as f64 * column_spacing,
        slice_height as f64 * row_spacing,
    );
    let (x0, y0, w, h) = fit(frame.dimensions(), extent);
    let lookup = pipeline.lookup_table();
    let opacity = pipeline.opacity();

    let pixels: &mut [u8] = frame;
    pixels
        .par_chunks_mut(4)
        .enumerate()
        .for_each(|(i, pixel)| {
            let (x, y) = ((i as u32 % width) as f32, (i as u32 / width) as f32);
            let norm_x = (x + 0.5 - x0) / w;
            let norm_y = (y + 0.5 - y0) / h;
            if !(0.0..1.0).contains(&norm_x) || !(0.0..1.0).contains(&norm_y) {
                return;
            }
            let src_x = (norm_x * slice_width as f32 - 0.5).clamp(0.0, (slice_width - 1) as f32);
            let src_y = (norm_y * slice_height as f32 - 0.5).clamp(0.0, (slice_height - 1) as f32);
            let value = Interpolator::bilinear_interpolate(&section, src_y, src_x);
            let [r, g, b, a] = lookup.map(value);
            let alpha = a as f32 / 255.0 * opacity;
            blend(
                pixel,
                [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0],
                alpha,
            );
        });
    Ok(())
}

/// Casts one ray per pixel down the z axis, compositing front to back.
fn draw_volume(frame: &mut RgbaImage, pipeline: &VolumePipeline) {
    let volume = pipeline.volume();
    let data = volume.data();
    let [nx, ny, nz] = volume.dimensions();
    let (width, _) = frame.dimensions();
    let extent = (
        nx as f64 * volume.step_length([1.0, 0.0, 0.0]),
        ny as f64 * volume.step_length([0.0, 1.0, 0.0]),
    );
    let (x0, y0, w, h) = fit(frame.dimensions(), extent);

    let pixels: &mut [u8] = frame;
    pixels
        .par_chunks_mut(4)
        .enumerate()
        .for_each(|(i, pixel)| {
            let (x, y) = ((i as u32 % width) as f32, (i as u32 / width) as f32);
            let norm_x = (x + 0.5 - x0) / w;
            let norm_y = (y + 0.5 - y0) / h;
            if !(0.0..1.0).contains(&norm_x) || !(0.0..1.0).contains(&norm_y) {
                return;
            }
            let vx = f64::from((norm_x * nx as f32 - 0.5).clamp(0.0, (nx - 1) as f32));
            let vy = f64::from((norm_y * ny as f32 - 0.5).clamp(0.0, (ny - 1) as f32));

            let mut color = [0.0f32; 3];
            let mut alpha = 0.0f32;
            for z in (0..nz).rev() {
                let Some(value) = Interpolator::trilinear_interpolate(&data, z as f64, vy, vx)
                else {
                    continue;
                };
                let [r, g, b, a] = pipeline.classify(value);
                let weight = (1.0 - alpha) * a;
                color[0] += weight * r;
                color[1] += weight * g;
                color[2] += weight * b;
                alpha += weight;
                if alpha >= OPAQUE {
                    break;
                }
            }
            if alpha > 0.0 {
                // un-premultiply so blend() can apply the accumulated alpha
                let straight = color.map(|c| c / alpha);
                blend(pixel, straight, alpha);
            }
        });
}
