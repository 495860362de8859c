//! Drawing comparison results onto a copy of the test image.
//!
//! Boxes are drawn with `imageproc`; text uses the 8x8 bitmap glyphs from
//! `font8x8`, scaled up by an integer factor, so no font file is needed.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use log::debug;

use crate::error::{InspectError, Result};
use crate::models::{ComparisonResult, DetectionSet, Region, Status};

const GLYPH_SIZE: i32 = 8;

/// Colors used for each kind of annotation (RGB).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub correct: Rgb<u8>,
    /// Used for extra components and the missing list
    pub extra: Rgb<u8>,
    /// Used when plotting raw detections
    pub neutral: Rgb<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            correct: Rgb([0, 255, 0]),
            extra: Rgb([255, 0, 0]),
            neutral: Rgb([0, 128, 255]),
        }
    }
}

impl Palette {
    pub fn for_status(&self, status: Status) -> Rgb<u8> {
        match status {
            Status::Correct => self.correct,
            Status::Extra => self.extra,
        }
    }
}

/// Layout of the annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Box outline thickness in pixels, drawn inward from the region edge
    pub thickness: u32,
    /// Glyph scale for box labels (1 = 8px glyphs)
    pub label_scale: u32,
    /// Gap between a label's baseline and the top of its box
    pub label_offset: i32,
    /// Glyph scale for the missing list
    pub missing_scale: u32,
    /// Baseline of the first missing line
    pub missing_origin: (i32, i32),
    /// Vertical distance between missing lines
    pub missing_step: i32,
    /// Prefix of each missing line
    pub missing_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            thickness: 2,
            label_scale: 2,
            label_offset: 5,
            missing_scale: 2,
            missing_origin: (20, 40),
            missing_step: 30,
            missing_prefix: "Missing: ".to_string(),
        }
    }
}

/// Renders comparison results. Holds only configuration, so one instance can
/// be shared across threads and reused for every frame.
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    config: RenderConfig,
    palette: Palette,
}

impl Annotator {
    /// Annotator with the default layout and palette
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Draw every classified entry and the missing list onto a copy of `base`.
    ///
    /// `base` is never modified. An empty result yields a plain RGB copy.
    pub fn render(&self, base: &DynamicImage, result: &ComparisonResult) -> Result<RgbImage> {
        let mut canvas = copy_checked(base)?;

        for entry in &result.entries {
            let color = self.palette.for_status(entry.status);
            self.draw_labeled_box(&mut canvas, &entry.region, &entry.label, color);
        }

        let (x, y0) = self.config.missing_origin;
        for (i, missing) in result.missing.iter().enumerate() {
            let offset = self.config.missing_step.saturating_mul(i as i32);
            let y = y0.saturating_add(offset);
            let line = format!("{}{}", self.config.missing_prefix, missing.label);
            draw_text(
                &mut canvas,
                &line,
                (x, y),
                self.config.missing_scale,
                self.palette.extra,
            );
        }

        debug!(
            "rendered {} entries and {} missing labels onto {}x{} image",
            result.entries.len(),
            result.missing.len(),
            canvas.width(),
            canvas.height()
        );
        Ok(canvas)
    }

    /// Plot raw detections (box and label) in the neutral color.
    pub fn render_detections(&self, base: &DynamicImage, detections: &DetectionSet) -> Result<RgbImage> {
        let mut canvas = copy_checked(base)?;
        for d in detections {
            let label = match d.confidence {
                Some(c) => format!("{} {:.2}", d.label, c),
                None => d.label.clone(),
            };
            self.draw_labeled_box(&mut canvas, &d.region, &label, self.palette.neutral);
        }
        Ok(canvas)
    }

    fn draw_labeled_box(&self, canvas: &mut RgbImage, region: &Region, label: &str, color: Rgb<u8>) {
        draw_region(canvas, region, color, self.config.thickness);
        let baseline = region.y1.saturating_sub(self.config.label_offset);
        draw_text(canvas, label, (region.x1, baseline), self.config.label_scale, color);
    }
}

/// Render with the default annotator.
pub fn render(base: &DynamicImage, result: &ComparisonResult) -> Result<RgbImage> {
    Annotator::default().render(base, result)
}

fn copy_checked(base: &DynamicImage) -> Result<RgbImage> {
    if base.width() == 0 || base.height() == 0 {
        return Err(InspectError::invalid_image(format!(
            "empty image buffer ({}x{})",
            base.width(),
            base.height()
        )));
    }
    Ok(base.to_rgb8())
}

/// Outline `region`, each extra ring of thickness inset by one pixel.
/// Parts outside the canvas are clipped.
fn draw_region(canvas: &mut RgbImage, region: &Region, color: Rgb<u8>, thickness: u32) {
    let thickness = thickness.clamp(1, 64) as i32;
    // Pull far-away edges in to just outside the canvas so rect math stays small.
    let lo = -thickness - 1;
    let clip = |v: i32, max: u32| v.clamp(lo, max as i32 + thickness + 1);
    let (cw, ch) = canvas.dimensions();
    let r = Region::new(
        clip(region.x1, cw),
        clip(region.y1, ch),
        clip(region.x2, cw),
        clip(region.y2, ch),
    );

    for t in 0..thickness {
        let w = r.width() as i32 + 1 - 2 * t;
        let h = r.height() as i32 + 1 - 2 * t;
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(r.x1 + t, r.y1 + t).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// Draw `text` with its baseline at `origin.1`, starting at `origin.0`.
/// Characters without a glyph render as `?`.
fn draw_text(canvas: &mut RgbImage, text: &str, origin: (i32, i32), scale: u32, color: Rgb<u8>) {
    let scale = scale.clamp(1, 32);
    let step = GLYPH_SIZE * scale as i32;
    let top = origin.1.saturating_sub(step);

    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            continue;
        };
        let left = origin.0.saturating_add(step.saturating_mul(i as i32));
        if left >= canvas.width() as i32 {
            break;
        }
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                let px = left.saturating_add(col * scale as i32);
                let py = top.saturating_add(row as i32 * scale as i32);
                draw_filled_rect_mut(canvas, Rect::at(px, py).of_size(scale, scale), color);
            }
        }
    }
}
