//! Raster render context for the plots.
//!
//! Every plot draws through a plotters [`BitMapBackend`] into an RGB buffer
//! owned by [`render_png`] for the length of one call, so no drawing state
//! outlives a render. Labels use the 8x8 bitmap glyphs from `font8x8`
//! (basic Latin plus Latin-1), scaled by an integer factor.

use crate::error::{AnalysisError, Result};
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;

pub const GRID_GREY: RGBColor = RGBColor(200, 200, 200);

/// Side length of one unscaled glyph, in pixels.
pub const GLYPH_SIZE: u32 = 8;

/// Glyph drawn for characters no font table covers.
const FALLBACK_GLYPH: char = '?';

/// Drawing area over one plot's pixel buffer.
pub type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Horizontal alignment of a label relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

pub(crate) fn render_error(err: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Render(err.to_string())
}

/// Run `draw` on a white `width` x `height` surface and encode it as PNG.
pub fn render_png<F>(width: u32, height: u32, draw: F) -> Result<Vec<u8>>
where
    F: FnOnce(&Area<'_>) -> Result<()>,
{
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;
        draw(&root)?;
        root.present().map_err(render_error)?;
    }

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| AnalysisError::Render("plot buffer has the wrong size".to_string()))?;
    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image).write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

/// Width in pixels of `text` at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Draw `text` with its top edge at `y`, aligned on `x`.
pub fn draw_text(
    area: &Area<'_>,
    (x, y): (i32, i32),
    text: &str,
    scale: u32,
    color: &RGBColor,
    align: Align,
) -> Result<()> {
    let width = text_width(text, scale) as i32;
    let left = match align {
        Align::Left => x,
        Align::Center => x - width / 2,
        Align::Right => x - width,
    };
    let step = (GLYPH_SIZE * scale) as i32;

    for (index, ch) in text.chars().enumerate() {
        let origin = left + index as i32 * step;
        for_each_set_bit(glyph_for(ch), |row, col| {
            dot(area, origin + col * scale as i32, y + row * scale as i32, scale, color)
        })?;
    }
    Ok(())
}

/// Draw `text` rotated 90 degrees counter-clockwise, reading bottom to top,
/// centred vertically on `center_y` with its left edge at `x`.
pub fn draw_text_vertical(
    area: &Area<'_>,
    x: i32,
    center_y: i32,
    text: &str,
    scale: u32,
    color: &RGBColor,
) -> Result<()> {
    let bottom = center_y + text_width(text, scale) as i32 / 2;
    draw_text_upward(area, x, bottom, text, scale, color)
}

/// Draw rotated text starting at `bottom` and running upward.
pub fn draw_text_upward(
    area: &Area<'_>,
    x: i32,
    bottom: i32,
    text: &str,
    scale: u32,
    color: &RGBColor,
) -> Result<()> {
    let s = scale as i32;
    let step = (GLYPH_SIZE * scale) as i32;

    for (index, ch) in text.chars().enumerate() {
        let origin = bottom - index as i32 * step;
        // Glyph columns run upward, glyph rows run rightward.
        for_each_set_bit(glyph_for(ch), |row, col| {
            dot(area, x + row * s, origin - (col + 1) * s, scale, color)
        })?;
    }
    Ok(())
}

fn for_each_set_bit(
    glyph: [u8; 8],
    mut f: impl FnMut(i32, i32) -> Result<()>,
) -> Result<()> {
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..GLYPH_SIZE {
            if bits & (1u8 << col) != 0 {
                f(row as i32, col as i32)?;
            }
        }
    }
    Ok(())
}

fn dot(area: &Area<'_>, x: i32, y: i32, scale: u32, color: &RGBColor) -> Result<()> {
    if scale == 1 {
        return area.draw_pixel((x, y), color).map_err(render_error);
    }
    let size = scale as i32 - 1;
    area.draw(&Rectangle::new([(x, y), (x + size, y + size)], color.filled()))
        .map_err(render_error)
}

fn glyph_for(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get(FALLBACK_GLYPH))
        .unwrap_or([0; 8])
}

/// Shorten a label to at most `max_chars` characters, marking the cut.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    let count = label.chars().count();
    if count <= max_chars {
        return label.to_string();
    }
    if max_chars <= 2 {
        return label.chars().take(max_chars).collect();
    }
    let mut short: String = label.chars().take(max_chars - 2).collect();
    short.push_str("..");
    short
}

/// Compact tick label: up to two decimals, trailing zeros removed.
pub fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e5 || (magnitude > 0.0 && magnitude < 1e-2) {
        return format!("{:.1e}", value);
    }

    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Linear blend between two colours, `t` in `[0, 1]`.
pub fn lerp_color(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}
