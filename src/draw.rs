//! Drawer (component C10): blits glyphs from a tight atlas onto a
//! destination surface, with a placeholder fallback when no atlas is
//! loaded yet.
//!
//! State machine per identity (driven by the store, §4.9):
//! `UNLOADED -> METRICS_ONLY -> READY`. An atlas that arrives before its
//! metrics is held in the store's pending-atlas queue and reprocessed once
//! metrics register; `draw_text_from_atlas` itself only ever sees the
//! `UNLOADED`/`METRICS_ONLY`/`READY` resolved state for one call, passed in
//! as the `metrics`/`atlas` options.
//!
//! The "Advancement override for small sizes" branch is omitted from the
//! large-size path per the same source annotation honored in
//! [`crate::layout`]; a missing atlas always falls through to placeholder
//! mode and `PARTIAL_ATLAS`/`NO_ATLAS`, never a special small-size branch.
//!
//! `xPos` is computed as `x_phys + dx` only, without an additional
//! `leftSpacing` term. `AtlasPositioning`'s own contract states `dx`/`dy`
//! are "blit offsets relative to the caller-supplied pen position" — a
//! self-contained offset already anchoring the tight glyph rectangle to the
//! pen, independent of where that rectangle happens to sit in the tight
//! atlas. Adding `xInAtlas` (the source-side packing offset) on top would
//! make the draw position grow with every glyph packed before this one in
//! the atlas, contradicting that contract and visibly misplacing every
//! glyph but the first. `xInAtlas`/`yInAtlas` are consulted only to read
//! the source rectangle in [`blit_tinted`], never added into the
//! destination position.

use crate::atlas::{AtlasImage, AtlasPositioning, GlyphPosition};
use crate::identity::FontIdentity;
use crate::layout;
use crate::metrics::{FontMetrics, ResolvedCharacterMetrics};
use crate::spec::{self, FontCorrections};
use crate::text::{RgbColor, Status, TextProperties};

fn set_pixel(dst: &mut AtlasImage, x: i64, y: i64, color: RgbColor) {
    if x < 0 || y < 0 || x as u32 >= dst.width() || y as u32 >= dst.height() {
        return;
    }
    dst.set_rgba_at(x as u32, y as u32, [color.r, color.g, color.b, 255]);
}

fn blit_tinted(dst: &mut AtlasImage, src: &AtlasImage, pos: GlyphPosition, x0: i64, y0: i64, color: RgbColor) {
    for row in 0..pos.tight_height {
        for col in 0..pos.tight_width {
            let sx = pos.x_in_atlas + col;
            let sy = pos.y_in_atlas + row;
            let rgba = src.rgba_at(sx, sy);

            let dx = x0 + i64::from(col);
            let dy = y0 + i64::from(row);
            if dx < 0 || dy < 0 || dx as u32 >= dst.width() || dy as u32 >= dst.height() {
                continue;
            }

            let out = if color == RgbColor::default() {
                rgba
            } else {
                [color.r, color.g, color.b, rgba[3]]
            };
            dst.set_rgba_at(dx as u32, dy as u32, out);
        }
    }
}

/// Trims `pos`'s source rectangle by the "CropLeft correction px" for `c` at
/// `font_size`, in physical pixels: drops that many columns off the left
/// edge of the tight glyph (a stray-rasterization-artifact pull), keeping
/// the destination anchor unchanged so the remaining glyph doesn't shift.
fn apply_crop_left(
    mut pos: GlyphPosition,
    corrections: Option<&FontCorrections>,
    font_size: f64,
    c: char,
    pixel_density: f64,
) -> GlyphPosition {
    let Some(corrections) = corrections else {
        return pos;
    };
    let Some(crop_css) = spec::character_indexed(&corrections.crop_left_correction_px, font_size, c) else {
        return pos;
    };

    let crop = ((crop_css * pixel_density).round() as u32).min(pos.tight_width);
    pos.x_in_atlas += crop;
    pos.tight_width -= crop;
    pos
}

/// Draws a hollow rectangle sized from the character's own metric width and
/// the font's common bounding box, used when no atlas is available yet.
fn draw_placeholder_rect(dst: &mut AtlasImage, x_phys: f64, y_phys: f64, resolved: &ResolvedCharacterMetrics, pixel_density: f64, color: RgbColor) {
    let width = (resolved.width * pixel_density).round() as i64;
    let height = ((resolved.font_bounding_box_ascent + resolved.font_bounding_box_descent) * pixel_density).round() as i64;
    if width <= 0 || height <= 0 {
        return;
    }

    let x0 = x_phys.round() as i64;
    let y0 = (y_phys - resolved.font_bounding_box_ascent * pixel_density).round() as i64;

    for col in 0..width {
        set_pixel(dst, x0 + col, y0, color);
        set_pixel(dst, x0 + col, y0 + height - 1, color);
    }
    for row in 0..height {
        set_pixel(dst, x0, y0 + row, color);
        set_pixel(dst, x0 + width - 1, y0 + row, color);
    }
}

/// Draws `text` at `(x, y)` (CSS pixels, baseline-bottom, left-aligned)
/// onto `dst`. `metrics`/`atlas` reflect the store's current state for
/// `identity`: `None` metrics means `UNLOADED`, `Some` metrics with `None`
/// atlas means `METRICS_ONLY`, and both present means `READY`.
pub fn draw_text_from_atlas(
    dst: &mut AtlasImage,
    text: &str,
    x: f64,
    y: f64,
    identity: &FontIdentity,
    metrics: Option<&FontMetrics>,
    atlas: Option<(&AtlasImage, &AtlasPositioning)>,
    corrections: Option<&FontCorrections>,
    props: &TextProperties,
) -> Status {
    let Some(metrics) = metrics else {
        return Status::NoMetrics;
    };

    let chars: Vec<char> = text.chars().collect();
    let pixel_density = identity.pixel_density();
    let mut x_phys = x * pixel_density;
    let y_phys = y * pixel_density;

    let mut any_missing_metrics = false;
    let mut any_missing_atlas = false;

    for (i, &c) in chars.iter().enumerate() {
        let Some(resolved) = metrics.resolved(c) else {
            any_missing_metrics = true;
            continue;
        };

        match atlas.and_then(|(image, positioning)| positioning.get(c).map(|pos| (image, pos))) {
            Some((image, pos)) => {
                let x_pos = (x_phys + f64::from(pos.dx)).round() as i64;
                let y_pos = (y_phys + f64::from(pos.dy)).round() as i64;
                let pos = apply_crop_left(pos, corrections, identity.font_size(), c, pixel_density);
                blit_tinted(dst, image, pos, x_pos, y_pos, props.text_color);
            }
            None => {
                any_missing_atlas = true;
                draw_placeholder_rect(dst, x_phys, y_phys, &resolved, pixel_density, props.text_color);
            }
        }

        x_phys += layout::advance(i, &chars, metrics, identity, corrections, props) * pixel_density;
    }

    if atlas.is_none() {
        return Status::NoAtlas;
    }
    if any_missing_atlas {
        return Status::PartialAtlas;
    }
    if any_missing_metrics {
        return Status::PartialMetrics;
    }
    Status::Success
}
