//! Atlas repacker (component C4): from tight bounds and a source atlas,
//! produces a tight atlas image plus per-character [`AtlasPositioning`].
//!
//! The `dx`/`dy` formulas in [`repack_atlas`] are part of the public
//! contract (§4.3 step 6) — any conforming implementation must reproduce
//! them pixel-for-pixel, including the "minus one" `dy` variant called out
//! as the correct one in §9's Open Questions.

use hashbrown::HashMap;

use crate::atlas::image::{AtlasImage, ImageFactory, IntRect};
use crate::atlas::scanner::scan_tight_bounds;
use crate::error::BitfontError;
use crate::metrics::FontMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphPosition {
    pub x_in_atlas: u32,
    /// Always 0 in the current single-row packing; retained to permit a
    /// future multi-row layout without an on-wire format change.
    pub y_in_atlas: u32,
    pub tight_width: u32,
    pub tight_height: u32,
    pub dx: i32,
    pub dy: i32,
}

#[derive(Debug, Clone, Default)]
pub struct AtlasPositioning {
    entries: HashMap<char, GlyphPosition>,
}

impl AtlasPositioning {
    pub fn get(&self, c: char) -> Option<GlyphPosition> {
        self.entries.get(&c).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn err(identity: &str, reason: impl Into<String>) -> BitfontError {
    BitfontError::CorruptedAsset {
        identity: identity.to_string(),
        reason: reason.into(),
    }
}

/// Reconstructs a tight atlas and its positioning table from a `source`
/// atlas packed per §3's source-atlas cell convention, and the font's
/// metrics (which determine each cell's dimensions).
pub fn repack_atlas(
    source: &AtlasImage,
    metrics: &FontMetrics,
    factory: &mut dyn ImageFactory,
    identity: &str,
) -> Result<(AtlasImage, AtlasPositioning), BitfontError> {
    let characters = metrics.sorted_characters();
    if characters.is_empty() {
        return Err(err(identity, "atlas repacker invoked with an empty character set"));
    }

    let pixel_density = metrics.common.pixel_density;
    let cell_height = ((metrics.common.font_bounding_box_ascent + metrics.common.font_bounding_box_descent)
        * pixel_density)
        .ceil() as u32;

    let mut cell_widths = Vec::with_capacity(characters.len());
    let mut total_cell_width: u64 = 0;
    for &c in &characters {
        let m = &metrics.characters[&c];
        let cw = ((m.actual_bounding_box_left + m.actual_bounding_box_right) * pixel_density).ceil() as u32;
        total_cell_width += u64::from(cw);
        cell_widths.push(cw);
    }

    if u64::from(source.width()) != total_cell_width {
        return Err(err(
            identity,
            format!(
                "source atlas width {} disagrees with the sum of cell widths {total_cell_width}",
                source.width()
            ),
        ));
    }
    if source.height() != cell_height {
        return Err(err(
            identity,
            format!(
                "source atlas height {} disagrees with the common cell height {cell_height}",
                source.height()
            ),
        ));
    }

    // First pass: scan every cell, accumulating cellX even for empty cells.
    let mut cell_x = 0u32;
    let mut scanned: Vec<(char, u32, Option<IntRect>)> = Vec::with_capacity(characters.len());
    for (&c, &cw) in characters.iter().zip(cell_widths.iter()) {
        let cell = IntRect::new(cell_x, 0, cw, cell_height);
        let bounds = scan_tight_bounds(source, cell);
        scanned.push((c, cell_x, bounds));
        cell_x += cw;
    }

    let dest_width: u32 = scanned
        .iter()
        .filter_map(|(_, _, b)| b.map(|b| b.width))
        .sum();
    let dest_height: u32 = scanned
        .iter()
        .filter_map(|(_, _, b)| b.map(|b| b.height))
        .max()
        .unwrap_or(0);

    let mut dest = factory.create(dest_width, dest_height);
    let mut positioning = AtlasPositioning::default();
    let mut x_in_tight_atlas = 0u32;

    for (c, cell_x, bounds) in scanned {
        let Some(bounds) = bounds else {
            // A non-empty cell producing no tight bounds is silently
            // allowed: the character is absent from the tight atlas.
            continue;
        };

        dest.blit_from(
            source,
            cell_x + bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            x_in_tight_atlas,
            0,
        );

        let m = &metrics.characters[&c];
        let dx = -(m.actual_bounding_box_left.round()) * pixel_density + f64::from(bounds.x);

        let dist_bottom =
            f64::from(cell_height) - (f64::from(bounds.y) + f64::from(bounds.height) - 1.0) - 1.0;
        let dy = -f64::from(bounds.height) - dist_bottom + pixel_density;

        positioning.entries.insert(
            c,
            GlyphPosition {
                x_in_atlas: x_in_tight_atlas,
                y_in_atlas: 0,
                tight_width: bounds.width,
                tight_height: bounds.height,
                dx: dx.round() as i32,
                dy: dy.round() as i32,
            },
        );

        x_in_tight_atlas += bounds.width;
    }

    Ok((dest, positioning))
}
