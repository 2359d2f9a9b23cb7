//! Per-glyph tight-bounds scanner (component C3): a four-phase alpha scan
//! of a cell sub-rectangle, each phase bounded by the edge the previous
//! phase found. Deterministic by construction — integer arithmetic only,
//! sequential scan order, no data-dependent short-circuiting beyond "first
//! on-pixel wins".

use crate::atlas::image::{AtlasImage, IntRect};

fn row_has_on_pixel(image: &AtlasImage, y: u32, x_range: std::ops::Range<u32>) -> bool {
    x_range.into_iter().any(|x| image.alpha_at(x, y) > 0)
}

fn column_has_on_pixel(image: &AtlasImage, x: u32, y_range: std::ops::RangeInclusive<u32>) -> bool {
    y_range.into_iter().any(|y| image.alpha_at(x, y) > 0)
}

/// Scans `cell` (absolute coordinates into `image`) for the minimal
/// rectangle containing any pixel with alpha > 0. Returns `None` ("empty")
/// when the cell is fully transparent — callers must treat this
/// distinctly from a zero-size rectangle.
///
/// The returned rectangle's `x`/`y` are relative to `cell`'s own origin.
pub fn scan_tight_bounds(image: &AtlasImage, cell: IntRect) -> Option<IntRect> {
    if cell.width == 0 || cell.height == 0 {
        return None;
    }

    let x_range = cell.x..cell.max_x();

    // 1. Bottom: scan rows upward from the bottom of the cell.
    let mut bottom = None;
    for y in (cell.y..cell.max_y()).rev() {
        if row_has_on_pixel(image, y, x_range.clone()) {
            bottom = Some(y);
            break;
        }
    }
    let bottom = bottom?;

    // 2. Top: scan rows downward from the top, bounded above by `bottom`.
    let mut top = None;
    for y in cell.y..=bottom {
        if row_has_on_pixel(image, y, x_range.clone()) {
            top = Some(y);
            break;
        }
    }
    let top = top.expect("bottom row is on, so some row in [cell.y, bottom] must be on");

    // 3. Left: scan columns left to right, bounded vertically by [top, bottom].
    let mut left = None;
    for x in x_range.clone() {
        if column_has_on_pixel(image, x, top..=bottom) {
            left = Some(x);
            break;
        }
    }
    let left = left.expect("some column must be on, since some row in [top, bottom] is on");

    // 4. Right: scan columns right to left, same vertical bounds.
    let mut right = None;
    for x in x_range.rev() {
        if column_has_on_pixel(image, x, top..=bottom) {
            right = Some(x);
            break;
        }
    }
    let right = right.expect("left column is on, so some column must be on");

    Some(IntRect::new(
        left - cell.x,
        top - cell.y,
        right - left + 1,
        bottom - top + 1,
    ))
}
