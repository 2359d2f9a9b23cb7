//! The metrics-shaped data model (component of §3): [`CharacterMetrics`],
//! [`CommonMetrics`], [`KerningTable`] and the [`FontMetrics`] bundle the
//! metrics store keys on.

use hashbrown::HashMap;

/// Per-codepoint measured metrics, all in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CharacterMetrics {
    pub width: f64,
    pub actual_bounding_box_left: f64,
    pub actual_bounding_box_right: f64,
    pub actual_bounding_box_ascent: f64,
    pub actual_bounding_box_descent: f64,
}

/// The six baseline fields shared by every character of one font identity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommonMetrics {
    pub font_bounding_box_ascent: f64,
    pub font_bounding_box_descent: f64,
    pub hanging_baseline: f64,
    pub alphabetic_baseline: f64,
    pub ideographic_baseline: f64,
    pub pixel_density: f64,
}

/// A fully expanded `(character -> metrics)` record, combining a
/// character's own measurements with its font's common baselines. This is
/// the shape [`crate::layout`] and [`crate::draw`] consume; it never exists
/// on the wire (see [`crate::metrics::expand`] for how it is assembled).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolvedCharacterMetrics {
    pub width: f64,
    pub actual_bounding_box_left: f64,
    pub actual_bounding_box_right: f64,
    pub actual_bounding_box_ascent: f64,
    pub actual_bounding_box_descent: f64,
    pub font_bounding_box_ascent: f64,
    pub font_bounding_box_descent: f64,
    pub hanging_baseline: f64,
    pub alphabetic_baseline: f64,
    pub ideographic_baseline: f64,
    pub pixel_density: f64,
}

/// `left -> right -> adjustment` kerning, adjustment in 1/1000 em. Missing
/// entry means 0. Stored as a single flat map keyed by a packed
/// `(left, right)` pair rather than a map of maps, per the Design Notes'
/// preference for avoiding allocation fragmentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KerningTable {
    entries: HashMap<(char, char), i32>,
}

impl KerningTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, left: char, right: char) -> i32 {
        self.entries.get(&(left, right)).copied().unwrap_or(0)
    }

    pub fn set(&mut self, left: char, right: char, adjustment: i32) {
        self.entries.insert((left, right), adjustment);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, char, i32)> + '_ {
        self.entries.iter().map(|(&(l, r), &v)| (l, r, v))
    }
}

/// The decoded shape of one font's minified blob: common baselines,
/// per-character metrics, the kerning table, and the small-size space
/// override (the `s` field).
#[derive(Debug, Clone, Default)]
pub struct FontMetrics {
    pub common: CommonMetrics,
    pub characters: HashMap<char, CharacterMetrics>,
    pub kerning: KerningTable,
    pub space_advancement_override_for_small_sizes: Option<f64>,
}

impl FontMetrics {
    /// Combines a character's own metrics with this font's common
    /// baselines. Returns `None` if the character has no entry.
    pub fn resolved(&self, c: char) -> Option<ResolvedCharacterMetrics> {
        let m = self.characters.get(&c)?;
        Some(ResolvedCharacterMetrics {
            width: m.width,
            actual_bounding_box_left: m.actual_bounding_box_left,
            actual_bounding_box_right: m.actual_bounding_box_right,
            actual_bounding_box_ascent: m.actual_bounding_box_ascent,
            actual_bounding_box_descent: m.actual_bounding_box_descent,
            font_bounding_box_ascent: self.common.font_bounding_box_ascent,
            font_bounding_box_descent: self.common.font_bounding_box_descent,
            hanging_baseline: self.common.hanging_baseline,
            alphabetic_baseline: self.common.alphabetic_baseline,
            ideographic_baseline: self.common.ideographic_baseline,
            pixel_density: self.common.pixel_density,
        })
    }

    /// Characters present in this font, in ascending code-point order (the
    /// "sorted character set" the atlas repacker and the tuplet/glyph pool
    /// must agree with bit-exactly).
    pub fn sorted_characters(&self) -> Vec<char> {
        let mut chars: Vec<char> = self.characters.keys().copied().collect();
        chars.sort_unstable();
        chars
    }
}
