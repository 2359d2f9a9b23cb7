//! Data model for parsed correction specs (component C8): size brackets,
//! character sets, and the per-`(family, style, weight)` correction tree.

use hashbrown::HashMap;

/// A set of characters recognized on the left/right side of a kerning
/// entry or the indexed side of a character correction. `Any` is the `*any*`
/// wildcard token, matching every character.
#[derive(Debug, Clone, PartialEq)]
pub enum CharSet {
    Any,
    Explicit(Vec<char>),
}

impl CharSet {
    pub fn contains(&self, c: char) -> bool {
        match self {
            CharSet::Any => true,
            CharSet::Explicit(chars) => chars.contains(&c),
        }
    }
}

/// One `[from] to [to] [at pixel density N]` header and the value(s) it
/// governs. `to` is exclusive: a bracket matches `from <= font_size < to`.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeBracket<T> {
    pub from: f64,
    pub to: f64,
    pub pixel_density: Option<f64>,
    pub value: T,
}

impl<T> SizeBracket<T> {
    pub fn matches(&self, font_size: f64) -> bool {
        self.from <= font_size && font_size < self.to
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KerningEntry {
    pub left: CharSet,
    pub right: CharSet,
    pub adjustment: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharCorrection {
    pub chars: CharSet,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscretisationRange {
    pub kern_le: f64,
    pub kern_g: f64,
    pub correction: f64,
}

/// All corrections recognized for one `(family, style, weight)` triple.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontCorrections {
    pub kerning_cutoff: Option<f64>,
    pub kerning: Vec<SizeBracket<Vec<KerningEntry>>>,
    pub actual_bounding_box_left_correction_px: Vec<SizeBracket<f64>>,
    pub actual_bounding_box_right_correction_px: Vec<SizeBracket<f64>>,
    pub actual_bounding_box_left_correction_proportional: Vec<SizeBracket<f64>>,
    pub actual_bounding_box_right_correction_proportional: Vec<SizeBracket<f64>>,
    pub advancement_correction_proportional: Vec<SizeBracket<f64>>,
    pub crop_left_correction_px: Vec<SizeBracket<Vec<CharCorrection>>>,
    pub space_advancement_override_for_small_sizes_px: Vec<SizeBracket<f64>>,
    pub advancement_override_for_small_sizes_px: Vec<SizeBracket<f64>>,
    pub kerning_discretisation_for_small_sizes: Vec<SizeBracket<Vec<DiscretisationRange>>>,
}

/// A fully parsed correction-spec file, keyed by `(family, style, weight)`.
#[derive(Debug, Clone, Default)]
pub struct Spec {
    pub(crate) entries: HashMap<(String, String, String), FontCorrections>,
}

impl Spec {
    pub fn corrections_for(&self, family: &str, style: &str, weight: &str) -> Option<&FontCorrections> {
        self.entries
            .get(&(family.to_string(), style.to_string(), weight.to_string()))
    }
}
