//! Query functions over a parsed [`FontCorrections`] tree (§4.6): the
//! three bracket-matching shapes the rest of the runtime consults.

use crate::spec::types::{DiscretisationRange, FontCorrections, SizeBracket};

/// Single scalar per size bracket: first matching bracket wins.
pub fn scalar_per_bracket(brackets: &[SizeBracket<f64>], font_size: f64) -> Option<f64> {
    brackets.iter().find(|b| b.matches(font_size)).map(|b| b.value)
}

/// Character-indexed per size bracket: scans every matching bracket in
/// order, returning the first entry (within any matching bracket) whose
/// character set contains `c`.
pub fn character_indexed(
    brackets: &[SizeBracket<Vec<crate::spec::types::CharCorrection>>],
    font_size: f64,
    c: char,
) -> Option<f64> {
    for bracket in brackets.iter().filter(|b| b.matches(font_size)) {
        if let Some(entry) = bracket.value.iter().find(|entry| entry.chars.contains(c)) {
            return Some(entry.value);
        }
    }
    None
}

/// Pair kerning: first `(leftSet, rightSet)` entry, in bracket-then-entry
/// order, whose size range contains `font_size` and whose sets contain the
/// given pair.
pub fn kerning_adjustment(
    brackets: &[SizeBracket<Vec<crate::spec::types::KerningEntry>>],
    font_size: f64,
    left: char,
    right: char,
) -> Option<f64> {
    for bracket in brackets.iter().filter(|b| b.matches(font_size)) {
        if let Some(entry) = bracket
            .value
            .iter()
            .find(|entry| entry.left.contains(left) && entry.right.contains(right))
        {
            return Some(entry.adjustment);
        }
    }
    None
}

/// Finds the discretisation bracket's correction for `adjustment`, if the
/// matching size bracket has a sub-range whose half-open `[kern_le, kern_g)`
/// interval contains it.
pub fn discretisation_correction(
    brackets: &[SizeBracket<Vec<DiscretisationRange>>],
    font_size: f64,
    adjustment: f64,
) -> Option<f64> {
    for bracket in brackets.iter().filter(|b| b.matches(font_size)) {
        if let Some(range) = bracket
            .value
            .iter()
            .find(|r| r.kern_le <= adjustment && adjustment < r.kern_g)
        {
            return Some(range.correction);
        }
    }
    None
}

/// Whether `font_size` is at or below the "Kerning cutoff" for these
/// corrections (in which case the kerning table must be ignored entirely).
pub fn is_below_kerning_cutoff(corrections: &FontCorrections, font_size: f64) -> bool {
    corrections.kerning_cutoff.is_some_and(|cutoff| font_size <= cutoff)
}
