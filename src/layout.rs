//! Text layout (component C9): per-character advance computation and
//! `measure_text`.
//!
//! The "Advancement override for small sizes in px" branch is omitted here
//! for the same reason it is omitted from the drawer (§9 Design Notes):
//! the source flags it as untrusted and unused. Non-space characters
//! always advance by `metrics[char].width`.
//!
//! The bounding-box and advancement "proportional" correction keys scale
//! with font size (`correction * fontSize`); their "px" counterparts are
//! flat additions. Both pairs are read as additive corrections on top of
//! the character's own measured metrics, consistent with the "px"/
//! "proportional" naming used throughout the rest of the correction keys
//! (e.g. kerning's `fontSize * adjustment / 1000` in step 3 below).

use crate::identity::FontIdentity;
use crate::metrics::{FontMetrics, ResolvedCharacterMetrics};
use crate::spec::{self, FontCorrections};
use crate::text::{TextMetrics, TextProperties};

/// Applies the `ActualBoundingBoxLeft`/`ActualBoundingBoxRight` correction
/// px+proportional keys to a resolved character's bounding box.
fn apply_bbox_corrections(
    mut resolved: ResolvedCharacterMetrics,
    corrections: Option<&FontCorrections>,
    font_size: f64,
) -> ResolvedCharacterMetrics {
    if let Some(corrections) = corrections {
        let left_px = spec::scalar_per_bracket(&corrections.actual_bounding_box_left_correction_px, font_size).unwrap_or(0.0);
        let left_prop =
            spec::scalar_per_bracket(&corrections.actual_bounding_box_left_correction_proportional, font_size).unwrap_or(0.0);
        resolved.actual_bounding_box_left += left_px + left_prop * font_size;

        let right_px = spec::scalar_per_bracket(&corrections.actual_bounding_box_right_correction_px, font_size).unwrap_or(0.0);
        let right_prop =
            spec::scalar_per_bracket(&corrections.actual_bounding_box_right_correction_proportional, font_size).unwrap_or(0.0);
        resolved.actual_bounding_box_right += right_px + right_prop * font_size;
    }
    resolved
}

fn base_advance(
    c: char,
    resolved: &ResolvedCharacterMetrics,
    corrections: Option<&FontCorrections>,
    font_size: f64,
) -> f64 {
    let mut width = if c == ' ' {
        if let Some(corrections) = corrections {
            if let Some(over) = spec::scalar_per_bracket(&corrections.space_advancement_override_for_small_sizes_px, font_size) {
                return over;
            }
        }
        resolved.width
    } else {
        resolved.width
    };

    if let Some(corrections) = corrections {
        let prop = spec::scalar_per_bracket(&corrections.advancement_correction_proportional, font_size).unwrap_or(0.0);
        width += prop * font_size;
    }

    width
}

fn kerning_between(
    metrics: &FontMetrics,
    corrections: Option<&FontCorrections>,
    font_size: f64,
    left: char,
    right: char,
) -> i32 {
    if let Some(corrections) = corrections {
        if let Some(adjustment) = spec::kerning_adjustment(&corrections.kerning, font_size, left, right) {
            return adjustment.round() as i32;
        }
    }
    metrics.kerning.get(left, right)
}

/// Computes the CSS-pixel advance following character `chars[i]`, including
/// any kerning correction against `chars[i + 1]`. Does not itself round;
/// rounding happens once per step in [`measure_text`] and the drawer, per
/// the "integer pen" invariant.
pub fn advance(
    i: usize,
    chars: &[char],
    metrics: &FontMetrics,
    identity: &FontIdentity,
    corrections: Option<&FontCorrections>,
    props: &TextProperties,
) -> f64 {
    let c = chars[i];
    let font_size = identity.font_size();

    let resolved = match metrics.resolved(c) {
        Some(r) => r,
        None => return 0.0,
    };

    let mut x = base_advance(c, &resolved, corrections, font_size);

    let kerning_disabled = !props.is_kerning_enabled
        || i + 1 >= chars.len()
        || corrections.is_some_and(|c| spec::is_below_kerning_cutoff(c, font_size));

    if !kerning_disabled {
        let adjustment = kerning_between(metrics, corrections, font_size, c, chars[i + 1]);
        if adjustment != 0 {
            let correction = corrections.and_then(|corrections| {
                spec::discretisation_correction(
                    &corrections.kerning_discretisation_for_small_sizes,
                    font_size,
                    f64::from(adjustment),
                )
            });
            x += correction.unwrap_or_else(|| font_size * f64::from(adjustment) / 1000.0);
        }
    }

    x
}

/// Walks `text`, accumulating rounded CSS-pixel pen positions. Returns the
/// rounded x after each character, satisfying the "integer pen" and
/// "advance monotonicity" invariants by construction (each step adds a
/// value and rounds immediately, so the running total never decreases past
/// a prior rounded value when advances are non-negative).
pub fn pen_positions(
    text: &str,
    metrics: &FontMetrics,
    identity: &FontIdentity,
    corrections: Option<&FontCorrections>,
    props: &TextProperties,
) -> Vec<i64> {
    let chars: Vec<char> = text.chars().collect();
    let mut x = 0.0f64;
    let mut positions = Vec::with_capacity(chars.len());

    for i in 0..chars.len() {
        x += advance(i, &chars, metrics, identity, corrections, props);
        positions.push(x.round() as i64);
    }

    positions
}

pub fn measure_text(
    text: &str,
    metrics: &FontMetrics,
    identity: &FontIdentity,
    corrections: Option<&FontCorrections>,
    props: &TextProperties,
) -> TextMetrics {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return TextMetrics::default();
    }

    let positions = pen_positions(text, metrics, identity, corrections, props);
    let width = *positions.last().unwrap() as f64;
    let font_size = identity.font_size();

    let first = metrics.resolved(chars[0]).map(|r| apply_bbox_corrections(r, corrections, font_size));
    let last = metrics.resolved(*chars.last().unwrap()).map(|r| apply_bbox_corrections(r, corrections, font_size));

    let last_advance = if positions.len() >= 2 {
        width - positions[positions.len() - 2] as f64
    } else {
        width
    };

    TextMetrics {
        width,
        actual_bounding_box_left: first.map(|m| m.actual_bounding_box_left).unwrap_or(0.0),
        actual_bounding_box_right: last
            .map(|m| width - last_advance + m.actual_bounding_box_right)
            .unwrap_or(0.0),
        font_bounding_box_ascent: last.map(|m| m.font_bounding_box_ascent).unwrap_or(0.0),
        font_bounding_box_descent: last.map(|m| m.font_bounding_box_descent).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CharacterMetrics, CommonMetrics};
    use crate::spec::SizeBracket;

    fn metrics_with(chars: &[(char, f64, f64, f64)]) -> FontMetrics {
        let mut metrics = FontMetrics {
            common: CommonMetrics {
                font_bounding_box_ascent: 15.0,
                font_bounding_box_descent: 4.0,
                pixel_density: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        for &(c, width, left, right) in chars {
            metrics.characters.insert(
                c,
                CharacterMetrics {
                    width,
                    actual_bounding_box_left: left,
                    actual_bounding_box_right: right,
                    actual_bounding_box_ascent: 13.0,
                    actual_bounding_box_descent: 0.0,
                },
            );
        }
        metrics
    }

    #[test]
    fn empty_string_measures_to_zero() {
        let metrics = metrics_with(&[]);
        let identity = FontIdentity::new(1.0, "Arial", None, None, 19.0);
        let result = measure_text("", &metrics, &identity, None, &TextProperties::default());
        assert_eq!(result, TextMetrics::default());
    }

    #[test]
    fn single_character_matches_its_own_metrics() {
        let metrics = metrics_with(&[('A', 12.0, 1.0, 11.0)]);
        let identity = FontIdentity::new(1.0, "Arial", None, None, 19.0);
        let result = measure_text("A", &metrics, &identity, None, &TextProperties::default());
        assert_eq!(result.width, 12.0);
        assert_eq!(result.actual_bounding_box_left, 1.0);
        assert_eq!(result.actual_bounding_box_right, 11.0);
    }

    #[test]
    fn bbox_corrections_shift_measured_bounding_box() {
        let metrics = metrics_with(&[('A', 12.0, 1.0, 11.0)]);
        let identity = FontIdentity::new(1.0, "Arial", None, None, 19.0);

        let mut corrections = FontCorrections::default();
        corrections.actual_bounding_box_left_correction_px.push(SizeBracket {
            from: 0.0,
            to: 100.0,
            pixel_density: None,
            value: 2.0,
        });
        corrections.actual_bounding_box_right_correction_proportional.push(SizeBracket {
            from: 0.0,
            to: 100.0,
            pixel_density: None,
            value: 0.1,
        });

        let result = measure_text("A", &metrics, &identity, Some(&corrections), &TextProperties::default());
        assert_eq!(result.actual_bounding_box_left, 1.0 + 2.0);
        assert_eq!(result.actual_bounding_box_right, 11.0 + 0.1 * 19.0);
    }

    #[test]
    fn advancement_proportional_correction_widens_base_advance() {
        let metrics = metrics_with(&[('A', 10.0, 0.0, 10.0), ('B', 9.0, 1.0, 8.0)]);
        let identity = FontIdentity::new(1.0, "Arial", None, None, 19.0);
        let props = TextProperties::default();

        let mut corrections = FontCorrections::default();
        corrections.advancement_correction_proportional.push(SizeBracket {
            from: 0.0,
            to: 100.0,
            pixel_density: None,
            value: 0.5,
        });

        let without = pen_positions("AB", &metrics, &identity, None, &props);
        let with = pen_positions("AB", &metrics, &identity, Some(&corrections), &props);

        assert!(with[0] > without[0]);
    }

    #[test]
    fn advance_is_monotonic_across_prefixes() {
        let metrics = metrics_with(&[('A', 10.0, 0.0, 10.0), ('B', 9.0, 1.0, 8.0), ('C', 11.0, 0.0, 11.0)]);
        let identity = FontIdentity::new(1.0, "Arial", None, None, 19.0);
        let props = TextProperties::default();

        let full = pen_positions("ABC", &metrics, &identity, None, &props);
        let prefix = pen_positions("AB", &metrics, &identity, None, &props);

        assert!(prefix.last().unwrap() <= full.last().unwrap());
    }

    #[test]
    fn kerning_adjusts_advance_between_pairs() {
        let mut metrics = metrics_with(&[('A', 10.0, 0.0, 10.0), ('V', 9.0, 0.0, 9.0)]);
        metrics.kerning.set('A', 'V', -100);
        let identity = FontIdentity::new(1.0, "Arial", None, None, 100.0);
        let props = TextProperties::default();

        let with_kerning = pen_positions("AV", &metrics, &identity, None, &props);

        let mut no_kerning_props = props;
        no_kerning_props.is_kerning_enabled = false;
        let without_kerning = pen_positions("AV", &metrics, &identity, None, &no_kerning_props);

        assert!(with_kerning[0] < without_kerning[0]);
    }
}
