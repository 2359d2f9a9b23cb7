//! Font-identity value object (component C1).

use std::fmt;

use crate::convert::cast_u8;

/// Default value used for [`FontIdentity::font_style`] and
/// [`FontIdentity::font_weight`] when the caller does not supply one.
pub const DEFAULT_STYLE: &str = "normal";
pub const DEFAULT_WEIGHT: &str = "normal";

/// Immutable `(pixelDensity, family, style, weight, size)` key.
///
/// Equality and hashing are defined entirely in terms of [`id_string`], so
/// two identities that format to the same string (e.g. `19.0` and `19.04`,
/// both rounding to one decimal as `19-0`) are the same identity.
///
/// [`id_string`]: FontIdentity::id_string
#[derive(Debug, Clone)]
pub struct FontIdentity {
    pixel_density: f64,
    font_family: String,
    font_style: String,
    font_weight: String,
    font_size: f64,
    id_string: String,
}

impl FontIdentity {
    /// # Panics
    ///
    /// Panics if `pixel_density` or `font_size` is not a positive, finite
    /// number.
    pub fn new(
        pixel_density: f64,
        font_family: impl Into<String>,
        font_style: Option<String>,
        font_weight: Option<String>,
        font_size: f64,
    ) -> Self {
        assert!(
            pixel_density.is_finite() && pixel_density > 0.0,
            "pixel_density must be a positive finite number",
        );
        assert!(
            font_size.is_finite() && font_size > 0.0,
            "font_size must be a positive finite number",
        );

        let font_family = font_family.into();
        let font_style = font_style.unwrap_or_else(|| DEFAULT_STYLE.to_string());
        let font_weight = font_weight.unwrap_or_else(|| DEFAULT_WEIGHT.to_string());

        let id_string = format_id_string(
            pixel_density,
            &font_family,
            &font_style,
            &font_weight,
            font_size,
        );

        Self {
            pixel_density,
            font_family,
            font_style,
            font_weight,
            font_size,
            id_string,
        }
    }

    pub fn pixel_density(&self) -> f64 {
        self.pixel_density
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_style(&self) -> &str {
        &self.font_style
    }

    pub fn font_weight(&self) -> &str {
        &self.font_weight
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn id_string(&self) -> &str {
        &self.id_string
    }

    /// Parses an id string produced by [`FontIdentity::id_string`].
    ///
    /// Per the format contract, parsing splits on `-` and reads density from
    /// fixed positions 1 and 2, and size from fixed positions 9 and 10. A
    /// `font_family` containing a literal hyphen is not recoverable from the
    /// id string alone; this mirrors the source format's own limitation.
    pub fn parse(id_string: &str) -> Option<Self> {
        let parts: Vec<&str> = id_string.split('-').collect();
        if parts.len() != 11 || parts[0] != "density" || parts[4] != "style" || parts[6] != "weight" || parts[8] != "size"
        {
            return None;
        }

        let pixel_density = parse_one_decimal(parts[1], parts[2])?;
        let font_size = parse_one_decimal(parts[9], parts[10])?;
        let font_family = parts[3].to_string();
        let font_style = parts[5].to_string();
        let font_weight = parts[7].to_string();

        Some(Self::new(
            pixel_density,
            font_family,
            Some(font_style),
            Some(font_weight),
            font_size,
        ))
    }
}

impl PartialEq for FontIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id_string == other.id_string
    }
}

impl Eq for FontIdentity {}

impl std::hash::Hash for FontIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id_string.hash(state);
    }
}

impl fmt::Display for FontIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id_string)
    }
}

fn format_id_string(
    pixel_density: f64,
    font_family: &str,
    font_style: &str,
    font_weight: &str,
    font_size: f64,
) -> String {
    let (di, df) = one_decimal_parts(pixel_density);
    let (si, sf) = one_decimal_parts(font_size);

    format!("density-{di}-{df}-{font_family}-style-{font_style}-weight-{font_weight}-size-{si}-{sf}")
}

/// Splits a positive number into `(integer_part, single_fractional_digit)`,
/// rounding to the nearest tenth. `<dec> = 0` when the fractional part is
/// zero after rounding.
fn one_decimal_parts(value: f64) -> (i64, u8) {
    let tenths = (value * 10.0).round() as i64;
    let int_part = tenths / 10;
    let dec_part = cast_u8((tenths % 10).unsigned_abs());
    (int_part, dec_part)
}

fn parse_one_decimal(int_str: &str, dec_str: &str) -> Option<f64> {
    let int_part: i64 = int_str.parse().ok()?;
    let dec_part: i64 = dec_str.parse().ok()?;
    if !(0..=9).contains(&dec_part) {
        return None;
    }
    Some(int_part as f64 + (dec_part as f64) / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_string_matches_format_with_zero_fraction() {
        let id = FontIdentity::new(1.0, "Arial", None, None, 19.0);
        assert_eq!(
            id.id_string(),
            "density-1-0-Arial-style-normal-weight-normal-size-19-0"
        );
    }

    #[test]
    fn id_string_matches_format_with_nonzero_fraction() {
        let id = FontIdentity::new(1.5, "Arial", Some("italic".into()), Some("bold".into()), 19.5);
        assert_eq!(
            id.id_string(),
            "density-1-5-Arial-style-italic-weight-bold-size-19-5"
        );
    }

    #[test]
    fn equality_is_by_id_string() {
        let a = FontIdentity::new(1.0, "Arial", None, None, 19.0);
        let b = FontIdentity::new(1.0, "Arial", None, None, 19.0);
        assert_eq!(a, b);
    }

    #[test]
    fn round_trip_through_parse() {
        let id = FontIdentity::new(2.0, "Helvetica", Some("italic".into()), Some("bold".into()), 14.0);
        let parsed = FontIdentity::parse(id.id_string()).unwrap();
        assert_eq!(id, parsed);
        assert_eq!(parsed.font_family(), "Helvetica");
        assert_eq!(parsed.font_style(), "italic");
        assert_eq!(parsed.font_weight(), "bold");
        assert_eq!(parsed.pixel_density(), 2.0);
        assert_eq!(parsed.font_size(), 14.0);
    }
}
