//! Shared request/response shapes for the layout and drawing API (§6):
//! [`TextProperties`], [`TextMetrics`] and [`Status`].

/// An RGB color used for text tinting. Defaults to black, matching the
/// atlas's pre-rasterized glyph color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for RgbColor {
    fn default() -> Self {
        Self { r: 0, g: 0, b: 0 }
    }
}

/// `"bottom"` is the only supported baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Bottom,
}

/// `"left"` is the only supported alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextProperties {
    pub is_kerning_enabled: bool,
    pub text_baseline: TextBaseline,
    pub text_align: TextAlign,
    pub text_color: RgbColor,
}

impl Default for TextProperties {
    fn default() -> Self {
        Self {
            is_kerning_enabled: true,
            text_baseline: TextBaseline::default(),
            text_align: TextAlign::default(),
            text_color: RgbColor::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    pub actual_bounding_box_left: f64,
    pub actual_bounding_box_right: f64,
    pub font_bounding_box_ascent: f64,
    pub font_bounding_box_descent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    NoMetrics,
    PartialMetrics,
    NoAtlas,
    PartialAtlas,
}
