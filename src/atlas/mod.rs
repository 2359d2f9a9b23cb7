pub mod image;
pub mod repack;
pub mod scanner;

pub use image::{AtlasImage, DefaultImageFactory, ImageFactory, IntRect};
pub use repack::{repack_atlas, AtlasPositioning, GlyphPosition};
pub use scanner::scan_tight_bounds;
