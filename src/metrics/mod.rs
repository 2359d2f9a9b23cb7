pub mod blob;
pub mod expand;
pub mod kerning_range;
pub mod minify;
pub mod tuplet;
pub mod types;

pub use blob::{FontMetricsBlob, ValuePool};
pub use expand::expand_metrics;
pub use minify::minify_metrics;
pub use tuplet::Tuplet;
pub use types::{CharacterMetrics, CommonMetrics, FontMetrics, KerningTable, ResolvedCharacterMetrics};
