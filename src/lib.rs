#![allow(clippy::too_many_arguments)]

#[macro_use]
mod macros;

mod convert;

pub mod atlas;
pub mod codec;
pub mod draw;
pub mod error;
pub mod identity;
pub mod layout;
pub mod loader;
pub mod metrics;
pub mod spec;
pub mod store;
pub mod text;

pub use crate::draw::draw_text_from_atlas;
pub use crate::error::BitfontError;
pub use crate::identity::FontIdentity;
pub use crate::layout::{advance, measure_text};
pub use crate::loader::{LoadOutcome, Loader, ResourceLoader};
pub use crate::metrics::{FontMetrics, FontMetricsBlob};
pub use crate::spec::{parse_spec, FontCorrections, Spec};
pub use crate::store::{AtlasData, AtlasStore, MetricsStore};
pub use crate::text::{RgbColor, Status, TextAlign, TextBaseline, TextMetrics, TextProperties};
