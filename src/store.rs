//! Metrics/atlas stores (component C11, data half): process-wide, single
//! threaded, lock-free key-value stores keyed by identity id string.
//!
//! Per the Design Notes, the "temporary global register-atlas callback"
//! pattern is replaced by an explicit per-store pending queue: an atlas
//! that arrives before its metrics is held in [`AtlasStore`] and drained
//! when [`MetricsStore::install`] installs the matching id.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::atlas::{repack_atlas, AtlasImage, AtlasPositioning, DefaultImageFactory, ImageFactory};
use crate::error::BitfontError;
use crate::metrics::FontMetrics;

/// A tight atlas plus its positioning table, as produced by [`repack_atlas`].
#[derive(Debug, Clone)]
pub struct AtlasData {
    pub image: AtlasImage,
    pub positioning: AtlasPositioning,
}

/// `identity -> FontMetrics`. Writes happen only at load; readers observe a
/// stable snapshot via `Rc` clones, never a lock.
#[derive(Debug, Default)]
pub struct MetricsStore {
    entries: RefCell<HashMap<String, Rc<FontMetrics>>>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id_string: &str) -> Option<Rc<FontMetrics>> {
        self.entries.borrow().get(id_string).cloned()
    }

    pub fn install(&self, id_string: &str, metrics: FontMetrics) -> Rc<FontMetrics> {
        let metrics = Rc::new(metrics);
        self.entries.borrow_mut().insert(id_string.to_string(), Rc::clone(&metrics));
        metrics
    }

    pub fn reset(&self, id_string: &str) {
        self.entries.borrow_mut().remove(id_string);
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

/// `identity -> AtlasData`, plus the pending-atlas queue for atlases that
/// arrived before their metrics.
#[derive(Debug, Default)]
pub struct AtlasStore {
    entries: RefCell<HashMap<String, Rc<AtlasData>>>,
    pending: RefCell<HashMap<String, AtlasImage>>,
}

impl AtlasStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id_string: &str) -> Option<Rc<AtlasData>> {
        self.entries.borrow().get(id_string).cloned()
    }

    fn install(&self, id_string: &str, data: AtlasData) -> Rc<AtlasData> {
        let data = Rc::new(data);
        self.entries.borrow_mut().insert(id_string.to_string(), Rc::clone(&data));
        data
    }

    /// Registers a raw source atlas. If `metrics` has already been
    /// installed for this id, repacks and installs immediately; otherwise
    /// the source image is held until [`drain_pending`] is called for this
    /// id. Returns `Ok(Some(..))` if repacking happened now.
    pub fn register(
        &self,
        id_string: &str,
        source: AtlasImage,
        metrics: Option<&FontMetrics>,
    ) -> Result<Option<Rc<AtlasData>>, BitfontError> {
        match metrics {
            Some(metrics) => {
                let mut factory = DefaultImageFactory;
                let data = repack_with(&mut factory, &source, metrics, id_string)?;
                Ok(Some(self.install(id_string, data)))
            }
            None => {
                crate::bitfont_log!("atlas for {id_string} arrived before metrics, queuing");
                self.pending.borrow_mut().insert(id_string.to_string(), source);
                Ok(None)
            }
        }
    }

    /// Called once metrics for `id_string` have been installed: if a
    /// pending source atlas is waiting, repacks and installs it.
    pub fn drain_pending(&self, id_string: &str, metrics: &FontMetrics) -> Result<Option<Rc<AtlasData>>, BitfontError> {
        let source = self.pending.borrow_mut().remove(id_string);
        match source {
            Some(source) => {
                let mut factory = DefaultImageFactory;
                let data = repack_with(&mut factory, &source, metrics, id_string)?;
                Ok(Some(self.install(id_string, data)))
            }
            None => Ok(None),
        }
    }

    pub fn reset(&self, id_string: &str) {
        self.entries.borrow_mut().remove(id_string);
        self.pending.borrow_mut().remove(id_string);
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
        self.pending.borrow_mut().clear();
    }
}

fn repack_with(
    factory: &mut dyn ImageFactory,
    source: &AtlasImage,
    metrics: &FontMetrics,
    id_string: &str,
) -> Result<AtlasData, BitfontError> {
    let (image, positioning) = repack_atlas(source, metrics, factory, id_string)?;
    Ok(AtlasData { image, positioning })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CharacterMetrics, CommonMetrics};

    fn sample_metrics() -> FontMetrics {
        let mut metrics = FontMetrics {
            common: CommonMetrics {
                font_bounding_box_ascent: 2.0,
                font_bounding_box_descent: 0.0,
                pixel_density: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        metrics.characters.insert(
            'A',
            CharacterMetrics {
                width: 2.0,
                actual_bounding_box_left: 1.0,
                actual_bounding_box_right: 1.0,
                actual_bounding_box_ascent: 2.0,
                actual_bounding_box_descent: 0.0,
            },
        );
        metrics
    }

    #[test]
    fn atlas_arriving_before_metrics_is_queued_then_drained() {
        let metrics_store = MetricsStore::new();
        let atlas_store = AtlasStore::new();

        let mut source = AtlasImage::blank(2, 2);
        source.set_rgba_at(0, 0, [0, 0, 0, 255]);

        let result = atlas_store.register("id", source, None).unwrap();
        assert!(result.is_none());
        assert!(atlas_store.get("id").is_none());

        let metrics = metrics_store.install("id", sample_metrics());
        let drained = atlas_store.drain_pending("id", &metrics).unwrap();
        assert!(drained.is_some());
        assert!(atlas_store.get("id").is_some());
    }

    #[test]
    fn atlas_arriving_after_metrics_installs_immediately() {
        let metrics_store = MetricsStore::new();
        let atlas_store = AtlasStore::new();
        let metrics = metrics_store.install("id", sample_metrics());

        let mut source = AtlasImage::blank(2, 2);
        source.set_rgba_at(0, 0, [0, 0, 0, 255]);

        let result = atlas_store.register("id", source, Some(&metrics)).unwrap();
        assert!(result.is_some());
        assert!(atlas_store.get("id").is_some());
    }

    #[test]
    fn reset_removes_both_installed_and_pending_entries() {
        let atlas_store = AtlasStore::new();
        atlas_store.register("id", AtlasImage::blank(1, 1), None).unwrap();
        atlas_store.reset("id");
        assert!(atlas_store.drain_pending("id", &sample_metrics()).unwrap().is_none());
    }
}
