//! Loader orchestration (component C11, load half): `register_metrics`,
//! `register_atlas` and `load_fonts`, plus the per-id in-flight dedup table.
//!
//! The resource-fetch mechanism is external (§4.9): the host supplies a
//! [`ResourceLoader`] — a URL fetcher, a filesystem reader, an in-memory
//! blob table — and the loader only orchestrates decode/install order and
//! load deduplication. There is no async runtime in scope here, so
//! `load_fonts` runs each fetch synchronously; the per-id [`InFlight`] slot
//! still models the dedup table the Design Notes call for, so a host that
//! drives `ResourceLoader::fetch_metrics`/`fetch_atlas` from real I/O and
//! re-enters the loader while a fetch is outstanding does not double-process
//! the same id.
//!
//! A completed `InFlight::Done` slot is kept, not discarded: §5 states that
//! once a font is installed it is immutable, so a later `load_fonts` call
//! for the same id is a legitimate dedup hit, not a stale cache entry.
//! [`Loader::forget`] drops the slot for a host that wants to force a
//! reload of an id (normally issued alongside [`MetricsStore::reset`] /
//! [`AtlasStore::reset`]).

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::atlas::AtlasImage;
use crate::error::BitfontError;
use crate::metrics::{expand_metrics, FontMetrics, FontMetricsBlob};
use crate::store::{AtlasStore, MetricsStore};

/// External resource access the loader needs per identity. Implemented by
/// the host (filesystem, network, embedded asset table).
pub trait ResourceLoader {
    /// Fetches and decodes the identity's metrics blob. `None` means the
    /// resource does not exist (a hard error for this identity).
    fn fetch_metrics(&self, id_string: &str) -> Option<FontMetricsBlob>;

    /// Fetches and decodes the identity's source atlas image. `None` means
    /// the resource does not exist (a soft error; placeholder mode).
    fn fetch_atlas(&self, id_string: &str) -> Option<AtlasImage>;

    /// The identity's active character set, in ascending code-point order.
    /// The minified blob carries no character list of its own.
    fn character_set(&self, id_string: &str) -> Vec<char>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Metrics and atlas both installed.
    Ready,
    /// Metrics installed; no atlas resource existed (placeholder mode).
    MetricsOnly,
}

enum InFlight {
    Loading,
    Done(Result<LoadOutcome, BitfontError>),
}

pub struct Loader<'a, R: ResourceLoader> {
    metrics_store: &'a MetricsStore,
    atlas_store: &'a AtlasStore,
    resources: &'a R,
    in_flight: RefCell<HashMap<String, Rc<RefCell<InFlight>>>>,
}

impl<'a, R: ResourceLoader> Loader<'a, R> {
    pub fn new(metrics_store: &'a MetricsStore, atlas_store: &'a AtlasStore, resources: &'a R) -> Self {
        Self {
            metrics_store,
            atlas_store,
            resources,
            in_flight: RefCell::new(HashMap::new()),
        }
    }

    /// Decodes and installs `blob` for `id_string`, then drains any atlas
    /// that was waiting for these metrics.
    pub fn register_metrics(&self, id_string: &str, blob: &FontMetricsBlob) -> Result<Rc<FontMetrics>, BitfontError> {
        let character_set = self.resources.character_set(id_string);
        let metrics = expand_metrics(blob, &character_set, id_string)?;
        let installed = self.metrics_store.install(id_string, metrics);
        self.atlas_store.drain_pending(id_string, &installed)?;
        Ok(installed)
    }

    /// Registers a raw source atlas: repacks immediately if metrics for
    /// this id are already installed, otherwise enqueues it.
    pub fn register_atlas(&self, id_string: &str, source: AtlasImage) -> Result<(), BitfontError> {
        let metrics = self.metrics_store.get(id_string);
        self.atlas_store.register(id_string, source, metrics.as_deref())?;
        Ok(())
    }

    /// Loads every id in `ids` independently: a failure for one id (a
    /// missing metrics resource) does not abort the others.
    pub fn load_fonts(&self, ids: &[String]) -> Vec<(String, Result<LoadOutcome, BitfontError>)> {
        ids.iter().map(|id| (id.clone(), self.load_one(id))).collect()
    }

    fn load_one(&self, id_string: &str) -> Result<LoadOutcome, BitfontError> {
        if let Some(slot) = self.in_flight.borrow().get(id_string) {
            if let InFlight::Done(result) = &*slot.borrow() {
                return result.clone();
            }
        }

        let slot = Rc::new(RefCell::new(InFlight::Loading));
        self.in_flight.borrow_mut().insert(id_string.to_string(), Rc::clone(&slot));

        let result = self.do_load(id_string);

        *slot.borrow_mut() = InFlight::Done(result.clone());

        result
    }

    /// Drops the cached in-flight/done slot for `id_string`, so the next
    /// `load_fonts` call actually re-fetches instead of returning the
    /// cached outcome. Pair with `MetricsStore::reset`/`AtlasStore::reset`
    /// when invalidating an identity.
    pub fn forget(&self, id_string: &str) {
        self.in_flight.borrow_mut().remove(id_string);
    }

    fn do_load(&self, id_string: &str) -> Result<LoadOutcome, BitfontError> {
        let blob = self.resources.fetch_metrics(id_string).ok_or_else(|| {
            crate::bitfont_warn!("no metrics resource for {id_string}");
            BitfontError::MissingMetrics {
                identity: id_string.to_string(),
            }
        })?;
        self.register_metrics(id_string, &blob)?;

        match self.resources.fetch_atlas(id_string) {
            Some(source) => {
                self.register_atlas(id_string, source)?;
                crate::bitfont_log!("font {id_string} ready");
                Ok(LoadOutcome::Ready)
            }
            None => {
                crate::bitfont_warn!("no atlas resource for {id_string}, using placeholder mode");
                Ok(LoadOutcome::MetricsOnly)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::minify_metrics;
    use crate::metrics::{CharacterMetrics, CommonMetrics};

    struct FakeResources {
        blob: FontMetricsBlob,
        atlas: Option<AtlasImage>,
        character_set: Vec<char>,
    }

    impl ResourceLoader for FakeResources {
        fn fetch_metrics(&self, _id_string: &str) -> Option<FontMetricsBlob> {
            Some(self.blob.clone())
        }
        fn fetch_atlas(&self, _id_string: &str) -> Option<AtlasImage> {
            self.atlas.clone()
        }
        fn character_set(&self, _id_string: &str) -> Vec<char> {
            self.character_set.clone()
        }
    }

    struct CountingResources {
        blob: FontMetricsBlob,
        character_set: Vec<char>,
        fetches: std::cell::Cell<u32>,
    }

    impl ResourceLoader for CountingResources {
        fn fetch_metrics(&self, _id_string: &str) -> Option<FontMetricsBlob> {
            self.fetches.set(self.fetches.get() + 1);
            Some(self.blob.clone())
        }
        fn fetch_atlas(&self, _id_string: &str) -> Option<AtlasImage> {
            None
        }
        fn character_set(&self, _id_string: &str) -> Vec<char> {
            self.character_set.clone()
        }
    }

    #[test]
    fn repeated_load_fonts_calls_dedup_via_the_in_flight_cache() {
        let metrics = sample_metrics();
        let blob = minify_metrics(&metrics, "id").unwrap();
        let resources = CountingResources {
            blob,
            character_set: vec!['A'],
            fetches: std::cell::Cell::new(0),
        };

        let metrics_store = MetricsStore::new();
        let atlas_store = AtlasStore::new();
        let loader = Loader::new(&metrics_store, &atlas_store, &resources);

        loader.load_fonts(&["id".to_string()]);
        loader.load_fonts(&["id".to_string()]);
        assert_eq!(resources.fetches.get(), 1);

        loader.forget("id");
        loader.load_fonts(&["id".to_string()]);
        assert_eq!(resources.fetches.get(), 2);
    }

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
    fn load_fonts_installs_metrics_only_when_atlas_resource_is_absent() {
        let metrics = sample_metrics();
        let blob = minify_metrics(&metrics, "id").unwrap();
        let resources = FakeResources {
            blob,
            atlas: None,
            character_set: vec!['A'],
        };

        let metrics_store = MetricsStore::new();
        let atlas_store = AtlasStore::new();
        let loader = Loader::new(&metrics_store, &atlas_store, &resources);

        let results = loader.load_fonts(&["id".to_string()]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1, Ok(LoadOutcome::MetricsOnly));
        assert!(metrics_store.get("id").is_some());
        assert!(atlas_store.get("id").is_none());
    }

    #[test]
    fn load_fonts_reaches_ready_when_both_resources_exist() {
        let metrics = sample_metrics();
        let blob = minify_metrics(&metrics, "id").unwrap();

        let mut source = AtlasImage::blank(2, 2);
        source.set_rgba_at(0, 0, [0, 0, 0, 255]);

        let resources = FakeResources {
            blob,
            atlas: Some(source),
            character_set: vec!['A'],
        };

        let metrics_store = MetricsStore::new();
        let atlas_store = AtlasStore::new();
        let loader = Loader::new(&metrics_store, &atlas_store, &resources);

        let results = loader.load_fonts(&["id".to_string()]);
        assert_eq!(results[0].1, Ok(LoadOutcome::Ready));
        assert!(atlas_store.get("id").is_some());
    }

    #[test]
    fn missing_metrics_resource_is_a_hard_error_for_that_id_only() {
        struct NoMetrics;
        impl ResourceLoader for NoMetrics {
            fn fetch_metrics(&self, _id_string: &str) -> Option<FontMetricsBlob> {
                None
            }
            fn fetch_atlas(&self, _id_string: &str) -> Option<AtlasImage> {
                None
            }
            fn character_set(&self, _id_string: &str) -> Vec<char> {
                vec![]
            }
        }

        let metrics_store = MetricsStore::new();
        let atlas_store = AtlasStore::new();
        let resources = NoMetrics;
        let loader = Loader::new(&metrics_store, &atlas_store, &resources);

        let results = loader.load_fonts(&["missing".to_string()]);
        assert!(matches!(results[0].1, Err(BitfontError::MissingMetrics { .. })));
    }
}
