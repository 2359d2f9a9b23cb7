//! Metrics minifier (component C6): the inverse of [`crate::metrics::expand`],
//! producing the smallest legal minified-blob representation for a
//! [`FontMetrics`].

use hashbrown::HashMap;

use crate::codec::{quantize, to_base64};
use crate::convert::{cast_u32, cast_u8};
use crate::error::BitfontError;
use crate::metrics::blob::{FontMetricsBlob, ValuePool};
use crate::metrics::kerning_range::compress_kerning_table;
use crate::metrics::tuplet::Tuplet;
use crate::metrics::types::FontMetrics;

/// Tuplet pool indices are stored as single bytes in `g`.
const MAX_DISTINCT_TUPLETS: usize = 256;

/// Encodes `metrics` into its minified blob. `identity` is used only for
/// error messages.
pub fn minify_metrics(metrics: &FontMetrics, identity: &str) -> Result<FontMetricsBlob, BitfontError> {
    let characters = metrics.sorted_characters();

    let mut raw_tuples: HashMap<char, [i64; 5]> = HashMap::with_capacity(characters.len());
    for &c in &characters {
        let m = &metrics.characters[&c];
        raw_tuples.insert(
            c,
            [
                quantize(m.width),
                quantize(m.actual_bounding_box_left),
                quantize(m.actual_bounding_box_right),
                quantize(m.actual_bounding_box_ascent),
                quantize(m.actual_bounding_box_descent),
            ],
        );
    }

    // Deduplicated, ascending-sorted value pool so `ValuePool::Delta`
    // compresses well.
    let mut pool_values: Vec<i64> = raw_tuples.values().flat_map(|arr| arr.iter().copied()).collect();
    pool_values.sort_unstable();
    pool_values.dedup();

    let index_of_value = |v: i64| -> u32 {
        cast_u32(pool_values.binary_search(&v).expect("value must be present in its own pool"))
    };

    let mut indexed_tuples: HashMap<char, [u32; 5]> = HashMap::with_capacity(characters.len());
    for (&c, raw) in &raw_tuples {
        indexed_tuples.insert(c, raw.map(index_of_value));
    }

    // Pick the most frequent `left` index among characters as the common-left
    // candidate; ties broken by smallest index for determinism.
    let common_left = {
        let mut freq: HashMap<u32, usize> = HashMap::new();
        for indexed in indexed_tuples.values() {
            *freq.entry(indexed[1]).or_insert(0) += 1;
        }
        freq.into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(left, _)| left)
    };

    let mut tuplet_pool: Vec<Tuplet> = Vec::new();
    let mut tuplet_index_of: HashMap<Tuplet, usize> = HashMap::new();
    let mut g_bytes = Vec::with_capacity(characters.len());
    let mut used_length_2 = false;

    for &c in &characters {
        let full = indexed_tuples[&c];
        let tuplet = Tuplet::compress(full, common_left);
        if matches!(tuplet, Tuplet::L2(_)) {
            used_length_2 = true;
        }

        let index = *tuplet_index_of.entry(tuplet).or_insert_with(|| {
            tuplet_pool.push(tuplet);
            tuplet_pool.len() - 1
        });

        if tuplet_pool.len() > MAX_DISTINCT_TUPLETS {
            return Err(BitfontError::CorruptedAsset {
                identity: identity.to_string(),
                reason: format!(
                    "font has more than {MAX_DISTINCT_TUPLETS} distinct metric tuplets; cannot encode g as one byte per character"
                ),
            });
        }

        g_bytes.push(cast_u8(index));
    }

    let mut t_stream = Vec::new();
    for tuplet in &tuplet_pool {
        let values = tuplet.as_slice();
        for (i, &v) in values.iter().enumerate() {
            let is_last = i == values.len() - 1;
            let stored = if is_last {
                -(i64::from(v) + 1)
            } else {
                i64::from(v) + 1
            };
            crate::codec::encode_varint(stored, &mut t_stream);
        }
    }

    let (kv, k) = compress_kerning_table(&metrics.kerning);

    let b = [
        quantize(metrics.common.font_bounding_box_ascent),
        quantize(metrics.common.font_bounding_box_descent),
        quantize(metrics.common.hanging_baseline),
        quantize(metrics.common.alphabetic_baseline),
        quantize(metrics.common.ideographic_baseline),
        quantize(metrics.common.pixel_density),
    ];

    Ok(FontMetricsBlob {
        kv: kv.into_iter().map(quantize).collect(),
        k,
        b,
        v: ValuePool::from_sorted_values(&pool_values),
        t: to_base64(&t_stream),
        g: to_base64(&g_bytes),
        s: metrics.space_advancement_override_for_small_sizes,
        cl: if used_length_2 { common_left } else { None },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::expand::expand_metrics;
    use crate::metrics::types::{CharacterMetrics, CommonMetrics};
    use quickcheck_macros::quickcheck;

    fn sample_metrics() -> FontMetrics {
        let mut metrics = FontMetrics {
            common: CommonMetrics {
                font_bounding_box_ascent: 15.0,
                font_bounding_box_descent: 4.0,
                hanging_baseline: 13.0,
                alphabetic_baseline: 0.0,
                ideographic_baseline: -4.0,
                pixel_density: 1.0,
            },
            ..Default::default()
        };

        metrics.characters.insert(
            'A',
            CharacterMetrics {
                width: 10.0,
                actual_bounding_box_left: 0.0,
                actual_bounding_box_right: 10.0,
                actual_bounding_box_ascent: 13.0,
                actual_bounding_box_descent: 0.0,
            },
        );
        metrics.characters.insert(
            'B',
            CharacterMetrics {
                width: 9.0,
                actual_bounding_box_left: 1.0,
                actual_bounding_box_right: 8.0,
                actual_bounding_box_ascent: 13.0,
                actual_bounding_box_descent: 2.0,
            },
        );
        metrics.characters.insert(
            ' ',
            CharacterMetrics {
                width: 4.0,
                actual_bounding_box_left: 0.0,
                actual_bounding_box_right: 0.0,
                actual_bounding_box_ascent: 0.0,
                actual_bounding_box_descent: 0.0,
            },
        );
        metrics.kerning.set('A', 'B', -50);

        metrics
    }

    #[test]
    fn round_trips_through_expand() {
        let metrics = sample_metrics();
        let character_set = metrics.sorted_characters();
        let blob = minify_metrics(&metrics, "id").unwrap();
        let decoded = expand_metrics(&blob, &character_set, "id").unwrap();

        for &c in &character_set {
            let original = metrics.characters[&c];
            let got = decoded.characters[&c];
            assert!((original.width - got.width).abs() <= 5e-5);
            assert!((original.actual_bounding_box_left - got.actual_bounding_box_left).abs() <= 5e-5);
            assert!((original.actual_bounding_box_right - got.actual_bounding_box_right).abs() <= 5e-5);
            assert!((original.actual_bounding_box_ascent - got.actual_bounding_box_ascent).abs() <= 5e-5);
            assert!((original.actual_bounding_box_descent - got.actual_bounding_box_descent).abs() <= 5e-5);
        }

        assert_eq!(decoded.kerning.get('A', 'B'), -50);
        assert!((decoded.common.font_bounding_box_ascent - metrics.common.font_bounding_box_ascent).abs() <= 5e-5);
        assert!((decoded.common.pixel_density - metrics.common.pixel_density).abs() <= 5e-5);
    }

    #[quickcheck]
    fn round_trip_arbitrary_single_char(width: u16, left: u16, ascent: u16) -> bool {
        let mut metrics = FontMetrics::default();
        metrics.characters.insert(
            'Z',
            CharacterMetrics {
                width: f64::from(width),
                actual_bounding_box_left: f64::from(left),
                actual_bounding_box_right: f64::from(width),
                actual_bounding_box_ascent: f64::from(ascent),
                actual_bounding_box_descent: f64::from(left),
            },
        );

        let blob = minify_metrics(&metrics, "id").unwrap();
        let decoded = expand_metrics(&blob, &['Z'], "id").unwrap();
        let got = decoded.characters[&'Z'];

        (got.width - f64::from(width)).abs() <= 5e-5
            && (got.actual_bounding_box_left - f64::from(left)).abs() <= 5e-5
    }
}
