//! Metrics expander (component C5): minified blob -> kerning table +
//! per-character metrics + common baselines.

use hashbrown::HashMap;

use crate::codec::{dequantize, from_base64};
use crate::error::BitfontError;
use crate::metrics::blob::FontMetricsBlob;
use crate::metrics::kerning_range::expand_kerning_table;
use crate::metrics::tuplet::Tuplet;
use crate::metrics::types::{CharacterMetrics, CommonMetrics, FontMetrics};

/// Decodes `t` into the tuplet pool: splits the zig-zag varint stream on
/// negative values, undoing the 1-based shift used to distinguish zero
/// from "end of tuplet" (positive entries were stored as `value + 1`; the
/// trailing entry of each tuplet was stored as `-(value + 1)`).
fn decode_tuplet_pool(t_base64: &str, identity: &str) -> Result<Vec<Tuplet>, BitfontError> {
    let bytes = from_base64(t_base64).map_err(|e| retag(e, identity))?;
    let stream = crate::codec::decode_varints(&bytes).map_err(|e| retag(e, identity))?;

    let mut pool = Vec::new();
    let mut current: Vec<u32> = Vec::new();

    for raw in stream {
        if raw < 0 {
            let value = (-raw - 1) as u32;
            current.push(value);
            pool.push(Tuplet::from_values(&current, identity)?);
            current.clear();
        } else {
            let value = (raw - 1) as u32;
            current.push(value);
        }
    }

    if !current.is_empty() {
        return Err(BitfontError::CorruptedAsset {
            identity: identity.to_string(),
            reason: "tuplet pool stream does not end on a tuplet boundary".to_string(),
        });
    }

    Ok(pool)
}

fn retag(e: BitfontError, identity: &str) -> BitfontError {
    match e {
        BitfontError::CorruptedAsset { reason, .. } => BitfontError::CorruptedAsset {
            identity: identity.to_string(),
            reason,
        },
        other => other,
    }
}

/// Decodes a minified blob into a [`FontMetrics`].
///
/// `character_set` is the font's active character set, in the exact
/// ascending code-point order the builder used when it minified this blob
/// — the blob itself carries no character list, only a byte-per-character
/// index stream (`g`), so caller and builder must agree on this set out of
/// band (see `SPEC_FULL.md` §3's supplemental note).
pub fn expand_metrics(
    blob: &FontMetricsBlob,
    character_set: &[char],
    identity: &str,
) -> Result<FontMetrics, BitfontError> {
    let err = |reason: String| BitfontError::CorruptedAsset {
        identity: identity.to_string(),
        reason,
    };

    let value_pool = blob.v.decode(identity)?;
    let tuplet_pool = decode_tuplet_pool(&blob.t, identity)?;

    let g_bytes = from_base64(&blob.g).map_err(|e| retag(e, identity))?;
    if g_bytes.len() != character_set.len() {
        return Err(err(format!(
            "g has {} entries but character set has {}",
            g_bytes.len(),
            character_set.len()
        )));
    }

    let lookup_value = |idx: u32| -> Result<f64, BitfontError> {
        let v = value_pool
            .get(idx as usize)
            .copied()
            .ok_or_else(|| err(format!("value pool index {idx} out of range")))?;
        Ok(dequantize(v))
    };

    let mut characters = HashMap::with_capacity(character_set.len());
    for (&c, &tuplet_index) in character_set.iter().zip(g_bytes.iter()) {
        let tuplet = tuplet_pool
            .get(tuplet_index as usize)
            .ok_or_else(|| err(format!("tuplet index {tuplet_index} out of range")))?;

        let [w, l, r, a, d] = tuplet.expand(blob.cl, identity)?;

        characters.insert(
            c,
            CharacterMetrics {
                width: lookup_value(w)?,
                actual_bounding_box_left: lookup_value(l)?,
                actual_bounding_box_right: lookup_value(r)?,
                actual_bounding_box_ascent: lookup_value(a)?,
                actual_bounding_box_descent: lookup_value(d)?,
            },
        );
    }

    let common = CommonMetrics {
        font_bounding_box_ascent: dequantize(blob.b[0]),
        font_bounding_box_descent: dequantize(blob.b[1]),
        hanging_baseline: dequantize(blob.b[2]),
        alphabetic_baseline: dequantize(blob.b[3]),
        ideographic_baseline: dequantize(blob.b[4]),
        pixel_density: dequantize(blob.b[5]),
    };

    let kv: Vec<f64> = blob.kv.iter().map(|&n| dequantize(n)).collect();
    let kerning = expand_kerning_table(&blob.k, &kv, character_set, identity)?;

    Ok(FontMetrics {
        common,
        characters,
        kerning,
        space_advancement_override_for_small_sizes: blob.s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::blob::ValuePool;

    fn ascii_charset() -> Vec<char> {
        (0x20u32..=0x7e).filter_map(char::from_u32).collect()
    }

    #[test]
    fn decodes_length_3_tuplet_case_c() {
        // width=10.5, left=0, right=10.5, ascent=13.5, descent=0
        let values = vec![
            crate::codec::quantize(10.5),
            crate::codec::quantize(0.0),
            crate::codec::quantize(13.5),
        ];
        let v_pool = ValuePool::from_sorted_values(&{
            let mut sorted = values.clone();
            sorted.sort_unstable();
            sorted.dedup();
            sorted
        });

        // indices into the now-sorted/deduped pool
        let decoded_pool = v_pool.decode("id").unwrap();
        let idx_of = |target: i64| decoded_pool.iter().position(|&x| x == target).unwrap() as u32;

        let w_idx = idx_of(crate::codec::quantize(10.5));
        let l_idx = idx_of(crate::codec::quantize(0.0));
        let a_idx = idx_of(crate::codec::quantize(13.5));

        // Build `t` as one length-3 tuplet [w, l, a] for a single character.
        let mut stream = Vec::new();
        crate::codec::encode_varint((w_idx + 1) as i64, &mut stream);
        crate::codec::encode_varint((l_idx + 1) as i64, &mut stream);
        crate::codec::encode_varint(-((a_idx + 1) as i64) - 1, &mut stream);
        let t = crate::codec::to_base64(&stream);

        let g = crate::codec::to_base64(&[0u8]);

        let blob = FontMetricsBlob {
            kv: vec![],
            k: vec![],
            b: [0; 6],
            v: v_pool,
            t,
            g,
            s: None,
            cl: None,
        };

        let metrics = expand_metrics(&blob, &['A'], "id").unwrap();
        let m = metrics.characters[&'A'];
        assert!((m.width - 10.5).abs() < 1e-4);
        assert!((m.actual_bounding_box_left - 0.0).abs() < 1e-4);
        assert!((m.actual_bounding_box_right - 10.5).abs() < 1e-4);
        assert!((m.actual_bounding_box_ascent - 13.5).abs() < 1e-4);
        assert!((m.actual_bounding_box_descent - 0.0).abs() < 1e-4);
    }

    #[test]
    fn length_2_tuplet_without_cl_is_corrupted() {
        let mut stream = Vec::new();
        crate::codec::encode_varint(1, &mut stream);
        crate::codec::encode_varint(-2, &mut stream);
        let t = crate::codec::to_base64(&stream);
        let g = crate::codec::to_base64(&[0u8]);

        let blob = FontMetricsBlob {
            kv: vec![],
            k: vec![],
            b: [0; 6],
            v: ValuePool::Legacy(vec![0, 0]),
            t,
            g,
            s: None,
            cl: None,
        };

        let err = expand_metrics(&blob, &['A'], "id").unwrap_err();
        assert!(matches!(err, BitfontError::CorruptedAsset { .. }));
    }

    #[test]
    fn mismatched_g_length_is_corrupted() {
        let blob = FontMetricsBlob {
            kv: vec![],
            k: vec![],
            b: [0; 6],
            v: ValuePool::Legacy(vec![]),
            t: crate::codec::to_base64(&[]),
            g: crate::codec::to_base64(&[0u8, 0u8]),
            s: None,
            cl: None,
        };
        let err = expand_metrics(&blob, &ascii_charset()[0..1], "id").unwrap_err();
        assert!(matches!(err, BitfontError::CorruptedAsset { .. }));
    }
}
