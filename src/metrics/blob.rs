//! The on-disk minified metrics blob (§6): a JSON-shaped 8-element tuple
//! `[kv, k, b, v, t, g, s, cl]`. This module only handles the tuple's wire
//! shape; §4.4/§4.5's actual encode/decode semantics live in
//! [`crate::metrics::expand`] and [`crate::metrics::minify`].

use serde_json::Value;

use crate::error::BitfontError;

/// The `v` value pool accepts either shape on decode (§9 Open Question):
/// an older plain integer array, or the newer base64-encoded,
/// delta+varint-encoded string. Minify always re-emits [`ValuePool::Delta`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValuePool {
    Legacy(Vec<i64>),
    Delta(String),
}

impl ValuePool {
    pub fn decode(&self, identity: &str) -> Result<Vec<i64>, BitfontError> {
        match self {
            ValuePool::Legacy(values) => Ok(values.clone()),
            ValuePool::Delta(b64) => {
                let bytes = crate::codec::from_base64(b64).map_err(|e| retag(e, identity))?;
                crate::codec::decode_deltas(&bytes).map_err(|e| retag(e, identity))
            }
        }
    }

    pub fn from_sorted_values(sorted: &[i64]) -> Self {
        let bytes = crate::codec::encode_deltas(sorted);
        ValuePool::Delta(crate::codec::to_base64(&bytes))
    }
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

/// The raw 8-tuple blob, typed but not yet semantically decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetricsBlob {
    pub kv: Vec<i64>,
    /// compressed-left -> compressed-right -> index into `kv`.
    pub k: Vec<(String, Vec<(String, usize)>)>,
    pub b: [i64; 6],
    pub v: ValuePool,
    /// base64-encoded, zig-zag-varint flattened tuplet pool.
    pub t: String,
    /// base64-encoded, one byte per character (sorted order).
    pub g: String,
    pub s: Option<f64>,
    pub cl: Option<u32>,
}

impl FontMetricsBlob {
    pub fn to_json(&self) -> Value {
        let v_json = match &self.v {
            ValuePool::Legacy(values) => Value::Array(values.iter().map(|&n| Value::from(n)).collect()),
            ValuePool::Delta(s) => Value::String(s.clone()),
        };

        let k_json = Value::Object(
            self.k
                .iter()
                .map(|(left, rights)| {
                    let obj = serde_json::Map::from_iter(
                        rights.iter().map(|(right, idx)| (right.clone(), Value::from(*idx))),
                    );
                    (left.clone(), Value::Object(obj))
                })
                .collect(),
        );

        Value::Array(vec![
            Value::Array(self.kv.iter().map(|&n| Value::from(n)).collect()),
            k_json,
            Value::Array(self.b.iter().map(|&n| Value::from(n)).collect()),
            v_json,
            Value::String(self.t.clone()),
            Value::String(self.g.clone()),
            match self.s {
                Some(s) => Value::from(s),
                None => Value::Null,
            },
            match self.cl {
                Some(cl) => Value::from(cl),
                None => Value::Null,
            },
        ])
    }

    pub fn from_json(value: &Value, identity: &str) -> Result<Self, BitfontError> {
        let arr = value.as_array().ok_or_else(|| BitfontError::CorruptedAsset {
            identity: identity.to_string(),
            reason: "metrics blob is not a JSON array".to_string(),
        })?;

        if arr.len() != 8 {
            return Err(BitfontError::CorruptedAsset {
                identity: identity.to_string(),
                reason: format!("metrics blob has arity {} (expected 8)", arr.len()),
            });
        }

        let err = |reason: &str| BitfontError::CorruptedAsset {
            identity: identity.to_string(),
            reason: reason.to_string(),
        };

        let kv = arr[0]
            .as_array()
            .ok_or_else(|| err("kv is not an array"))?
            .iter()
            .map(|v| v.as_i64().ok_or_else(|| err("kv element is not an integer")))
            .collect::<Result<Vec<_>, _>>()?;

        let k_obj = arr[1].as_object().ok_or_else(|| err("k is not an object"))?;
        let mut k = Vec::with_capacity(k_obj.len());
        for (left, rights_val) in k_obj {
            let rights_obj = rights_val
                .as_object()
                .ok_or_else(|| err("k's right-side entry is not an object"))?;
            let mut rights = Vec::with_capacity(rights_obj.len());
            for (right, idx_val) in rights_obj {
                let idx = idx_val
                    .as_u64()
                    .ok_or_else(|| err("kv index is not a non-negative integer"))?
                    as usize;
                rights.push((right.clone(), idx));
            }
            k.push((left.clone(), rights));
        }

        let b_arr = arr[2].as_array().ok_or_else(|| err("b is not an array"))?;
        if b_arr.len() != 6 {
            return Err(err("b does not have exactly 6 elements"));
        }
        let mut b = [0i64; 6];
        for (i, slot) in b.iter_mut().enumerate() {
            *slot = b_arr[i].as_i64().ok_or_else(|| err("b element is not an integer"))?;
        }

        let v = match &arr[3] {
            Value::String(s) => ValuePool::Delta(s.clone()),
            Value::Array(values) => ValuePool::Legacy(
                values
                    .iter()
                    .map(|v| v.as_i64().ok_or_else(|| err("v element is not an integer")))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            _ => return Err(err("v is neither a string nor an array")),
        };

        let t = arr[4].as_str().ok_or_else(|| err("t is not a string"))?.to_string();
        let g = arr[5].as_str().ok_or_else(|| err("g is not a string"))?.to_string();

        let s = match &arr[6] {
            Value::Null => None,
            Value::Number(n) => Some(n.as_f64().ok_or_else(|| err("s is not a valid number"))?),
            _ => return Err(err("s is neither null nor a number")),
        };

        let cl = match &arr[7] {
            Value::Null => None,
            Value::Number(n) => Some(n.as_u64().ok_or_else(|| err("cl is not a non-negative integer"))? as u32),
            _ => return Err(err("cl is neither null nor a non-negative integer")),
        };

        Ok(Self { kv, k, b, v, t, g, s, cl })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blob(k: Vec<(String, Vec<(String, usize)>)>) -> FontMetricsBlob {
        FontMetricsBlob {
            kv: vec![1, 2],
            k,
            b: [0; 6],
            v: ValuePool::Legacy(vec![]),
            t: String::new(),
            g: String::new(),
            s: None,
            cl: None,
        }
    }

    #[test]
    fn k_object_round_trips_in_insertion_order_not_alphabetical() {
        // "B" is written before "A-C": an alphabetically-sorted decode
        // would apply "A-C" first and let "B" lose, inverting the
        // later-entry-wins override precedence §4.5 requires.
        let blob = sample_blob(vec![
            ("B".to_string(), vec![("X".to_string(), 0)]),
            ("A-C".to_string(), vec![("Y".to_string(), 1)]),
        ]);

        let json = blob.to_json();
        let decoded = FontMetricsBlob::from_json(&json, "id").unwrap();

        assert_eq!(decoded.k[0].0, "B");
        assert_eq!(decoded.k[1].0, "A-C");
    }
}
