//! `Tuplet`: one character's compressed metric record.
//!
//! Rather than dispatching on array length at every read site, the decoder
//! either constructs one of these four variants or fails — the corrupted-
//! length error class from §7 is pushed to construction time, and the
//! bit-exact expansion rules from §4.4 are baked into the match arms below.

use crate::error::BitfontError;

/// Each element is an index into the value pool (`v` in the minified
/// blob).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tuplet {
    /// `[width, left, right, ascent, descent]` — no expansion needed.
    L5([u32; 5]),
    /// `[width, left, ascent, descent]` — invariant: right == width.
    L4([u32; 4]),
    /// `[width, left, ascent]` — invariants: right == width, descent == left.
    L3([u32; 3]),
    /// `[width, ascent]` — left and descent both come from the blob's
    /// common-left index.
    L2([u32; 2]),
}

impl Tuplet {
    /// Builds a tuplet from its decoded element values. Fails for any
    /// length other than 2, 3, 4, or 5.
    pub fn from_values(values: &[u32], identity: &str) -> Result<Self, BitfontError> {
        match values.len() {
            5 => Ok(Tuplet::L5([values[0], values[1], values[2], values[3], values[4]])),
            4 => Ok(Tuplet::L4([values[0], values[1], values[2], values[3]])),
            3 => Ok(Tuplet::L3([values[0], values[1], values[2]])),
            2 => Ok(Tuplet::L2([values[0], values[1]])),
            n => Err(BitfontError::CorruptedAsset {
                identity: identity.to_string(),
                reason: format!("tuplet has invalid length {n} (expected 2, 3, 4 or 5)"),
            }),
        }
    }

    /// Expands to `[width, left, right, ascent, descent]` value-pool
    /// indices. `common_left` must be `Some` if `self` is [`Tuplet::L2`].
    pub fn expand(&self, common_left: Option<u32>, identity: &str) -> Result<[u32; 5], BitfontError> {
        match *self {
            Tuplet::L5(v) => Ok(v),
            Tuplet::L4([w, l, a, d]) => Ok([w, l, w, a, d]),
            Tuplet::L3([w, l, a]) => Ok([w, l, w, a, l]),
            Tuplet::L2([w, a]) => {
                let cl = common_left.ok_or_else(|| BitfontError::CorruptedAsset {
                    identity: identity.to_string(),
                    reason: "length-2 tuplet present but blob carries no common-left index"
                        .to_string(),
                })?;
                Ok([w, cl, w, a, cl])
            }
        }
    }

    /// Picks the shortest tuplet that round-trips `[width, left, right,
    /// ascent, descent]` exactly, given the blob's common-left index (if
    /// one has been established yet). This is the inverse operation used
    /// by the minifier.
    pub fn compress(full: [u32; 5], common_left: Option<u32>) -> Self {
        let [width, left, right, ascent, descent] = full;

        if right == width && descent == left && common_left == Some(left) {
            Tuplet::L2([width, ascent])
        } else if right == width && descent == left {
            Tuplet::L3([width, left, ascent])
        } else if right == width {
            Tuplet::L4([width, left, ascent, descent])
        } else {
            Tuplet::L5(full)
        }
    }

    pub fn as_slice(&self) -> &[u32] {
        match self {
            Tuplet::L5(v) => v.as_slice(),
            Tuplet::L4(v) => v.as_slice(),
            Tuplet::L3(v) => v.as_slice(),
            Tuplet::L2(v) => v.as_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_4_expands_with_right_equal_width() {
        let t = Tuplet::L4([10, 1, 2, 3]);
        assert_eq!(t.expand(None, "id").unwrap(), [10, 1, 10, 2, 3]);
    }

    #[test]
    fn length_3_expands_with_right_equal_width_and_descent_equal_left() {
        let t = Tuplet::L3([10, 1, 2]);
        assert_eq!(t.expand(None, "id").unwrap(), [10, 1, 10, 2, 1]);
    }

    #[test]
    fn length_2_requires_common_left() {
        let t = Tuplet::L2([10, 2]);
        assert!(t.expand(None, "id").is_err());
        assert_eq!(t.expand(Some(7), "id").unwrap(), [10, 7, 10, 2, 7]);
    }

    #[test]
    fn compress_round_trips_through_expand() {
        for full in [
            [10, 0, 10, 13, 0],
            [10, 3, 7, 2, 9],
            [10, 1, 10, 2, 3],
        ] {
            let common_left = Some(full[1]);
            let compressed = Tuplet::compress(full, common_left);
            assert_eq!(compressed.expand(common_left, "id").unwrap(), full);
        }
    }
}
