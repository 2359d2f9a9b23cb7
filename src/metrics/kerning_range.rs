//! Kerning-range compressor/expander (component C7): the two-pass
//! left/right range notation used inside the minified blob's `k` field,
//! with later-entry-wins override precedence.

use crate::error::BitfontError;
use crate::metrics::types::KerningTable;

fn corrupted(identity: &str, reason: String) -> BitfontError {
    BitfontError::CorruptedAsset {
        identity: identity.to_string(),
        reason,
    }
}

fn position(character_set: &[char], c: char) -> Option<usize> {
    character_set.iter().position(|&x| x == c)
}

/// Pass 1: expands one compressed-left key into the concrete characters it
/// denotes. A key of exactly `X-Y` where both `X` and `Y` exist in
/// `character_set` and `X` does not come after `Y` expands to the
/// inclusive range between them (in the character set's own order);
/// everything else must be a single literal character.
fn expand_left_key(key: &str, character_set: &[char], identity: &str) -> Result<Vec<char>, BitfontError> {
    let chars: Vec<char> = key.chars().collect();

    if chars.len() == 3 && chars[1] == '-' {
        if let (Some(px), Some(py)) = (position(character_set, chars[0]), position(character_set, chars[2])) {
            if px <= py {
                return Ok(character_set[px..=py].to_vec());
            }
        }
    }

    if chars.len() == 1 {
        return Ok(vec![chars[0]]);
    }

    Err(corrupted(
        identity,
        format!("kerning left key {key:?} is neither a valid range nor a single character"),
    ))
}

/// Pass 2: expands one compressed-right "compact character string",
/// parsed left to right. A literal `-` is a member if it isn't the left
/// endpoint of a recognized `X-Y` range; a range is only recognized when
/// both endpoints exist in `character_set` and the left endpoint does not
/// come after the right one.
pub(crate) fn expand_compact_right_string(key: &str, character_set: &[char]) -> Vec<char> {
    let chars: Vec<char> = key.chars().collect();
    let mut result = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '-' {
            result.push('-');
            i += 1;
            continue;
        }

        if i + 2 < chars.len() && chars[i + 1] == '-' {
            let (x, y) = (chars[i], chars[i + 2]);
            if let (Some(px), Some(py)) = (position(character_set, x), position(character_set, y)) {
                if px <= py {
                    result.extend_from_slice(&character_set[px..=py]);
                    i += 3;
                    continue;
                }
            }
        }

        result.push(chars[i]);
        i += 1;
    }

    result
}

/// Pass 3 + assembly: dereferences each `kv_index` and applies the two
/// expansion passes above, with later entries in `k` overwriting earlier
/// ones for any pair they both cover.
pub fn expand_kerning_table(
    k: &[(String, Vec<(String, usize)>)],
    kv: &[f64],
    character_set: &[char],
    identity: &str,
) -> Result<KerningTable, BitfontError> {
    let mut table = KerningTable::new();

    for (left_key, rights) in k {
        let left_chars = expand_left_key(left_key, character_set, identity)?;

        for (right_key, kv_index) in rights {
            let value = *kv.get(*kv_index).ok_or_else(|| {
                corrupted(identity, format!("kerning value index {kv_index} out of range"))
            })?;
            let adjustment = value.round() as i32;
            let right_chars = expand_compact_right_string(right_key, character_set);

            for &l in &left_chars {
                for &r in &right_chars {
                    table.set(l, r, adjustment);
                }
            }
        }
    }

    Ok(table)
}

/// Conservative inverse of [`expand_kerning_table`]: emits one
/// single-character left key and one single-character right key per
/// non-zero pair. This always round-trips (§4.5 explicitly allows a
/// conservative, singletons-only compressor), at the cost of not
/// minimizing size the way a range-aware compressor would.
pub fn compress_kerning_table(
    table: &KerningTable,
) -> (Vec<f64>, Vec<(String, Vec<(String, usize)>)>) {
    let mut kv: Vec<f64> = Vec::new();
    let mut kv_index_of = |value: f64| -> usize {
        if let Some(pos) = kv.iter().position(|&v| v == value) {
            pos
        } else {
            kv.push(value);
            kv.len() - 1
        }
    };

    let mut by_left: Vec<(char, Vec<(char, i32)>)> = Vec::new();
    for (l, r, adjustment) in table.iter() {
        match by_left.iter_mut().find(|(left, _)| *left == l) {
            Some((_, rights)) => rights.push((r, adjustment)),
            None => by_left.push((l, vec![(r, adjustment)])),
        }
    }
    by_left.sort_by_key(|(l, _)| *l);

    let mut k = Vec::with_capacity(by_left.len());
    for (l, mut rights) in by_left {
        rights.sort_by_key(|(r, _)| *r);
        let entries = rights
            .into_iter()
            .map(|(r, adjustment)| (r.to_string(), kv_index_of(f64::from(adjustment))))
            .collect();
        k.push((l.to_string(), entries));
    }

    (kv, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charset() -> Vec<char> {
        ('0'..='9').chain('A'..='Z').collect()
    }

    #[test]
    fn left_range_expands_to_every_pair() {
        // {"A-C": {"0-2": 20}}
        let k = vec![("A-C".to_string(), vec![("0-2".to_string(), 0)])];
        let kv = vec![20.0];
        let table = expand_kerning_table(&k, &kv, &charset(), "id").unwrap();

        for l in ['A', 'B', 'C'] {
            for r in ['0', '1', '2'] {
                assert_eq!(table.get(l, r), 20, "{l}{r}");
            }
        }
        assert_eq!(table.get('D', '0'), 0);
        assert_eq!(table.get('A', '3'), 0);
    }

    #[test]
    fn later_entry_overrides_earlier_range() {
        // {"A-C": {"X": 10}, "B": {"X": 99}}
        let charset: Vec<char> = ('A'..='Z').collect();
        let k = vec![
            ("A-C".to_string(), vec![("X".to_string(), 0)]),
            ("B".to_string(), vec![("X".to_string(), 1)]),
        ];
        let kv = vec![10.0, 99.0];
        let table = expand_kerning_table(&k, &kv, &charset, "id").unwrap();

        assert_eq!(table.get('A', 'X'), 10);
        assert_eq!(table.get('B', 'X'), 99);
        assert_eq!(table.get('C', 'X'), 10);
    }

    #[test]
    fn compress_then_expand_round_trips() {
        let mut table = KerningTable::new();
        table.set('A', 'V', -50);
        table.set('A', 'W', -50);
        table.set('T', 'o', -30);

        let (kv, k) = compress_kerning_table(&table);
        let expanded = expand_kerning_table(&k, &kv, &('A'..='z').collect::<Vec<_>>(), "id").unwrap();

        assert_eq!(expanded.get('A', 'V'), -50);
        assert_eq!(expanded.get('A', 'W'), -50);
        assert_eq!(expanded.get('T', 'o'), -30);
        assert_eq!(expanded.get('A', 'o'), 0);
    }
}
