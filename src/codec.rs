//! Fixed-point quantization plus the zig-zag varint and base64 primitives
//! that back the minified metrics blob (component C2).

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use crate::error::BitfontError;

/// Scale applied before rounding a float metric to its quantized integer
/// form. `decode` is `int as f64 / QUANTIZE_SCALE`.
pub const QUANTIZE_SCALE: f64 = 10_000.0;

/// `round(value * 10000)`.
pub fn quantize(value: f64) -> i64 {
    (value * QUANTIZE_SCALE).round() as i64
}

/// `int / 10000`.
pub fn dequantize(value: i64) -> f64 {
    value as f64 / QUANTIZE_SCALE
}

/// Zig-zag maps a signed integer to an unsigned one so that small-magnitude
/// negatives encode as small varints too: `0, -1, 1, -2, 2, ...` become
/// `0, 1, 2, 3, 4, ...`.
fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

fn zigzag_decode(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

/// Encodes one zig-zag varint: 7 bits per byte, LSB-first, continuation bit
/// in the MSB of every byte but the last.
pub fn encode_varint(n: i64, out: &mut Vec<u8>) {
    let mut u = zigzag_encode(n);
    loop {
        let mut byte = (u & 0x7f) as u8;
        u >>= 7;
        if u != 0 {
            byte |= 0x80;
            out.push(byte);
        } else {
            out.push(byte);
            break;
        }
    }
}

/// Decodes one zig-zag varint starting at `bytes[*pos]`, advancing `*pos`
/// past it.
pub fn decode_varint(bytes: &[u8], pos: &mut usize) -> Result<i64, BitfontError> {
    let mut result: u64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = *bytes.get(*pos).ok_or_else(|| BitfontError::CorruptedAsset {
            identity: String::new(),
            reason: "varint ran past end of buffer".to_string(),
        })?;
        *pos += 1;

        result |= u64::from(byte & 0x7f) << shift;

        if byte & 0x80 == 0 {
            break;
        }

        shift += 7;
        if shift >= 64 {
            return Err(BitfontError::CorruptedAsset {
                identity: String::new(),
                reason: "varint overflowed 64 bits".to_string(),
            });
        }
    }

    Ok(zigzag_decode(result))
}

/// Decodes every varint in `bytes` until exhausted.
pub fn decode_varints(bytes: &[u8]) -> Result<Vec<i64>, BitfontError> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        out.push(decode_varint(bytes, &mut pos)?);
    }
    Ok(out)
}

/// Emits the first element absolute, then successive differences, each
/// varint-encoded. `values` is expected sorted ascending, but this function
/// does not itself require it (it degrades to larger varints otherwise).
pub fn encode_deltas(values: &[i64]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut prev = 0i64;
    for (i, &v) in values.iter().enumerate() {
        if i == 0 {
            encode_varint(v, &mut out);
        } else {
            encode_varint(v - prev, &mut out);
        }
        prev = v;
    }
    out
}

/// Inverse of [`encode_deltas`]: reconstructs the original sequence by
/// prefix-summing the decoded varints.
pub fn decode_deltas(bytes: &[u8]) -> Result<Vec<i64>, BitfontError> {
    let diffs = decode_varints(bytes)?;
    let mut out = Vec::with_capacity(diffs.len());
    let mut running = 0i64;
    for (i, d) in diffs.into_iter().enumerate() {
        if i == 0 {
            running = d;
        } else {
            running += d;
        }
        out.push(running);
    }
    Ok(out)
}

/// Standard (RFC 4648) base64, no line breaks.
pub fn to_base64(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

pub fn from_base64(s: &str) -> Result<Vec<u8>, BitfontError> {
    BASE64_STANDARD
        .decode(s)
        .map_err(|e| BitfontError::CorruptedAsset {
            identity: String::new(),
            reason: format!("invalid base64: {e}"),
        })
}
