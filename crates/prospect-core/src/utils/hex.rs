//! Hex (de)serialization for fixed-size byte arrays.
//!
//! Usable as a serde `with` module on `[u8; N]` fields, plus standalone
//! encode/decode helpers. Lowercase output; decoding accepts either case.

use serde::{de, Deserialize, Deserializer, Serializer};

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

/// Encodes a byte slice as a lowercase hex string.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX_CHARS[(b >> 4) as usize] as char);
        out.push(HEX_CHARS[(b & 0x0f) as usize] as char);
    }
    out
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decodes a hex string into a fixed-size array.
///
/// Fails on odd length, non-hex characters, or length mismatch.
pub fn decode_array<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let raw = s.as_bytes();
    if raw.len() != N * 2 {
        return Err(format!("expected {} hex chars, got {}", N * 2, raw.len()));
    }
    let mut out = [0u8; N];
    for (i, chunk) in raw.chunks_exact(2).enumerate() {
        let hi = nibble(chunk[0]).ok_or_else(|| format!("invalid hex char {:?}", chunk[0] as char))?;
        let lo = nibble(chunk[1]).ok_or_else(|| format!("invalid hex char {:?}", chunk[1] as char))?;
        out[i] = (hi << 4) | lo;
    }
    Ok(out)
}

pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&encode(bytes))
}

pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    decode_array(&s).map_err(de::Error::custom)
}
