//! Recursive length prefix encoding.

use alloy_primitives::U256;

use crate::utils::trim_leading_zeros;

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xc0;

/// Payloads shorter than this use the single-byte length form.
const SHORT_LIMIT: usize = 56;

fn encode_length(len: usize, offset: u8, out: &mut Vec<u8>) {
    if len < SHORT_LIMIT {
        out.push(offset + len as u8);
    } else {
        let len_bytes = len.to_be_bytes();
        let len_bytes = trim_leading_zeros(&len_bytes);
        out.push(offset + 55 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

/// Encode a byte string.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < STRING_OFFSET {
        return vec![bytes[0]];
    }
    let mut out = Vec::with_capacity(bytes.len() + 9);
    encode_length(bytes.len(), STRING_OFFSET, &mut out);
    out.extend_from_slice(bytes);
    out
}

/// Encode a big-endian integer in minimal form. Zero encodes as the empty string.
pub fn encode_uint(be_bytes: &[u8]) -> Vec<u8> {
    encode_bytes(trim_leading_zeros(be_bytes))
}

pub fn encode_u64(value: u64) -> Vec<u8> {
    encode_uint(&value.to_be_bytes())
}

pub fn encode_u128(value: u128) -> Vec<u8> {
    encode_uint(&value.to_be_bytes())
}

pub fn encode_u256(value: U256) -> Vec<u8> {
    encode_uint(&value.to_be_bytes::<32>())
}

/// Wrap already-encoded items in a list header.
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len: usize = items.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(payload_len + 9);
    encode_length(payload_len, LIST_OFFSET, &mut out);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}
