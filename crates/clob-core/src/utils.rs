//! Hex, address and integer helpers shared by the encoders.

use alloy_primitives::{Address, U256};

use crate::keccak::keccak256;
use crate::{Error, Result};

/// Strip an optional `0x`/`0X` prefix.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode hex with an optional `0x` prefix.
///
/// Odd-length input is treated as having an implicit leading zero nibble.
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>> {
    let digits = strip_hex_prefix(s);
    if digits.len() % 2 == 1 {
        Ok(hex::decode(format!("0{digits}"))?)
    } else {
        Ok(hex::decode(digits)?)
    }
}

/// Lowercase hex, optionally `0x`-prefixed.
pub fn bytes_to_hex(bytes: &[u8], prefixed: bool) -> String {
    if prefixed {
        format!("0x{}", hex::encode(bytes))
    } else {
        hex::encode(bytes)
    }
}

/// Parse a 20-byte address from hex. Casing is not validated.
pub fn parse_address(s: &str) -> Result<Address> {
    let bytes = hex_to_bytes(s).map_err(|_| Error::InvalidAddress(s.to_string()))?;
    if bytes.len() != 20 {
        return Err(Error::InvalidAddress(format!(
            "{s}: expected 20 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes))
}

/// EIP-55 mixed-case checksum rendering of an address.
pub fn to_checksum_address(s: &str) -> Result<String> {
    let address = parse_address(s)?;
    Ok(checksum(&address))
}

pub(crate) fn checksum(address: &Address) -> String {
    let lower = hex::encode(address.as_slice());
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Lowercase `0x`-prefixed address.
pub(crate) fn lower_address(address: &Address) -> String {
    bytes_to_hex(address.as_slice(), true)
}

/// Parse an unsigned 256-bit integer from a decimal or `0x`-hex string.
pub fn parse_u256(s: &str) -> Result<U256> {
    let trimmed = s.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        let bytes = hex_to_bytes(trimmed)?;
        let significant = bytes.iter().skip_while(|b| **b == 0).count();
        if significant > 32 {
            return Err(Error::NumericOverflow(format!("{trimmed} exceeds 32 bytes")));
        }
        return Ok(U256::from_be_slice(&bytes[bytes.len() - significant..]));
    }

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::invalid_value("uint256", format!("not a decimal integer: {s:?}")));
    }
    U256::from_str_radix(trimmed, 10)
        .map_err(|_| Error::NumericOverflow(format!("{trimmed} exceeds 32 bytes")))
}

/// Minimal big-endian bytes of an integer; zero is empty.
pub(crate) fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip_both_modes() {
        let samples: [&[u8]; 4] = [&[], &[0x00], &[0xde, 0xad, 0xbe, 0xef], &[0xff; 65]];
        for bytes in samples {
            assert_eq!(hex_to_bytes(&bytes_to_hex(bytes, true)).unwrap(), bytes);
            assert_eq!(hex_to_bytes(&bytes_to_hex(bytes, false)).unwrap(), bytes);
        }
    }

    #[test]
    fn test_hex_odd_length_and_upper_prefix() {
        assert_eq!(hex_to_bytes("0xabc").unwrap(), vec![0x0a, 0xbc]);
        assert_eq!(hex_to_bytes("0XFF").unwrap(), vec![0xff]);
        assert!(hex_to_bytes("0xzz").is_err());
    }

    #[test]
    fn test_parse_address() {
        let addr = parse_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
        assert_eq!(addr.as_slice()[0], 0xf3);

        assert!(matches!(
            parse_address("0x1234"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_address("not-an-address"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_checksum_address() {
        assert_eq!(
            to_checksum_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        // EIP-55 reference vector
        assert_eq!(
            to_checksum_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn test_checksum_matches_alloy() {
        let addr = parse_address("0x2791bca1f2de4661ed88a30c99a7a9449aa84174").unwrap();
        assert_eq!(checksum(&addr), addr.to_checksum(None));
    }

    #[test]
    fn test_parse_u256() {
        assert_eq!(parse_u256("0").unwrap(), U256::ZERO);
        assert_eq!(parse_u256("0xff").unwrap(), U256::from(255u64));
        assert_eq!(
            parse_u256("18446744073709551616").unwrap(),
            U256::from(1u128 << 64)
        );
        assert_eq!(
            parse_u256(
                "115792089237316195423570985008687907853269984665640564039457584007913129639935"
            )
            .unwrap(),
            U256::MAX
        );
    }

    #[test]
    fn test_parse_u256_overflow() {
        assert!(matches!(
            parse_u256(
                "115792089237316195423570985008687907853269984665640564039457584007913129639936"
            ),
            Err(Error::NumericOverflow(_))
        ));
        assert!(matches!(
            parse_u256(&format!("0x01{}", "00".repeat(32))),
            Err(Error::NumericOverflow(_))
        ));
        assert!(matches!(parse_u256("-1"), Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn test_trim_leading_zeros() {
        assert_eq!(trim_leading_zeros(&[0, 0, 1, 0]), &[1, 0]);
        assert!(trim_leading_zeros(&[0, 0]).is_empty());
    }
}
