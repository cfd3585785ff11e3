//! EIP-712 typed data encoding.
//!
//! Messages are carried as `serde_json::Value` objects and described by a
//! [`Types`] map, the same shape wallets receive in `eth_signTypedData_v4`.
//! The encoder produces type hashes, struct hashes, domain separators and
//! the final `0x19 0x01` signing digest.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::{B256, I256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::TypedDataDomain;
use crate::keccak::{keccak256, Keccak256};
use crate::utils::{hex_to_bytes, parse_u256};
use crate::{Error, Result};

/// A single `(name, type)` member of a struct definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Struct name to ordered member list.
pub type Types = BTreeMap<String, Vec<TypedDataField>>;

/// A complete typed data payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub types: Types,
    pub primary_type: String,
    pub domain: TypedDataDomain,
    pub message: Value,
}

impl TypedData {
    /// The digest a wallet signs for this payload.
    pub fn signing_hash(&self) -> Result<B256> {
        signing_hash(&self.domain, &self.primary_type, &self.message, &self.types)
    }
}

/// Render the canonical type string, e.g. `Order(uint256 salt,address maker,...)`.
///
/// Members appear in declaration order. Struct types referenced from the
/// primary type are appended after it, sorted by name.
pub fn encode_type(primary_type: &str, types: &Types) -> Result<String> {
    let mut deps = BTreeSet::new();
    collect_dependencies(primary_type, types, &mut deps)?;
    deps.remove(primary_type);

    let mut out = String::new();
    for name in std::iter::once(primary_type).chain(deps.iter().map(String::as_str)) {
        let fields = lookup(name, types)?;
        out.push_str(name);
        out.push('(');
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&field.kind);
            out.push(' ');
            out.push_str(&field.name);
        }
        out.push(')');
    }
    Ok(out)
}

fn collect_dependencies(name: &str, types: &Types, found: &mut BTreeSet<String>) -> Result<()> {
    if found.contains(name) {
        return Ok(());
    }
    let fields = lookup(name, types)?;
    found.insert(name.to_string());

    for field in fields {
        let base = field.kind.split('[').next().unwrap_or(&field.kind);
        if types.contains_key(base) {
            collect_dependencies(base, types, found)?;
        }
    }
    Ok(())
}

fn lookup<'a>(name: &str, types: &'a Types) -> Result<&'a Vec<TypedDataField>> {
    types
        .get(name)
        .ok_or_else(|| Error::MissingMember(format!("type {name}")))
}

/// `keccak256(encode_type(primary_type))`.
pub fn type_hash(primary_type: &str, types: &Types) -> Result<B256> {
    Ok(keccak256(encode_type(primary_type, types)?))
}

/// Encode one member value into its 32-byte word.
pub fn encode_value(kind: &str, value: &Value, types: &Types) -> Result<B256> {
    if kind.ends_with(']') {
        return Err(Error::UnsupportedType(kind.to_string()));
    }
    if types.contains_key(kind) {
        return hash_struct(kind, value, types);
    }

    match kind {
        "string" => {
            let s = value
                .as_str()
                .ok_or_else(|| Error::invalid_value(kind, "expected a string"))?;
            Ok(keccak256(s.as_bytes()))
        }
        "bytes" => Ok(keccak256(hex_to_bytes(expect_str(kind, value)?)?)),
        "address" => {
            let s = expect_str(kind, value)?;
            let bytes = hex_to_bytes(s).map_err(|_| Error::InvalidAddress(s.to_string()))?;
            if bytes.len() != 20 {
                return Err(Error::InvalidAddress(format!(
                    "{s}: expected 20 bytes, got {}",
                    bytes.len()
                )));
            }
            Ok(B256::left_padding_from(&bytes))
        }
        "bool" => match value {
            Value::Bool(b) => Ok(B256::from(U256::from(*b as u8).to_be_bytes::<32>())),
            _ => Err(Error::invalid_value(kind, "expected a boolean")),
        },
        _ => {
            if let Some(bits) = kind.strip_prefix("uint") {
                encode_uint(kind, parse_bits(kind, bits)?, value)
            } else if let Some(bits) = kind.strip_prefix("int") {
                encode_int(kind, parse_bits(kind, bits)?, value)
            } else if let Some(len) = kind.strip_prefix("bytes") {
                encode_fixed_bytes(kind, len, value)
            } else {
                Err(Error::UnsupportedType(kind.to_string()))
            }
        }
    }
}

fn expect_str<'a>(kind: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::invalid_value(kind, "expected a hex string"))
}

/// Width of `uintN`/`intN`; bare `uint`/`int` mean 256.
fn parse_bits(kind: &str, bits: &str) -> Result<usize> {
    if bits.is_empty() {
        return Ok(256);
    }
    match bits.parse::<usize>() {
        Ok(n) if n > 0 && n <= 256 && n % 8 == 0 => Ok(n),
        _ => Err(Error::UnsupportedType(kind.to_string())),
    }
}

fn encode_uint(kind: &str, bits: usize, value: &Value) -> Result<B256> {
    let n = match value {
        Value::Number(num) => match num.as_u64() {
            Some(v) => U256::from(v),
            None => {
                return Err(Error::invalid_value(
                    kind,
                    format!("{num} is not a non-negative integer; pass large values as strings"),
                ))
            }
        },
        Value::String(s) => parse_u256(s)?,
        _ => return Err(Error::invalid_value(kind, "expected an integer")),
    };
    if bits < 256 && n.bit_len() > bits {
        return Err(Error::NumericOverflow(format!("{n} does not fit in {kind}")));
    }
    Ok(B256::from(n.to_be_bytes::<32>()))
}

fn encode_int(kind: &str, bits: usize, value: &Value) -> Result<B256> {
    let text = match value {
        Value::Number(num) if num.is_i64() || num.is_u64() => num.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(Error::invalid_value(kind, "expected an integer")),
    };
    let n = I256::from_dec_str(&text)
        .map_err(|_| Error::NumericOverflow(format!("{text} does not fit in {kind}")))?;

    if bits < 256 {
        let max = I256::from_raw((U256::from(1u8) << (bits - 1)) - U256::from(1u8));
        let min = -max - I256::ONE;
        if n > max || n < min {
            return Err(Error::NumericOverflow(format!("{text} does not fit in {kind}")));
        }
    }
    // Two's complement, sign extended to 256 bits
    Ok(B256::from(n.to_be_bytes::<32>()))
}

fn encode_fixed_bytes(kind: &str, len: &str, value: &Value) -> Result<B256> {
    let size = match len.parse::<usize>() {
        Ok(n) if (1..=32).contains(&n) => n,
        _ => return Err(Error::UnsupportedType(kind.to_string())),
    };
    let bytes = hex_to_bytes(expect_str(kind, value)?)?;
    if bytes.len() > size {
        return Err(Error::invalid_value(
            kind,
            format!("{} bytes given, at most {size} allowed", bytes.len()),
        ));
    }
    Ok(B256::right_padding_from(&bytes))
}

/// `typeHash ‖ encodeValue(member)...` for every declared member.
pub fn encode_struct(primary_type: &str, message: &Value, types: &Types) -> Result<Vec<u8>> {
    let fields = lookup(primary_type, types)?;
    let object = message
        .as_object()
        .ok_or_else(|| Error::invalid_value(primary_type, "expected a JSON object"))?;

    let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));
    encoded.extend_from_slice(type_hash(primary_type, types)?.as_slice());

    for field in fields {
        let value = object
            .get(&field.name)
            .ok_or_else(|| Error::MissingMember(format!("{primary_type}.{}", field.name)))?;
        encoded.extend_from_slice(encode_value(&field.kind, value, types)?.as_slice());
    }
    Ok(encoded)
}

/// `keccak256(encode_struct(...))`.
pub fn hash_struct(primary_type: &str, message: &Value, types: &Types) -> Result<B256> {
    Ok(keccak256(encode_struct(primary_type, message, types)?))
}

/// Domain type string and encoded members, covering only the fields present.
pub fn encode_domain(domain: &TypedDataDomain) -> (String, Vec<u8>) {
    let mut members: Vec<&str> = Vec::with_capacity(5);
    let mut encoded = Vec::with_capacity(32 * 6);
    encoded.extend_from_slice(&[0u8; 32]);

    if let Some(name) = &domain.name {
        members.push("string name");
        encoded.extend_from_slice(keccak256(name.as_bytes()).as_slice());
    }
    if let Some(version) = &domain.version {
        members.push("string version");
        encoded.extend_from_slice(keccak256(version.as_bytes()).as_slice());
    }
    if let Some(chain_id) = domain.chain_id {
        members.push("uint256 chainId");
        encoded.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    }
    if let Some(contract) = &domain.verifying_contract {
        members.push("address verifyingContract");
        encoded.extend_from_slice(B256::left_padding_from(contract.as_slice()).as_slice());
    }
    if let Some(salt) = &domain.salt {
        members.push("bytes32 salt");
        encoded.extend_from_slice(salt.as_slice());
    }

    let type_string = format!("EIP712Domain({})", members.join(","));
    encoded[..32].copy_from_slice(keccak256(type_string.as_bytes()).as_slice());
    (type_string, encoded)
}

/// Domain separator.
pub fn hash_domain(domain: &TypedDataDomain) -> B256 {
    keccak256(encode_domain(domain).1)
}

/// `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ structHash)`.
pub fn signing_hash(
    domain: &TypedDataDomain,
    primary_type: &str,
    message: &Value,
    types: &Types,
) -> Result<B256> {
    let struct_hash = hash_struct(primary_type, message, types)?;
    Ok(typed_data_digest(hash_domain(domain), struct_hash))
}

pub(crate) fn typed_data_digest(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(&[0x19, 0x01]);
    hasher.update(domain_separator.as_slice());
    hasher.update(struct_hash.as_slice());
    B256::from(hasher.finalize())
}
