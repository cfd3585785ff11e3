//! ABI calldata for the ERC-20 / ERC-1155 approval calls.

use alloy_primitives::{Address, Bytes, U256};

use crate::{Error, Result};

/// ERC-20 `approve(address,uint256)` selector.
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// ERC-1155 `setApprovalForAll(address,bool)` selector.
pub const SET_APPROVAL_FOR_ALL_SELECTOR: [u8; 4] = [0xa2, 0x2c, 0xb4, 0x65];

/// ERC-20 `allowance(address,address)` selector.
pub const ALLOWANCE_SELECTOR: [u8; 4] = [0xdd, 0x62, 0xed, 0x3e];

/// ERC-1155 `isApprovedForAll(address,address)` selector.
pub const IS_APPROVED_FOR_ALL_SELECTOR: [u8; 4] = [0xe9, 0x85, 0xe9, 0xc5];

/// One static ABI argument, already padded to a 32-byte word.
type Word = [u8; 32];

fn address_word(address: Address) -> Word {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

fn uint_word(value: U256) -> Word {
    value.to_be_bytes::<32>()
}

fn bool_word(value: bool) -> Word {
    let mut word = [0u8; 32];
    word[31] = value as u8;
    word
}

fn encode_call(selector: [u8; 4], words: &[Word]) -> Bytes {
    let mut data = Vec::with_capacity(4 + 32 * words.len());
    data.extend_from_slice(&selector);
    for word in words {
        data.extend_from_slice(word);
    }
    Bytes::from(data)
}

/// Build calldata for `approve(spender, amount)`.
pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    encode_call(APPROVE_SELECTOR, &[address_word(spender), uint_word(amount)])
}

/// Build calldata for `setApprovalForAll(operator, approved)`.
pub fn encode_set_approval_for_all(operator: Address, approved: bool) -> Bytes {
    encode_call(
        SET_APPROVAL_FOR_ALL_SELECTOR,
        &[address_word(operator), bool_word(approved)],
    )
}

/// Build calldata for `allowance(owner, spender)`.
pub fn encode_allowance(owner: Address, spender: Address) -> Bytes {
    encode_call(
        ALLOWANCE_SELECTOR,
        &[address_word(owner), address_word(spender)],
    )
}

/// Build calldata for `isApprovedForAll(owner, operator)`.
pub fn encode_is_approved_for_all(owner: Address, operator: Address) -> Bytes {
    encode_call(
        IS_APPROVED_FOR_ALL_SELECTOR,
        &[address_word(owner), address_word(operator)],
    )
}

fn first_word(data: &[u8]) -> Result<&[u8]> {
    data.get(..32).ok_or_else(|| {
        Error::invalid_value("returndata", format!("expected 32 bytes, got {}", data.len()))
    })
}

/// Decode a `uint256` return value.
pub fn decode_uint256_word(data: &[u8]) -> Result<U256> {
    Ok(U256::from_be_slice(first_word(data)?))
}

/// Decode a `bool` return value.
pub fn decode_bool_word(data: &[u8]) -> Result<bool> {
    match decode_uint256_word(data)? {
        v if v.is_zero() => Ok(false),
        v if v == U256::from(1u8) => Ok(true),
        v => Err(Error::invalid_value("returndata", format!("{v} is not a bool"))),
    }
}
