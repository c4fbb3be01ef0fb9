//! ABI codec for call data and raw return words.
//!
//! Outbound call data is produced by the `sol!` bindings in
//! [`contract`](crate::contract), which follow the Solidity ABI byte for byte.
//!
//! Inbound return data of the batched path is decoded by hand. Multicall hands
//! back opaque `bytes` per sub-call, and tokens that ignore the ERC-20 standard
//! (bytes32 symbols, empty strings, reverts) are common, so the decoders here
//! never fail: malformed input maps to an empty string or zero and the caller
//! substitutes its documented fallback.

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolCall;

/// Size of one ABI word.
pub const WORD: usize = 32;

/// ABI-encodes a contract call: 4-byte selector followed by the encoded arguments.
#[must_use]
pub fn encode_call<C: SolCall>(call: &C) -> Bytes {
    call.abi_encode().into()
}

/// Decodes a dynamic `string` return value.
///
/// Layout: `[0, 32)` offset (assumed canonical and ignored), `[32, 64)`
/// big-endian byte length, `[64, 64 + length)` UTF-8 payload.
///
/// Returns an empty string if the input is shorter than two words, if the
/// declared length runs past the end of the input, or if the payload is not
/// valid UTF-8.
#[must_use]
pub fn decode_string(data: &[u8]) -> String {
    if data.len() < 2 * WORD {
        return String::new();
    }
    let declared = U256::from_be_slice(&data[WORD..2 * WORD]);
    let Ok(length) = usize::try_from(declared) else {
        return String::new();
    };
    let Some(end) = (2 * WORD).checked_add(length) else {
        return String::new();
    };
    if end > data.len() {
        return String::new();
    }
    std::str::from_utf8(&data[2 * WORD..end])
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Decodes the first word of `data` as a big-endian unsigned integer.
///
/// Input shorter than one word decodes to zero. Bytes past the first word are
/// ignored.
#[must_use]
pub fn decode_uint(data: &[u8]) -> U256 {
    if data.len() < WORD {
        return U256::ZERO;
    }
    U256::from_be_slice(&data[..WORD])
}

/// Decodes a `uint8` return value such as `decimals()`.
///
/// Unlike [`decode_uint`], short input is reported as `None` rather than zero,
/// since a zero-decimals token and a missing `decimals()` must not be confused.
/// Values that do not fit in a `u8` are also rejected.
#[must_use]
pub fn decode_uint8(data: &[u8]) -> Option<u8> {
    if data.len() < WORD {
        return None;
    }
    u8::try_from(decode_uint(data)).ok()
}
