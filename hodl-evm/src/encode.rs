//! Unsigned transaction builders.
//!
//! Each builder validates its inputs and returns the target address and call
//! data for a wallet to sign. Nothing here touches the network.

use alloy_primitives::{Address, Bytes, U256};
use hodl::{ChecksummedAddress, ContractVersion, HodlError};
use serde::Serialize;

use crate::abi::encode_call;
use crate::contract::{IERC20, IERC20Mintable, IHodlLock};

/// Call data ready to be signed and sent by a client wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedCall {
    /// `0x`-prefixed call data.
    pub data: Bytes,
    /// Transaction target, EIP-55 checksummed.
    pub to: ChecksummedAddress,
    /// Number of tokens in a lock transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,
}

impl EncodedCall {
    fn new(to: Address, data: Bytes) -> Self {
        Self {
            data,
            to: to.into(),
            token_count: None,
        }
    }
}

/// Parameters of a lock transaction, normalized to parallel lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRequest {
    /// Tokens to lock.
    pub tokens: Vec<Address>,
    /// Amount per token, same order as `tokens`.
    pub amounts: Vec<U256>,
    /// Lock duration in seconds.
    pub lock_period: U256,
    /// Receiver of the lock NFT.
    pub beneficiary: Address,
}

impl LockRequest {
    fn validate(&self) -> Result<(), HodlError> {
        if self.tokens.is_empty() {
            return Err(HodlError::invalid_argument("At least one token is required"));
        }
        if self.tokens.len() != self.amounts.len() {
            return Err(HodlError::invalid_argument(format!(
                "Got {} tokens but {} amounts",
                self.tokens.len(),
                self.amounts.len()
            )));
        }
        Ok(())
    }
}

/// `approve(lockContract, amount)` on `token`.
#[must_use]
pub fn approve(lock_contract: Address, token: Address, amount: U256) -> EncodedCall {
    let data = encode_call(&IERC20::approveCall {
        spender: lock_contract,
        amount,
    });
    EncodedCall::new(token, data)
}

/// Lock transaction for the contract generation of the chain.
///
/// Multi-token contracts receive `lockMultipleTokens` for any number of
/// tokens; single-token contracts receive `lockTokens` and accept exactly one.
///
/// # Errors
///
/// Fails on empty or mismatched lists, and on several tokens for a
/// single-token contract.
pub fn lock(
    lock_contract: Address,
    version: ContractVersion,
    request: LockRequest,
) -> Result<EncodedCall, HodlError> {
    match version {
        ContractVersion::MultiToken => multi_token_lock(lock_contract, request),
        ContractVersion::SingleToken => {
            request.validate()?;
            let [token] = request.tokens[..] else {
                return Err(HodlError::invalid_argument(
                    "This chain's lock contract accepts a single token per lock",
                ));
            };
            let data = encode_call(&IHodlLock::lockTokensCall {
                token,
                amount: request.amounts[0],
                lockPeriod: request.lock_period,
                beneficiary: request.beneficiary,
            });
            Ok(EncodedCall {
                token_count: Some(1),
                ..EncodedCall::new(lock_contract, data)
            })
        }
    }
}

/// `lockMultipleTokens(tokens, amounts, lockPeriod, beneficiary)`.
///
/// # Errors
///
/// Fails on empty or mismatched lists.
pub fn multi_token_lock(lock_contract: Address, request: LockRequest) -> Result<EncodedCall, HodlError> {
    request.validate()?;
    let token_count = request.tokens.len();
    let data = encode_call(&IHodlLock::lockMultipleTokensCall {
        tokens: request.tokens,
        amounts: request.amounts,
        lockPeriod: request.lock_period,
        beneficiary: request.beneficiary,
    });
    Ok(EncodedCall {
        token_count: Some(token_count),
        ..EncodedCall::new(lock_contract, data)
    })
}

/// Index-based `claimTokens(token, lockIndex)`.
#[must_use]
pub fn claim_index(lock_contract: Address, token: Address, lock_index: U256) -> EncodedCall {
    let data = encode_call(&IHodlLock::claimTokens_0Call {
        token,
        lockIndex: lock_index,
    });
    EncodedCall::new(lock_contract, data)
}

/// NFT `claimTokens(tokenId)`.
#[must_use]
pub fn claim_lock(lock_contract: Address, token_id: U256) -> EncodedCall {
    let data = encode_call(&IHodlLock::claimTokens_1Call { tokenId: token_id });
    EncodedCall::new(lock_contract, data)
}

/// `claimMultipleTokens(tokenId)`.
#[must_use]
pub fn claim_multi_token(lock_contract: Address, token_id: U256) -> EncodedCall {
    let data = encode_call(&IHodlLock::claimMultipleTokensCall { tokenId: token_id });
    EncodedCall::new(lock_contract, data)
}

/// Test-token faucet `mint(to, amount)` on `token`.
#[must_use]
pub fn mint(token: Address, to: Address, amount: U256) -> EncodedCall {
    let data = encode_call(&IERC20Mintable::mintCall { to, amount });
    EncodedCall::new(token, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, hex};
    use alloy_sol_types::SolCall;

    const LOCK: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    const TOKEN: Address = address!("0x1000000000000000000000000000000000000001");
    const USER: Address = address!("0x3000000000000000000000000000000000000003");

    fn request(tokens: Vec<Address>, amounts: Vec<u64>) -> LockRequest {
        LockRequest {
            tokens,
            amounts: amounts.into_iter().map(U256::from).collect(),
            lock_period: U256::from(86_400u64),
            beneficiary: USER,
        }
    }

    #[test]
    fn test_approve_targets_token() {
        let call = approve(LOCK, TOKEN, U256::from(5u64));
        assert_eq!(call.to, TOKEN.into());
        let decoded = IERC20::approveCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.spender, LOCK);
        assert_eq!(decoded.amount, U256::from(5u64));
    }

    #[test]
    fn test_multi_token_lock_encodes_lists() {
        let call = lock(
            LOCK,
            ContractVersion::MultiToken,
            request(vec![TOKEN, USER], vec![1, 2]),
        )
        .unwrap();
        assert_eq!(call.to, LOCK.into());
        assert_eq!(call.token_count, Some(2));
        let decoded = IHodlLock::lockMultipleTokensCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.tokens, [TOKEN, USER]);
        assert_eq!(decoded.beneficiary, USER);
    }

    #[test]
    fn test_lock_rejects_bad_lists() {
        for version in [ContractVersion::MultiToken, ContractVersion::SingleToken] {
            assert!(lock(LOCK, version, request(vec![], vec![])).is_err());
            assert!(lock(LOCK, version, request(vec![TOKEN], vec![1, 2])).is_err());
        }
    }

    #[test]
    fn test_single_token_lock() {
        let call = lock(LOCK, ContractVersion::SingleToken, request(vec![TOKEN], vec![9])).unwrap();
        assert_eq!(call.token_count, Some(1));
        let decoded = IHodlLock::lockTokensCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.token, TOKEN);
        assert_eq!(decoded.amount, U256::from(9u64));

        let err = lock(
            LOCK,
            ContractVersion::SingleToken,
            request(vec![TOKEN, USER], vec![1, 2]),
        )
        .unwrap_err();
        assert!(matches!(err, HodlError::InvalidArgument(_)));
    }

    #[test]
    fn test_claim_overloads_use_distinct_selectors() {
        let by_index = claim_index(LOCK, TOKEN, U256::from(0u64));
        let by_id = claim_lock(LOCK, U256::from(0u64));
        // claimTokens(address,uint256) / claimTokens(uint256)
        assert_eq!(&by_index.data[..4], &IHodlLock::claimTokens_0Call::SELECTOR);
        assert_eq!(&by_id.data[..4], &IHodlLock::claimTokens_1Call::SELECTOR);
        assert_ne!(by_index.data[..4], by_id.data[..4]);
    }

    #[test]
    fn test_mint_targets_token() {
        let call = mint(TOKEN, USER, U256::from(1u64));
        assert_eq!(call.to, TOKEN.into());
        // mint(address,uint256)
        assert_eq!(&call.data[..4], &hex!("40c10f19"));
    }

    #[test]
    fn test_encoded_call_wire_shape() {
        let json = serde_json::to_value(claim_multi_token(LOCK, U256::from(3u64))).unwrap();
        assert_eq!(json["to"], LOCK.to_checksum(None));
        assert!(json["data"].as_str().unwrap().starts_with("0x"));
        assert!(json.get("tokenCount").is_none());
    }
}
