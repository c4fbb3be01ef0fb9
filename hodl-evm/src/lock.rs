//! Lock aggregation.
//!
//! [`holder_locks`] assembles every open lock of a holder in three RPC round
//! trips at most (ids, details, token metadata), whatever the number of locks
//! and tokens involved.

use std::collections::{BTreeMap, HashSet};

use alloy_primitives::{Address, U256};
use hodl::{
    AvailableTokens, ChecksummedAddress, ContractVersion, HodlError, HolderLocks, LockDetail,
    LockEntry, LockRecord, TokenAmount, TokenInfo, UserLock,
};
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::batch::{CallBatcher, CallDescriptor, CallResult};
use crate::chain::ChainContext;
use crate::contract::IHodlLock;
use crate::error::EvmError;
use crate::provider::{EvmReadProvider, call_contract};
use crate::token::resolve_tokens;

/// Lock details as read from the contract, before metadata is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawLock {
    id: U256,
    unlock_time: U256,
    claimed: bool,
    entries: Vec<(Address, U256)>,
}

impl RawLock {
    /// Builds a lock from multi-token details, rejecting mismatched
    /// `tokens`/`amounts` lengths.
    fn from_multi(id: U256, d: IHodlLock::getMultiTokenLockDetailsReturn) -> Option<Self> {
        if d.tokens.len() != d.amounts.len() {
            return None;
        }
        Some(Self {
            id,
            unlock_time: d.unlockTime,
            claimed: d.claimed,
            entries: d.tokens.into_iter().zip(d.amounts).collect(),
        })
    }

    fn from_single(id: U256, d: IHodlLock::getLockDetailsReturn) -> Self {
        Self {
            id,
            unlock_time: d.unlockTime,
            claimed: d.claimed,
            entries: vec![(d.token, d.amount)],
        }
    }

    /// Decodes the batched detail result for `id`.
    fn decode(id: U256, version: ContractVersion, result: &CallResult) -> Option<Self> {
        match version {
            ContractVersion::MultiToken => {
                Self::from_multi(id, result.decode::<IHodlLock::getMultiTokenLockDetailsCall>()?)
            }
            ContractVersion::SingleToken => Some(Self::from_single(
                id,
                result.decode::<IHodlLock::getLockDetailsCall>()?,
            )),
        }
    }

    fn into_record(self, tokens: &BTreeMap<ChecksummedAddress, TokenInfo>) -> LockRecord {
        let entries = self
            .entries
            .into_iter()
            .map(|(token, amount)| {
                let token = ChecksummedAddress(token);
                match tokens.get(&token) {
                    Some(info) => LockEntry::new(amount.into(), info),
                    None => LockEntry::new(amount.into(), &TokenInfo::fallback(token)),
                }
            })
            .collect();
        LockRecord {
            token_id: self.id.into(),
            unlock_time: self.unlock_time.into(),
            claimed: self.claimed,
            tokens: entries,
        }
    }
}

fn detail_call(lock_contract: Address, version: ContractVersion, id: U256) -> CallDescriptor {
    match version {
        ContractVersion::MultiToken => CallDescriptor::of(
            lock_contract,
            &IHodlLock::getMultiTokenLockDetailsCall { tokenId: id },
        ),
        ContractVersion::SingleToken => {
            CallDescriptor::of(lock_contract, &IHodlLock::getLockDetailsCall { tokenId: id })
        }
    }
}

/// Returns the open locks of `holder`, ascending by unlock time.
///
/// Claimed locks, zero-amount entries, and locks left without entries are
/// dropped. Locks whose details cannot be read are skipped. Locks sharing an
/// unlock time keep the order in which the contract listed them.
///
/// # Errors
///
/// Fails if the chain has no lock contract or if `getOwnerLocks` fails.
#[cfg_attr(feature = "telemetry", instrument(skip(chain), fields(chain = chain.key()), err))]
pub async fn holder_locks<P: EvmReadProvider>(
    chain: &ChainContext<P>,
    holder: Address,
) -> Result<HolderLocks, EvmError> {
    let lock_contract = chain.require_contract()?;
    let ids = call_contract(
        chain.provider(),
        lock_contract,
        &IHodlLock::getOwnerLocksCall { owner: holder },
    )
    .await?;
    if ids.is_empty() {
        return Ok(HolderLocks::default());
    }

    let version = chain.contract_version();
    let calls = ids
        .iter()
        .map(|&id| detail_call(lock_contract, version, id))
        .collect::<Vec<_>>();
    let results = CallBatcher::for_chain(chain).execute(&calls).await;

    let mut unique_tokens = Vec::new();
    let mut seen = HashSet::new();
    let mut open = Vec::with_capacity(ids.len());
    for (&id, result) in ids.iter().zip(&results) {
        let Some(mut lock) = RawLock::decode(id, version, result) else {
            tracing::debug!(lock_id = %id, "Skipping unreadable lock");
            continue;
        };
        if lock.claimed {
            continue;
        }
        lock.entries.retain(|(_, amount)| !amount.is_zero());
        if lock.entries.is_empty() {
            continue;
        }
        for &(token, _) in &lock.entries {
            if seen.insert(token) {
                unique_tokens.push(token);
            }
        }
        open.push(lock);
    }
    if unique_tokens.is_empty() {
        return Ok(HolderLocks::default());
    }

    let metadata = resolve_tokens(chain, &unique_tokens, None).await;
    let mut locks = open
        .into_iter()
        .map(|lock| lock.into_record(&metadata))
        .collect::<Vec<_>>();
    locks.sort_by_key(|lock| lock.unlock_time);

    Ok(HolderLocks {
        locks,
        token_count: unique_tokens.len(),
    })
}

/// Reads one lock with its owner, including claimed state and zero-amount entries.
///
/// # Errors
///
/// Fails if the chain has no lock contract or if either the detail or the
/// `ownerOf` call fails.
#[cfg_attr(feature = "telemetry", instrument(skip(chain), fields(chain = chain.key()), err))]
pub async fn lock_detail<P: EvmReadProvider>(
    chain: &ChainContext<P>,
    id: U256,
) -> Result<LockDetail, EvmError> {
    let lock_contract = chain.require_contract()?;
    let provider = chain.provider();
    let lock = match chain.contract_version() {
        ContractVersion::MultiToken => {
            let details = call_contract(
                provider,
                lock_contract,
                &IHodlLock::getMultiTokenLockDetailsCall { tokenId: id },
            )
            .await?;
            RawLock::from_multi(id, details).ok_or_else(|| {
                HodlError::RpcCallFailed(format!("Lock {id} has mismatched tokens and amounts"))
            })?
        }
        ContractVersion::SingleToken => {
            let details = call_contract(
                provider,
                lock_contract,
                &IHodlLock::getLockDetailsCall { tokenId: id },
            )
            .await?;
            RawLock::from_single(id, details)
        }
    };
    let owner = call_contract(provider, lock_contract, &IHodlLock::ownerOfCall { tokenId: id }).await?;

    let tokens = lock.entries.iter().map(|&(token, _)| token).collect::<Vec<_>>();
    let metadata = resolve_tokens(chain, &tokens, None).await;
    Ok(LockDetail {
        lock: lock.into_record(&metadata),
        owner: owner.into(),
    })
}

/// Reads the index-based lock book of `user` for `token`.
///
/// # Errors
///
/// Fails if the chain has no lock contract or the call fails.
#[cfg_attr(feature = "telemetry", instrument(skip(chain), fields(chain = chain.key()), err))]
pub async fn user_locks<P: EvmReadProvider>(
    chain: &ChainContext<P>,
    user: Address,
    token: Address,
) -> Result<Vec<UserLock>, EvmError> {
    let lock_contract = chain.require_contract()?;
    let locks = call_contract(
        chain.provider(),
        lock_contract,
        &IHodlLock::getUserLocksCall { user, token },
    )
    .await?;
    Ok(locks
        .into_iter()
        .zip(0u64..)
        .map(|(lock, index)| UserLock {
            index,
            amount: lock.amount.into(),
            unlock_time: lock.unlockTime.into(),
            token: ChecksummedAddress(lock.token),
        })
        .collect())
}

/// Reads the claimable total and lock indexes of `user` for `token`.
///
/// # Errors
///
/// Fails if the chain has no lock contract or the call fails.
#[cfg_attr(feature = "telemetry", instrument(skip(chain), fields(chain = chain.key()), err))]
pub async fn available_tokens<P: EvmReadProvider>(
    chain: &ChainContext<P>,
    user: Address,
    token: Address,
) -> Result<AvailableTokens, EvmError> {
    let lock_contract = chain.require_contract()?;
    let available = call_contract(
        chain.provider(),
        lock_contract,
        &IHodlLock::getAvailableTokensCall { user, token },
    )
    .await?;
    Ok(AvailableTokens {
        total: available.total.into(),
        claimable_indexes: available
            .indexes
            .iter()
            .map(|index| index.saturating_to::<u64>())
            .collect(),
    })
}

/// Reads the total amount of `token` still locked for `user`.
///
/// # Errors
///
/// Fails if the chain has no lock contract or the call fails.
#[cfg_attr(feature = "telemetry", instrument(skip(chain), fields(chain = chain.key()), err))]
pub async fn total_locked<P: EvmReadProvider>(
    chain: &ChainContext<P>,
    user: Address,
    token: Address,
) -> Result<TokenAmount, EvmError> {
    let lock_contract = chain.require_contract()?;
    let total = call_contract(
        chain.provider(),
        lock_contract,
        &IHodlLock::getTotalLockedTokensCall { user, token },
    )
    .await?;
    Ok(total.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::IERC20;
    use crate::mock::{self, LOCK_CONTRACT, MockChain};
    use alloy_primitives::{Bytes, address};
    use alloy_sol_types::SolValue;
    use hodl::UnixTimestamp;

    const HOLDER: Address = address!("0x3000000000000000000000000000000000000003");
    const TOKEN_A: Address = address!("0x1000000000000000000000000000000000000001");
    const TOKEN_B: Address = address!("0x2000000000000000000000000000000000000002");

    fn multi_details(
        tokens: Vec<Address>,
        amounts: Vec<u64>,
        unlock_time: u64,
        claimed: bool,
    ) -> Bytes {
        let amounts = amounts.into_iter().map(U256::from).collect::<Vec<_>>();
        (tokens, amounts, U256::from(unlock_time), claimed)
            .abi_encode_params()
            .into()
    }

    fn with_locks(mock: &MockChain, locks: &[(u64, Bytes)]) {
        let ids = locks.iter().map(|(id, _)| U256::from(*id)).collect::<Vec<_>>();
        mock.respond_value(LOCK_CONTRACT, &IHodlLock::getOwnerLocksCall { owner: HOLDER }, ids);
        for (id, details) in locks {
            mock.respond(
                LOCK_CONTRACT,
                &IHodlLock::getMultiTokenLockDetailsCall {
                    tokenId: U256::from(*id),
                },
                details.clone(),
            );
        }
    }

    fn with_token(mock: &MockChain, token: Address, symbol: &str, decimals: u64) {
        mock.respond_value(token, &IERC20::symbolCall {}, symbol.to_owned());
        mock.respond_value(token, &IERC20::decimalsCall {}, U256::from(decimals));
        mock.respond_value(token, &IERC20::nameCall {}, format!("{symbol} Token"));
    }

    #[tokio::test]
    async fn test_claimed_lock_is_dropped() {
        let chain = mock::chain(MockChain::new(), true);
        let mock = chain.provider();
        with_locks(
            mock,
            &[
                (1, multi_details(vec![TOKEN_A], vec![100], 1_900_000_000, true)),
                (2, multi_details(vec![TOKEN_A], vec![500], 2_000_000_000, false)),
            ],
        );
        with_token(mock, TOKEN_A, "AAA", 6);

        let result = holder_locks(&chain, HOLDER).await.unwrap();
        assert_eq!(result.token_count, 1);
        assert_eq!(result.locks.len(), 1);
        let lock = &result.locks[0];
        assert_eq!(lock.token_id, TokenAmount::from(2));
        assert_eq!(lock.unlock_time, UnixTimestamp::from_secs(2_000_000_000));
        assert!(!lock.claimed);
        assert_eq!(lock.tokens[0].amount.to_string(), "500");
        assert_eq!(lock.tokens[0].symbol, "AAA");
        assert_eq!(lock.tokens[0].decimals, 6);
        // ids, details, metadata
        assert_eq!(mock.rpc_count(), 3);
    }

    #[tokio::test]
    async fn test_zero_amounts_are_dropped() {
        let chain = mock::chain(MockChain::new(), true);
        let mock = chain.provider();
        with_locks(
            mock,
            &[
                (1, multi_details(vec![TOKEN_A, TOKEN_B], vec![0, 0], 1_000, false)),
                (2, multi_details(vec![TOKEN_A, TOKEN_B], vec![0, 7], 2_000, false)),
            ],
        );
        with_token(mock, TOKEN_B, "BBB", 18);

        let result = holder_locks(&chain, HOLDER).await.unwrap();
        assert_eq!(result.locks.len(), 1);
        assert_eq!(result.token_count, 1);
        assert_eq!(result.locks[0].tokens.len(), 1);
        assert_eq!(result.locks[0].tokens[0].address, ChecksummedAddress(TOKEN_B));
    }

    #[tokio::test]
    async fn test_all_zero_locks_yield_empty_result() {
        let chain = mock::chain(MockChain::new(), true);
        with_locks(
            chain.provider(),
            &[(1, multi_details(vec![TOKEN_A], vec![0], 1_000, false))],
        );
        let result = holder_locks(&chain, HOLDER).await.unwrap();
        assert_eq!(result, HolderLocks::default());
        assert_eq!(chain.provider().rpc_count(), 2);
    }

    #[tokio::test]
    async fn test_locks_are_sorted_by_unlock_time_for_any_id_order() {
        let details = [
            (10, multi_details(vec![TOKEN_A], vec![1], 3_000, false)),
            (11, multi_details(vec![TOKEN_A], vec![1], 1_000, false)),
            (12, multi_details(vec![TOKEN_B], vec![1], 2_000, false)),
            (13, multi_details(vec![TOKEN_B], vec![1], 1_000, false)),
        ];
        let orders: [[usize; 4]; 3] = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1]];
        for order in orders {
            let chain = mock::chain(MockChain::new(), true);
            let permuted = order.iter().map(|&i| details[i].clone()).collect::<Vec<_>>();
            with_locks(chain.provider(), &permuted);
            let result = holder_locks(&chain, HOLDER).await.unwrap();
            let times = result
                .locks
                .iter()
                .map(|l| l.unlock_time.as_secs())
                .collect::<Vec<_>>();
            assert_eq!(times, [1_000, 1_000, 2_000, 3_000]);
            assert_eq!(result.token_count, 2);

            // Equal unlock times keep the listing order.
            let tied = result.locks[..2]
                .iter()
                .map(|l| l.token_id.to_string())
                .collect::<Vec<_>>();
            let expected = permuted
                .iter()
                .filter(|(id, _)| *id == 11 || *id == 13)
                .map(|(id, _)| id.to_string())
                .collect::<Vec<_>>();
            assert_eq!(tied, expected);
        }
    }

    #[tokio::test]
    async fn test_metadata_fallbacks_do_not_fail_the_request() {
        let chain = mock::chain(MockChain::new(), false);
        with_locks(
            chain.provider(),
            &[(1, multi_details(vec![TOKEN_A], vec![9], 1_000, false))],
        );
        let result = holder_locks(&chain, HOLDER).await.unwrap();
        let entry = &result.locks[0].tokens[0];
        assert_eq!(entry.symbol, "UNKNOWN");
        assert_eq!(entry.decimals, 18);
        assert_eq!(entry.name, "Unknown Token");
    }

    #[tokio::test]
    async fn test_unreadable_and_mismatched_locks_are_skipped() {
        let chain = mock::chain(MockChain::new(), true);
        let mock = chain.provider();
        with_locks(
            mock,
            &[
                (1, multi_details(vec![TOKEN_A, TOKEN_B], vec![5], 1_000, false)),
                (2, Bytes::from_static(&[0xde, 0xad])),
                (3, multi_details(vec![TOKEN_A], vec![5], 2_000, false)),
            ],
        );
        let result = holder_locks(&chain, HOLDER).await.unwrap();
        assert_eq!(result.locks.len(), 1);
        assert_eq!(result.locks[0].token_id, TokenAmount::from(3));
    }

    #[tokio::test]
    async fn test_no_locks() {
        let chain = mock::chain(MockChain::new(), true);
        with_locks(chain.provider(), &[]);
        let result = holder_locks(&chain, HOLDER).await.unwrap();
        assert_eq!(result, HolderLocks::default());
        assert_eq!(chain.provider().rpc_count(), 1);
    }

    #[tokio::test]
    async fn test_owner_locks_failure_is_fatal() {
        let chain = mock::chain(MockChain::new(), true);
        chain.provider().fail_transport();
        assert!(holder_locks(&chain, HOLDER).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_deployment() {
        let chain = ChainContext::new("bare", "bare", 1, MockChain::new());
        let err: HodlError = holder_locks(&chain, HOLDER).await.unwrap_err().into();
        assert_eq!(
            err,
            HodlError::ContractNotDeployed {
                chain: "bare".into()
            }
        );
        assert_eq!(chain.provider().rpc_count(), 0);
    }

    #[tokio::test]
    async fn test_single_token_contract() {
        let chain = mock::chain(MockChain::new(), true)
            .with_contract_version(ContractVersion::SingleToken);
        let mock = chain.provider();
        mock.respond_value(
            LOCK_CONTRACT,
            &IHodlLock::getOwnerLocksCall { owner: HOLDER },
            vec![U256::from(4u64), U256::from(5u64)],
        );
        for (id, amount, claimed) in [(4u64, 40u64, false), (5, 50, true)] {
            mock.respond(
                LOCK_CONTRACT,
                &IHodlLock::getLockDetailsCall {
                    tokenId: U256::from(id),
                },
                (TOKEN_A, U256::from(amount), U256::from(1_000u64), claimed).abi_encode_params(),
            );
        }
        with_token(mock, TOKEN_A, "AAA", 6);

        let result = holder_locks(&chain, HOLDER).await.unwrap();
        assert_eq!(result.locks.len(), 1);
        assert_eq!(result.locks[0].tokens[0].amount.to_string(), "40");
    }

    #[tokio::test]
    async fn test_lock_detail_includes_owner_and_everything() {
        let chain = mock::chain(MockChain::new(), true);
        let mock = chain.provider();
        let id = U256::from(7u64);
        mock.respond(
            LOCK_CONTRACT,
            &IHodlLock::getMultiTokenLockDetailsCall { tokenId: id },
            multi_details(vec![TOKEN_A, TOKEN_B], vec![0, 3], 1_000, true),
        );
        mock.respond_value(LOCK_CONTRACT, &IHodlLock::ownerOfCall { tokenId: id }, HOLDER);
        with_token(mock, TOKEN_A, "AAA", 6);

        let detail = lock_detail(&chain, id).await.unwrap();
        assert_eq!(detail.owner, ChecksummedAddress(HOLDER));
        assert!(detail.lock.claimed);
        assert_eq!(detail.lock.tokens.len(), 2);
        assert_eq!(detail.lock.tokens[0].symbol, "AAA");
        assert_eq!(detail.lock.tokens[1].symbol, "UNKNOWN");
    }

    #[tokio::test]
    async fn test_lock_detail_surfaces_failures() {
        let chain = mock::chain(MockChain::new(), true);
        assert!(lock_detail(&chain, U256::from(1u64)).await.is_err());
    }

    #[tokio::test]
    async fn test_user_locks_are_indexed() {
        let chain = mock::chain(MockChain::new(), false);
        let locks = vec![
            IHodlLock::Lock {
                amount: U256::from(10u64),
                unlockTime: U256::from(1_000u64),
                token: TOKEN_A,
            },
            IHodlLock::Lock {
                amount: U256::from(20u64),
                unlockTime: U256::from(2_000u64),
                token: TOKEN_A,
            },
        ];
        chain.provider().respond_value(
            LOCK_CONTRACT,
            &IHodlLock::getUserLocksCall {
                user: HOLDER,
                token: TOKEN_A,
            },
            locks,
        );
        let result = user_locks(&chain, HOLDER, TOKEN_A).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].index, 1);
        assert_eq!(result[1].amount.to_string(), "20");
        assert_eq!(result[1].unlock_time.as_secs(), 2_000);
    }

    #[tokio::test]
    async fn test_available_and_total() {
        let chain = mock::chain(MockChain::new(), false);
        let mock = chain.provider();
        mock.respond(
            LOCK_CONTRACT,
            &IHodlLock::getAvailableTokensCall {
                user: HOLDER,
                token: TOKEN_A,
            },
            (U256::from(30u64), vec![U256::from(0u64), U256::from(2u64)]).abi_encode_params(),
        );
        mock.respond_value(
            LOCK_CONTRACT,
            &IHodlLock::getTotalLockedTokensCall {
                user: HOLDER,
                token: TOKEN_A,
            },
            U256::from(90u64),
        );
        let available = available_tokens(&chain, HOLDER, TOKEN_A).await.unwrap();
        assert_eq!(available.total.to_string(), "30");
        assert_eq!(available.claimable_indexes, [0, 2]);
        let total = total_locked(&chain, HOLDER, TOKEN_A).await.unwrap();
        assert_eq!(total.to_string(), "90");
    }
}
