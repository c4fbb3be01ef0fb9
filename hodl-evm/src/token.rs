//! ERC-20 metadata resolution.
//!
//! [`resolve_tokens`] fetches symbol, decimals, name and optionally a holder
//! balance for a set of tokens in a single batch, substituting the fallbacks
//! from [`hodl::token`] for every call that fails. The single-token helpers
//! below it issue direct calls and surface failures instead.

use std::collections::{BTreeMap, HashSet};

use alloy_primitives::{Address, U256};
use hodl::token::FALLBACK_DECIMALS;
use hodl::{ChecksummedAddress, TokenAmount, TokenInfo};
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::abi::{decode_string, decode_uint, decode_uint8};
use crate::batch::{CallBatcher, CallDescriptor, CallResult};
use crate::chain::ChainContext;
use crate::contract::IERC20;
use crate::error::EvmError;
use crate::provider::{EvmReadProvider, call_contract};

/// Resolves metadata for `tokens`, with balances of `holder` if given.
///
/// Duplicate addresses are collapsed. The result has one entry per distinct
/// input token; a token whose calls all fail still appears with fallback values.
#[cfg_attr(feature = "telemetry", instrument(skip_all, fields(chain = chain.key(), tokens = tokens.len())))]
pub async fn resolve_tokens<P: EvmReadProvider>(
    chain: &ChainContext<P>,
    tokens: &[Address],
    holder: Option<Address>,
) -> BTreeMap<ChecksummedAddress, TokenInfo> {
    let mut seen = HashSet::with_capacity(tokens.len());
    let unique = tokens
        .iter()
        .copied()
        .filter(|token| seen.insert(*token))
        .collect::<Vec<_>>();
    if unique.is_empty() {
        return BTreeMap::new();
    }

    let stride = if holder.is_some() { 4 } else { 3 };
    let mut calls = Vec::with_capacity(unique.len() * stride);
    for &token in &unique {
        calls.push(CallDescriptor::of(token, &IERC20::symbolCall {}));
        calls.push(CallDescriptor::of(token, &IERC20::decimalsCall {}));
        calls.push(CallDescriptor::of(token, &IERC20::nameCall {}));
        if let Some(account) = holder {
            calls.push(CallDescriptor::of(token, &IERC20::balanceOfCall { account }));
        }
    }

    let results = CallBatcher::for_chain(chain).execute(&calls).await;
    unique
        .into_iter()
        .zip(results.chunks(stride))
        .map(|(token, chunk)| {
            let info = token_from_results(token, chunk, holder.is_some());
            (info.address, info)
        })
        .collect()
}

fn token_from_results(token: Address, results: &[CallResult], with_balance: bool) -> TokenInfo {
    let mut info = TokenInfo::fallback(token.into());
    if let Some(symbol) = results.first().and_then(decoded_string) {
        info.symbol = symbol;
    }
    info.decimals = results
        .get(1)
        .and_then(CallResult::data)
        .and_then(decode_uint8)
        .unwrap_or(FALLBACK_DECIMALS);
    if let Some(name) = results.get(2).and_then(decoded_string) {
        info.name = name;
    }
    if with_balance {
        let balance = results
            .get(3)
            .and_then(CallResult::data)
            .map_or(U256::ZERO, decode_uint);
        info.balance = Some(balance.into());
    }
    info
}

/// Decodes a non-empty string from a successful call.
fn decoded_string(result: &CallResult) -> Option<String> {
    result
        .data()
        .map(decode_string)
        .filter(|s| !s.is_empty())
}

/// Reads symbol, decimals and name of one token with direct calls.
///
/// A failing `name()` falls back to the symbol.
///
/// # Errors
///
/// Fails if `symbol()` or `decimals()` fails.
#[cfg_attr(feature = "telemetry", instrument(skip(chain), fields(chain = chain.key()), err))]
pub async fn token_info<P: EvmReadProvider>(
    chain: &ChainContext<P>,
    token: Address,
) -> Result<TokenInfo, EvmError> {
    let provider = chain.provider();
    let symbol = call_contract(provider, token, &IERC20::symbolCall {}).await?;
    let decimals = call_contract(provider, token, &IERC20::decimalsCall {}).await?;
    let name = match call_contract(provider, token, &IERC20::nameCall {}).await {
        Ok(name) => name,
        Err(error) => {
            tracing::debug!(%token, %error, "name() failed, using symbol");
            symbol.clone()
        }
    };
    Ok(TokenInfo {
        address: token.into(),
        symbol,
        decimals,
        name,
        balance: None,
    })
}

/// Reads the `holder` balance of `token`.
///
/// # Errors
///
/// Fails if the `balanceOf` call fails.
#[cfg_attr(feature = "telemetry", instrument(skip(chain), fields(chain = chain.key()), err))]
pub async fn balance_of<P: EvmReadProvider>(
    chain: &ChainContext<P>,
    token: Address,
    holder: Address,
) -> Result<TokenAmount, EvmError> {
    let balance = call_contract(
        chain.provider(),
        token,
        &IERC20::balanceOfCall { account: holder },
    )
    .await?;
    Ok(balance.into())
}
