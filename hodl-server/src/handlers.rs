//! Axum route handlers for the token-lock API.
//!
//! Every route below `/api/{route}` resolves the chain first; an unknown route
//! answers 404 before any RPC is made. Successful responses carry
//! `"success": true` next to the payload fields.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use hodl::{
    AvailableTokens, ChainInfo, ChecksummedAddress, ContractVersion, HodlError, HolderLocks,
    LockDetail, TokenAmount, TokenInfo, UserLock,
};
use hodl_evm::{ChainContext, ChainRegistry, EncodedCall, LockRequest, RpcReadProvider, encode, lock, token};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::value::RawValue;

use crate::error::ApiError;

/// Shared application state: the chain registry, read-only after startup.
pub type AppState = Arc<ChainRegistry<RpcReadProvider>>;

type Chain = ChainContext<RpcReadProvider>;

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

type ApiResult<T> = Result<Json<Success<T>>, ApiError>;

#[allow(clippy::unnecessary_wraps)]
fn ok<T>(body: T) -> ApiResult<T> {
    Ok(Json(Success {
        success: true,
        body,
    }))
}

fn resolve<'a>(state: &'a AppState, route: &str) -> Result<&'a Chain, ApiError> {
    Ok(state.resolve(route)?)
}

fn parse_address(raw: &str) -> Result<Address, HodlError> {
    raw.parse::<ChecksummedAddress>().map(|a| a.0)
}

fn parse_uint(raw: &str) -> Result<U256, HodlError> {
    raw.parse::<TokenAmount>().map(|a| a.0)
}

/// A `uint256` body field.
///
/// Accepts JSON integers of any size, read from their exact digits, as well
/// as decimal or `0x` hex strings.
#[derive(Debug, Clone, Copy)]
pub struct Uint(U256);

impl From<Uint> for U256 {
    fn from(value: Uint) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for Uint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let text = raw.get();
        let amount = if text.starts_with('"') {
            serde_json::from_str::<String>(text)
                .map_err(de::Error::custom)?
                .parse::<TokenAmount>()
        } else {
            text.parse::<TokenAmount>()
        };
        amount.map(|a| Self(a.0)).map_err(de::Error::custom)
    }
}

/// `/api/chains` payload.
#[derive(Debug, Serialize)]
pub struct ChainList {
    chains: Vec<ChainInfo>,
}

/// `/config` payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfigView {
    chain_id: u64,
    chain_name: String,
    contract_address: Option<ChecksummedAddress>,
    multicall_address: Option<ChecksummedAddress>,
    contract_version: ContractVersion,
    rpc: String,
    block_explorer_url: String,
    abi: Option<serde_json::Value>,
}

/// `/token-info` payload.
#[derive(Debug, Serialize)]
pub struct TokenMetadata {
    symbol: String,
    decimals: u8,
    name: String,
}

/// `/token-balance` payload.
#[derive(Debug, Serialize)]
pub struct Balance {
    balance: TokenAmount,
}

/// `/tokens-batch` request body.
#[derive(Debug, Deserialize)]
pub struct TokensBatchBody {
    tokens: Vec<ChecksummedAddress>,
    #[serde(default)]
    user: Option<ChecksummedAddress>,
}

/// `/tokens-batch` payload.
#[derive(Debug, Serialize)]
pub struct TokenBatch {
    tokens: BTreeMap<ChecksummedAddress, TokenInfo>,
}

/// `/locks` payload.
#[derive(Debug, Serialize)]
pub struct UserLockList {
    locks: Vec<UserLock>,
}

/// `/total-locked` payload.
#[derive(Debug, Serialize)]
pub struct TotalLocked {
    total: TokenAmount,
}

/// `GET /api/chains` - Lists the chains that have a lock contract deployment.
pub async fn get_chains(State(state): State<AppState>) -> Json<Success<ChainList>> {
    let chains = state
        .iter()
        .filter(|chain| chain.lock_contract().is_some())
        .map(ChainContext::info)
        .collect();
    Json(Success {
        success: true,
        body: ChainList { chains },
    })
}

/// `GET /api/{route}/config` - Returns what a client needs to talk to the chain.
///
/// # Errors
///
/// Returns 404 for an unknown route.
pub async fn get_config(
    State(state): State<AppState>,
    Path(route): Path<String>,
) -> ApiResult<ChainConfigView> {
    let chain = resolve(&state, &route)?;
    ok(ChainConfigView {
        chain_id: chain.chain_id(),
        chain_name: chain.chain_name().to_owned(),
        contract_address: chain.lock_contract().map(Into::into),
        multicall_address: chain.multicall().map(Into::into),
        contract_version: chain.contract_version(),
        rpc: chain.rpc_url().to_owned(),
        block_explorer_url: chain.explorer_url().to_owned(),
        abi: chain.abi().cloned(),
    })
}

/// `GET /api/{route}/token-info/{token}` - Symbol, decimals and name of a token.
///
/// # Errors
///
/// Returns 400 on a bad address or if `symbol()`/`decimals()` fails.
pub async fn get_token_info(
    State(state): State<AppState>,
    Path((route, token)): Path<(String, String)>,
) -> ApiResult<TokenMetadata> {
    let chain = resolve(&state, &route)?;
    let info = token::token_info(chain, parse_address(&token)?).await?;
    ok(TokenMetadata {
        symbol: info.symbol,
        decimals: info.decimals,
        name: info.name,
    })
}

/// `GET /api/{route}/token-balance/{token}/{address}` - Balance of a holder.
///
/// # Errors
///
/// Returns 400 on bad addresses or RPC failure.
pub async fn get_token_balance(
    State(state): State<AppState>,
    Path((route, token, holder)): Path<(String, String, String)>,
) -> ApiResult<Balance> {
    let chain = resolve(&state, &route)?;
    let balance = token::balance_of(chain, parse_address(&token)?, parse_address(&holder)?).await?;
    ok(Balance { balance })
}

/// `POST /api/{route}/tokens-batch` - Metadata (and balances) for many tokens.
///
/// Individual token failures degrade to fallback values.
///
/// # Errors
///
/// Returns 400 on a malformed body.
pub async fn post_tokens_batch(
    State(state): State<AppState>,
    Path(route): Path<String>,
    body: Result<Json<TokensBatchBody>, JsonRejection>,
) -> ApiResult<TokenBatch> {
    let chain = resolve(&state, &route)?;
    let Json(body) = body?;
    let tokens = body.tokens.iter().map(|t| t.0).collect::<Vec<_>>();
    let tokens = token::resolve_tokens(chain, &tokens, body.user.map(|u| u.0)).await;
    ok(TokenBatch { tokens })
}

/// `GET /api/{route}/all-locks/{address}` - Every open lock of a holder.
///
/// # Errors
///
/// Returns 400 on a bad address, a missing deployment, or if the lock list
/// cannot be read.
pub async fn get_all_locks(
    State(state): State<AppState>,
    Path((route, holder)): Path<(String, String)>,
) -> ApiResult<HolderLocks> {
    let chain = resolve(&state, &route)?;
    ok(lock::holder_locks(chain, parse_address(&holder)?).await?)
}

/// `GET /api/{route}/lock/{tokenId}` - One lock and its owner.
///
/// # Errors
///
/// Returns 400 on a bad id, a missing deployment, or RPC failure.
pub async fn get_lock(
    State(state): State<AppState>,
    Path((route, token_id)): Path<(String, String)>,
) -> ApiResult<LockDetail> {
    let chain = resolve(&state, &route)?;
    ok(lock::lock_detail(chain, parse_uint(&token_id)?).await?)
}

/// `GET /api/{route}/locks/{address}/{token}` - Index-based locks of a user.
///
/// # Errors
///
/// Returns 400 on bad addresses, a missing deployment, or RPC failure.
pub async fn get_user_locks(
    State(state): State<AppState>,
    Path((route, user, token)): Path<(String, String, String)>,
) -> ApiResult<UserLockList> {
    let chain = resolve(&state, &route)?;
    let locks = lock::user_locks(chain, parse_address(&user)?, parse_address(&token)?).await?;
    ok(UserLockList { locks })
}

/// `GET /api/{route}/available/{address}/{token}` - Claimable index-based locks.
///
/// # Errors
///
/// Returns 400 on bad addresses, a missing deployment, or RPC failure.
pub async fn get_available(
    State(state): State<AppState>,
    Path((route, user, token)): Path<(String, String, String)>,
) -> ApiResult<AvailableTokens> {
    let chain = resolve(&state, &route)?;
    ok(lock::available_tokens(chain, parse_address(&user)?, parse_address(&token)?).await?)
}

/// `GET /api/{route}/total-locked/{address}/{token}` - Amount still locked.
///
/// # Errors
///
/// Returns 400 on bad addresses, a missing deployment, or RPC failure.
pub async fn get_total_locked(
    State(state): State<AppState>,
    Path((route, user, token)): Path<(String, String, String)>,
) -> ApiResult<TotalLocked> {
    let chain = resolve(&state, &route)?;
    let total = lock::total_locked(chain, parse_address(&user)?, parse_address(&token)?).await?;
    ok(TotalLocked { total })
}

/// `encode/approve` body.
#[derive(Debug, Deserialize)]
pub struct ApproveBody {
    token: ChecksummedAddress,
    amount: Uint,
}

/// `encode/lock` body: either a single `token`/`amount` pair or
/// `tokenAddresses`/`amounts` lists.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockBody {
    #[serde(default)]
    token: Option<ChecksummedAddress>,
    #[serde(default)]
    amount: Option<Uint>,
    #[serde(default)]
    token_addresses: Option<Vec<ChecksummedAddress>>,
    #[serde(default)]
    amounts: Option<Vec<Uint>>,
    lock_period: Uint,
    beneficiary: ChecksummedAddress,
}

impl LockBody {
    fn into_request(self) -> Result<LockRequest, HodlError> {
        let (tokens, amounts) = match (self.token_addresses, self.token, self.amount) {
            (Some(tokens), _, _) => (tokens, self.amounts.unwrap_or_default()),
            (None, Some(token), Some(amount)) => (vec![token], vec![amount]),
            (None, _, _) => {
                return Err(HodlError::invalid_argument(
                    "Provide token and amount, or tokenAddresses and amounts",
                ));
            }
        };
        Ok(LockRequest {
            tokens: tokens.into_iter().map(Into::into).collect(),
            amounts: amounts.into_iter().map(Into::into).collect(),
            lock_period: self.lock_period.0,
            beneficiary: self.beneficiary.0,
        })
    }
}

/// `encode/multi-token-lock` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiTokenLockBody {
    token_addresses: Vec<ChecksummedAddress>,
    amounts: Vec<Uint>,
    lock_period: Uint,
    beneficiary: ChecksummedAddress,
}

/// `encode/claim` body: `token`/`lockIndex` for an index-based lock, or
/// `tokenId` for an NFT lock.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimBody {
    #[serde(default)]
    token: Option<ChecksummedAddress>,
    #[serde(default)]
    lock_index: Option<Uint>,
    #[serde(default)]
    token_id: Option<Uint>,
}

/// `encode/claim-multi-token` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimMultiTokenBody {
    token_id: Uint,
}

/// `encode/mint` body.
#[derive(Debug, Deserialize)]
pub struct MintBody {
    token: ChecksummedAddress,
    to: ChecksummedAddress,
    amount: Uint,
}

/// `POST /api/{route}/encode/approve` - `approve(lockContract, amount)` on the token.
///
/// # Errors
///
/// Returns 400 on a malformed body or a missing deployment.
pub async fn encode_approve(
    State(state): State<AppState>,
    Path(route): Path<String>,
    body: Result<Json<ApproveBody>, JsonRejection>,
) -> ApiResult<EncodedCall> {
    let chain = resolve(&state, &route)?;
    let Json(body) = body?;
    let lock_contract = chain.require_contract()?;
    ok(encode::approve(lock_contract, body.token.0, body.amount.0))
}

/// `POST /api/{route}/encode/lock` - Lock transaction for the chain's contract.
///
/// # Errors
///
/// Returns 400 on a malformed or inconsistent body or a missing deployment.
pub async fn encode_lock(
    State(state): State<AppState>,
    Path(route): Path<String>,
    body: Result<Json<LockBody>, JsonRejection>,
) -> ApiResult<EncodedCall> {
    let chain = resolve(&state, &route)?;
    let Json(body) = body?;
    let lock_contract = chain.require_contract()?;
    ok(encode::lock(lock_contract, chain.contract_version(), body.into_request()?)?)
}

/// `POST /api/{route}/encode/multi-token-lock` - `lockMultipleTokens`.
///
/// # Errors
///
/// Returns 400 on a malformed or inconsistent body or a missing deployment.
pub async fn encode_multi_token_lock(
    State(state): State<AppState>,
    Path(route): Path<String>,
    body: Result<Json<MultiTokenLockBody>, JsonRejection>,
) -> ApiResult<EncodedCall> {
    let chain = resolve(&state, &route)?;
    let Json(body) = body?;
    let lock_contract = chain.require_contract()?;
    let request = LockRequest {
        tokens: body.token_addresses.into_iter().map(Into::into).collect(),
        amounts: body.amounts.into_iter().map(Into::into).collect(),
        lock_period: body.lock_period.0,
        beneficiary: body.beneficiary.0,
    };
    ok(encode::multi_token_lock(lock_contract, request)?)
}

/// `POST /api/{route}/encode/claim` - Either `claimTokens` overload.
///
/// # Errors
///
/// Returns 400 on a malformed or ambiguous body or a missing deployment.
pub async fn encode_claim(
    State(state): State<AppState>,
    Path(route): Path<String>,
    body: Result<Json<ClaimBody>, JsonRejection>,
) -> ApiResult<EncodedCall> {
    let chain = resolve(&state, &route)?;
    let Json(body) = body?;
    let lock_contract = chain.require_contract()?;
    let call = match (body.token, body.lock_index, body.token_id) {
        (Some(token), Some(index), None) => encode::claim_index(lock_contract, token.0, index.0),
        (None, None, Some(id)) => encode::claim_lock(lock_contract, id.0),
        _ => {
            return Err(HodlError::invalid_argument(
                "Provide token and lockIndex, or tokenId",
            )
            .into());
        }
    };
    ok(call)
}

/// `POST /api/{route}/encode/claim-multi-token` - `claimMultipleTokens(tokenId)`.
///
/// # Errors
///
/// Returns 400 on a malformed body or a missing deployment.
pub async fn encode_claim_multi_token(
    State(state): State<AppState>,
    Path(route): Path<String>,
    body: Result<Json<ClaimMultiTokenBody>, JsonRejection>,
) -> ApiResult<EncodedCall> {
    let chain = resolve(&state, &route)?;
    let Json(body) = body?;
    let lock_contract = chain.require_contract()?;
    ok(encode::claim_multi_token(lock_contract, body.token_id.0))
}

/// `POST /api/{route}/encode/mint` - Test-token faucet `mint(to, amount)`.
///
/// # Errors
///
/// Returns 400 on a malformed body.
pub async fn encode_mint(
    State(state): State<AppState>,
    Path(route): Path<String>,
    body: Result<Json<MintBody>, JsonRejection>,
) -> ApiResult<EncodedCall> {
    resolve(&state, &route)?;
    let Json(body) = body?;
    ok(encode::mint(body.token.0, body.to.0, body.amount.0))
}

/// Creates an Axum [`axum::Router`] with all API endpoints.
///
/// Endpoints:
/// - `GET /api/chains` - deployed chains
/// - `GET /api/{route}/config` - chain and contract configuration
/// - `GET /api/{route}/token-info/{token}` - token metadata
/// - `GET /api/{route}/token-balance/{token}/{address}` - holder balance
/// - `POST /api/{route}/tokens-batch` - batched token metadata
/// - `GET /api/{route}/all-locks/{address}` - open locks of a holder
/// - `GET /api/{route}/lock/{tokenId}` - a single lock
/// - `GET /api/{route}/locks/{address}/{token}` - index-based locks
/// - `GET /api/{route}/available/{address}/{token}` - claimable index-based locks
/// - `GET /api/{route}/total-locked/{address}/{token}` - locked total
/// - `POST /api/{route}/encode/{action}` - unsigned call data
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chains", get(get_chains))
        .route("/api/{route}/config", get(get_config))
        .route("/api/{route}/token-info/{token}", get(get_token_info))
        .route("/api/{route}/token-balance/{token}/{address}", get(get_token_balance))
        .route("/api/{route}/tokens-batch", post(post_tokens_batch))
        .route("/api/{route}/all-locks/{address}", get(get_all_locks))
        .route("/api/{route}/lock/{token_id}", get(get_lock))
        .route("/api/{route}/locks/{address}/{token}", get(get_user_locks))
        .route("/api/{route}/available/{address}/{token}", get(get_available))
        .route("/api/{route}/total-locked/{address}/{token}", get(get_total_locked))
        .route("/api/{route}/encode/approve", post(encode_approve))
        .route("/api/{route}/encode/lock", post(encode_lock))
        .route("/api/{route}/encode/multi-token-lock", post(encode_multi_token_lock))
        .route("/api/{route}/encode/claim", post(encode_claim))
        .route("/api/{route}/encode/claim-multi-token", post(encode_claim_multi_token))
        .route("/api/{route}/encode/mint", post(encode_mint))
        .with_state(state)
}
