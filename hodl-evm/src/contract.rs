//! Solidity interface definitions for on-chain interactions.
//!
//! Contains the minimal ABI surface the backend reads and encodes:
//! - [`IHodlLock`] - the token-lock contract (both contract generations)
//! - [`IERC20`] - ERC-20 metadata, balance and approval
//! - [`IERC20Mintable`] - faucet `mint` exposed by test-network tokens
//! - [`IMulticall3`] - the Multicall3 `aggregate3` batch entry point

use alloy_primitives::{Address, address};
use alloy_sol_types::sol;

/// Canonical Multicall3 deployment, identical on every major EVM chain via CREATE2.
pub const MULTICALL3_ADDRESS: Address = address!("0xcA11bde05977b3631167028862bE2a173976CA11");

sol! {
    /// Token-lock contract.
    ///
    /// Locks are NFTs. The multi-token generation stores several `(token, amount)`
    /// pairs per lock; the single-token generation stores one. The index-based
    /// per-token lock book (`getUserLocks` and friends) is present on both.
    ///
    /// Overload order matters: index-based `claimTokens(address,uint256)` is `_0`,
    /// NFT `claimTokens(uint256)` is `_1`.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IHodlLock {
        struct Lock {
            uint256 amount;
            uint256 unlockTime;
            address token;
        }

        function getOwnerLocks(address owner) external view returns (uint256[] memory);
        function getLockDetails(uint256 tokenId)
            external
            view
            returns (address token, uint256 amount, uint256 unlockTime, bool claimed);
        function getMultiTokenLockDetails(uint256 tokenId)
            external
            view
            returns (address[] memory tokens, uint256[] memory amounts, uint256 unlockTime, bool claimed);
        function ownerOf(uint256 tokenId) external view returns (address);

        function getUserLocks(address user, address token) external view returns (Lock[] memory);
        function getAvailableTokens(address user, address token)
            external
            view
            returns (uint256 total, uint256[] memory indexes);
        function getTotalLockedTokens(address user, address token) external view returns (uint256);

        function lockTokens(address token, uint256 amount, uint256 lockPeriod, address beneficiary) external;
        function lockMultipleTokens(
            address[] calldata tokens,
            uint256[] calldata amounts,
            uint256 lockPeriod,
            address beneficiary
        ) external;
        function claimTokens(address token, uint256 lockIndex) external;
        function claimTokens(uint256 tokenId) external;
        function claimMultipleTokens(uint256 tokenId) external;
    }
}

sol! {
    /// Minimal ERC-20 interface for metadata, balance and approval.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function name() external view returns (string);
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    /// Faucet mint found on test-network ERC-20 deployments.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20Mintable {
        function mint(address to, uint256 amount) external;
    }
}

sol! {
    /// Multicall3 batch entry point.
    ///
    /// Reference: <https://github.com/mds1/multicall>
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls) external payable returns (Result[] memory returnData);
    }
}
