//! Collaborator interfaces
//!
//! The contract only talks to the outside world through these traits so that
//! the token and the entropy source can be swapped without touching game logic.

use crate::common::types::{Address, TokenAmount};
use crate::errors::LedgerError;

/// Fungible-token ledger as seen by the contract
pub trait TokenLedger {
    /// Balance held by `account`
    fn balance_of(&self, account: &Address) -> TokenAmount;

    /// Amount `spender` may still move out of `owner`
    fn allowance(&self, owner: &Address, spender: &Address) -> TokenAmount;

    /// Move `amount` from `from` to `to` against the allowance granted to `spender`.
    ///
    /// Must be all-or-nothing: on error no balance or allowance changes.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError>;
}

/// Source of raw entropy mixed into boards and draws.
///
/// Implementations make no security claim; a commit-reveal or VRF backed
/// source can be plugged in behind the same interface. A clone must resume
/// from the same position: the contract checkpoints the source before each
/// call and restores it if the call fails.
pub trait EntropySource: Clone {
    /// 32 fresh bytes; successive calls must not repeat
    fn next_entropy(&mut self) -> [u8; 32];
}
