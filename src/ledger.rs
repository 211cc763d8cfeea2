//! In-memory fungible token ledger
//!
//! Standard mint/approve/transferFrom semantics, enough to stand in for the
//! external token contract in tests and in the CLI's persisted state.

use crate::common::traits::TokenLedger;
use crate::common::types::{Address, TokenAmount};
use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryLedger {
    balances: BTreeMap<Address, TokenAmount>,
    /// owner -> spender -> remaining allowance
    allowances: BTreeMap<Address, BTreeMap<Address, TokenAmount>>,
    total_supply: TokenAmount,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` new tokens for `account`
    pub fn mint(&mut self, account: Address, amount: TokenAmount) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(account))?;
        let balance = self.balances.entry(account).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(account))?;
        self.total_supply = supply;

        tracing::debug!(%account, amount, "Minted tokens");
        Ok(())
    }

    /// Set the allowance of `spender` over `owner`'s tokens (overwrites)
    pub fn approve(&mut self, owner: Address, spender: Address, amount: TokenAmount) {
        self.allowances
            .entry(owner)
            .or_default()
            .insert(spender, amount);

        tracing::debug!(%owner, %spender, amount, "Approved allowance");
    }

    /// Direct transfer by the token holder
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        self.move_balance(&from, &to, amount)
    }

    pub fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    fn move_balance(
        &mut self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: *from,
                available,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;

        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

impl TokenLedger for MemoryLedger {
    fn balance_of(&self, account: &Address) -> TokenAmount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> TokenAmount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                available: allowed,
                required: amount,
            });
        }

        self.move_balance(from, to, amount)?;
        self.approve(*from, *spender, allowed - amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_and_balance() {
        let mut ledger = MemoryLedger::new();
        let alice = Address::derive("alice");

        ledger.mint(alice, 1000).unwrap();
        assert_eq!(ledger.balance_of(&alice), 1000);
        assert_eq!(ledger.total_supply(), 1000);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut ledger = MemoryLedger::new();
        let alice = Address::derive("alice");
        let house = Address::derive("house");

        ledger.mint(alice, 1000).unwrap();
        ledger.approve(alice, house, 150);
        ledger.transfer_from(&house, &alice, &house, 100).unwrap();

        assert_eq!(ledger.balance_of(&alice), 900);
        assert_eq!(ledger.balance_of(&house), 100);
        assert_eq!(ledger.allowance(&alice, &house), 50);
    }

    #[test]
    fn test_transfer_from_without_allowance_fails() {
        let mut ledger = MemoryLedger::new();
        let alice = Address::derive("alice");
        let house = Address::derive("house");
        ledger.mint(alice, 1000).unwrap();

        let err = ledger.transfer_from(&house, &alice, &house, 100).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { available: 0, .. }));
        assert_eq!(ledger.balance_of(&alice), 1000);
    }

    #[test]
    fn test_transfer_from_insufficient_balance_leaves_allowance() {
        let mut ledger = MemoryLedger::new();
        let alice = Address::derive("alice");
        let house = Address::derive("house");
        ledger.mint(alice, 50).unwrap();
        ledger.approve(alice, house, 100);

        let err = ledger.transfer_from(&house, &alice, &house, 100).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { available: 50, .. }));
        assert_eq!(ledger.allowance(&alice, &house), 100);
        assert_eq!(ledger.balance_of(&house), 0);
    }

    #[test]
    fn test_direct_transfer() {
        let mut ledger = MemoryLedger::new();
        let alice = Address::derive("alice");
        let bob = Address::derive("bob");
        ledger.mint(alice, 10).unwrap();

        ledger.transfer(alice, bob, 4).unwrap();
        assert_eq!(ledger.balance_of(&alice), 6);
        assert_eq!(ledger.balance_of(&bob), 4);
        assert!(ledger.transfer(bob, alice, 5).is_err());
    }
}
