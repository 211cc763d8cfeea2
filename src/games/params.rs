//! Admin parameter store
//!
//! Process-wide game parameters. Only the owner may change them, and a
//! change only affects games created afterwards: each game snapshots the
//! values it needs when it is created.

use crate::common::types::{Address, Timestamp, TokenAmount};
use crate::errors::GameError;
use serde::{Deserialize, Serialize};

/// Parameters snapshotted into every new game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Token units required to join any game
    pub fee: TokenAmount,
    /// Seconds from game creation until its join window closes
    pub join_duration: u64,
    /// Seconds allotted to each draw turn
    pub turn_duration: u64,
}

impl GlobalConfig {
    pub fn new(fee: TokenAmount, join_duration: u64, turn_duration: u64) -> Self {
        Self {
            fee,
            join_duration,
            turn_duration,
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::new(100, 10, 10)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminParams {
    owner: Address,
    config: GlobalConfig,
    /// Close of the join window opened at deployment; cleared once the owner
    /// reconfigures the join duration.
    opening_deadline: Option<Timestamp>,
}

impl AdminParams {
    pub fn new(owner: Address, config: GlobalConfig, deployed_at: Timestamp) -> Self {
        Self {
            owner,
            config,
            opening_deadline: Some(deployed_at.saturating_add(config.join_duration)),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn config(&self) -> GlobalConfig {
        self.config
    }

    pub fn opening_deadline(&self) -> Option<Timestamp> {
        self.opening_deadline
    }

    /// Raw join window setting: the opening deadline until the join duration
    /// is first updated, the configured seconds afterwards.
    pub fn join_duration_time(&self) -> u64 {
        self.opening_deadline.unwrap_or(self.config.join_duration)
    }

    pub fn ensure_owner(&self, caller: &Address) -> Result<(), GameError> {
        if *caller != self.owner {
            return Err(GameError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Returns the previous fee
    pub fn update_fee(&mut self, caller: &Address, fee: TokenAmount) -> Result<TokenAmount, GameError> {
        self.ensure_owner(caller)?;
        Ok(std::mem::replace(&mut self.config.fee, fee))
    }

    /// Returns the previous join duration
    pub fn update_join_duration(&mut self, caller: &Address, seconds: u64) -> Result<u64, GameError> {
        self.ensure_owner(caller)?;
        self.opening_deadline = None;
        Ok(std::mem::replace(&mut self.config.join_duration, seconds))
    }

    /// Returns the previous turn duration
    pub fn update_turn_duration(&mut self, caller: &Address, seconds: u64) -> Result<u64, GameError> {
        self.ensure_owner(caller)?;
        Ok(std::mem::replace(&mut self.config.turn_duration, seconds))
    }

    /// Returns the previous owner
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<Address, GameError> {
        self.ensure_owner(caller)?;
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> (AdminParams, Address) {
        let owner = Address::derive("owner");
        (AdminParams::new(owner, GlobalConfig::new(100, 10, 10), 1_000), owner)
    }

    #[test]
    fn test_join_duration_time_reports_opening_deadline_first() {
        let (mut params, owner) = params();
        assert_eq!(params.join_duration_time(), 1_010);

        params.update_join_duration(&owner, 11).unwrap();
        assert_eq!(params.join_duration_time(), 11);
        assert_eq!(params.opening_deadline(), None);
    }

    #[test]
    fn test_updates_require_owner() {
        let (mut params, _owner) = params();
        let mallory = Address::derive("mallory");

        assert_eq!(
            params.update_fee(&mallory, 1),
            Err(GameError::Unauthorized { caller: mallory })
        );
        assert!(params.update_join_duration(&mallory, 1).is_err());
        assert!(params.update_turn_duration(&mallory, 1).is_err());
        assert!(params.transfer_ownership(&mallory, mallory).is_err());
        assert_eq!(params.config(), GlobalConfig::new(100, 10, 10));
        assert_eq!(params.join_duration_time(), 1_010);
    }

    #[test]
    fn test_owner_updates_return_previous_values() {
        let (mut params, owner) = params();

        assert_eq!(params.update_fee(&owner, 110), Ok(100));
        assert_eq!(params.update_turn_duration(&owner, 11), Ok(10));
        assert_eq!(params.config().fee, 110);
        assert_eq!(params.config().turn_duration, 11);
    }

    #[test]
    fn test_transfer_ownership_moves_authority() {
        let (mut params, owner) = params();
        let next = Address::derive("next-owner");

        assert_eq!(params.transfer_ownership(&owner, next), Ok(owner));
        assert!(params.update_fee(&owner, 1).is_err());
        assert!(params.update_fee(&next, 1).is_ok());
    }
}
