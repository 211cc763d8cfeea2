//! Bingo - multi-game, fee-to-join bingo lottery
//!
//! Players pay a token fee to join a timed game and receive a unique board;
//! the owner starts games once their join window has elapsed and advances
//! them turn by turn with pseudo-random draws.
//!
//! ```no_run
//! use bingo::{Address, Bingo, CallContext, GlobalConfig, HashChainEntropy, MemoryLedger};
//!
//! let owner = Address::derive("owner");
//! let mut bingo = Bingo::deploy(
//!     CallContext::new(owner, 1_700_000_000),
//!     Address::derive("bingo"),
//!     GlobalConfig::new(100, 10, 10),
//!     MemoryLedger::new(),
//!     HashChainEntropy::from_os(),
//! );
//! bingo.start_new_game(CallContext::new(owner, 1_700_000_020), 1)?;
//! bingo.generate_random(CallContext::new(owner, 1_700_000_021), 1)?;
//! # Ok::<(), bingo::BingoError>(())
//! ```

pub mod common;
pub mod config;
pub mod contract;
pub mod errors;
pub mod events;
pub mod games;
pub mod ledger;
pub mod storage;

pub use common::traits::{EntropySource, TokenLedger};
pub use common::types::{Address, CallContext, GameId, Timestamp, TokenAmount};
pub use config::{BingoConfig, ConfigBuilder, ConfigLoader};
pub use contract::{Bingo, ContractState};
pub use errors::{AddressError, BingoError, BingoResult, BoardError, GameError, LedgerError};
pub use events::BingoEvent;
pub use games::{Board, GamePhase, GlobalConfig, HashChainEntropy, OsEntropy};
pub use ledger::MemoryLedger;
pub use storage::{Snapshot, StateStore};
