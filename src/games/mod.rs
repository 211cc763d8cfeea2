pub mod board;
pub mod draw_engine;
pub mod entropy;
pub mod game;
pub mod params;

pub use board::Board;
pub use draw_engine::{DrawEngine, DrawOutcome};
pub use entropy::{HashChainEntropy, OsEntropy};
pub use game::{Game, GamePhase};
pub use params::{AdminParams, GlobalConfig};
