//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the game rules, state management, and scoring logic.
//! It has **no dependencies** on rendering, scheduling, or storage backends, making it:
//!
//! - **Deterministic**: Same seed produces the same deal; time comes in as `now_ms`
//! - **Testable**: Comprehensive unit tests for all game rules
//! - **Portable**: Can be driven by an async host, a fixed-timestep loop, or a test
//!
//! # Module Structure
//!
//! - [`config`]: Game tunables and construction-time validation
//! - [`deck`]: Paired deal with a Fisher-Yates shuffle
//! - [`game_state`]: The state machine: selection, evaluation, lock, win, reset
//! - [`score`]: Best-score record, update policy and key-value persistence
//! - [`snapshot`]: Serializable view for presentation adapters
//! - [`timer`]: Elapsed-time tracker with epoch-tagged runs
//!
//! # Game Rules
//!
//! - **Deal**: `pair_count` symbols, each on exactly two cards, shuffled
//! - **Turn**: Two selections; re-selecting the first card does not count
//! - **Match**: Both cards stay face up for good, no delay
//! - **Mismatch**: Board locks for 700ms, then both cards flip back
//! - **Win**: All pairs matched; result offered to the score store
//! - **Best score**: Fewer moves wins, ties broken by shorter time
//!
//! # Example
//!
//! ```
//! use memory_match_core::{GameConfig, GameState, MemoryScoreStore};
//! use memory_match_types::{GamePhase, SelectOutcome};
//!
//! // Two pairs, fixed seed
//! let config = GameConfig::default().with_pairs(2).with_seed(7);
//! let mut game = GameState::new(config, MemoryScoreStore::new()).unwrap();
//!
//! // Select the first card; the timer starts now
//! let first = game.deck().cards()[0].clone();
//! assert_eq!(game.select_card(first.id, 0), SelectOutcome::Revealed);
//!
//! // Select its twin
//! let twin = game
//!     .deck()
//!     .iter()
//!     .find(|c| c.symbol == first.symbol && c.id != first.id)
//!     .unwrap()
//!     .id;
//! assert_eq!(game.select_card(twin, 400), SelectOutcome::Matched);
//! assert_eq!(game.matches(), 1);
//! assert_eq!(game.phase(), GamePhase::Idle);
//! ```

pub mod config;
pub mod deck;
pub mod game_state;
pub mod score;
pub mod snapshot;
pub mod timer;

pub use memory_match_types as types;

// Re-export commonly used types for convenience
pub use config::{ConfigError, GameConfig};
pub use deck::{shuffle, Deck};
pub use game_state::GameState;
pub use score::{
    BestScore, KeyValueStore, KvScoreStore, MemoryKv, MemoryScoreStore, ScoreStore, StoreError,
};
pub use snapshot::{CardSnapshot, GameSnapshot};
pub use timer::Timer;
