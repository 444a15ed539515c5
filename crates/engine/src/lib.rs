//! Async host for the memory-match core.
//!
//! The core never reads a clock or schedules anything itself. This crate
//! supplies both on top of tokio:
//!
//! - [`clock`]: `now_ms` source ([`TokioClock`] follows paused test time)
//! - [`schedule`]: cancellable one-shot and repeating deferred messages
//! - [`observer`]: presentation callbacks
//! - [`runtime`]: the driver task and its [`GameHandle`]
//!
//! # Example
//!
//! ```no_run
//! use memory_match_engine::{spawn_game, ChannelObserver};
//! use memory_match_engine::core::{GameConfig, MemoryScoreStore};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let (observer, mut events) = ChannelObserver::channel();
//! let (game, _task) = spawn_game(GameConfig::from_env(), MemoryScoreStore::new(), observer)?;
//!
//! let snapshot = game.snapshot().await?;
//! println!("{} cards, best {:?}", snapshot.cards.len(), snapshot.best);
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod observer;
pub mod runtime;
pub mod schedule;

pub use memory_match_core as core;
pub use memory_match_types as types;

pub use clock::{Clock, TokioClock};
pub use observer::{ChannelObserver, GameObserver, NoopObserver};
pub use runtime::{spawn_game, spawn_game_with_clock, GameHandle};
pub use schedule::Schedule;
