//! Memory match (workspace facade crate).
//!
//! Re-exports the game core, the async engine and the shared types so hosts can
//! depend on a single package while the implementation lives under `crates/`.

pub use memory_match_core as core;
pub use memory_match_engine as engine;
pub use memory_match_types as types;
