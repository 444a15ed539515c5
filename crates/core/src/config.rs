//! Game configuration and construction-time validation.

use std::env;

use thiserror::Error;

use crate::types::{
    Symbol, DEFAULT_ALPHABET, DEFAULT_MISMATCH_DELAY_MS, DEFAULT_PAIRS, DEFAULT_TICK_INTERVAL_MS,
};

/// Configuration rejected before any deck is dealt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("pair count must be at least 1")]
    NoPairs,

    #[error("pair count {requested} exceeds alphabet size {available}")]
    TooManyPairs { requested: usize, available: usize },

    #[error("symbol {0} appears more than once in the dealt alphabet")]
    DuplicateSymbol(Symbol),

    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
}

/// Tunables for one game instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Number of symbol pairs dealt (`2 * pair_count` cards).
    pub pair_count: usize,
    /// Ordered symbols; the first `pair_count` are dealt.
    pub alphabet: Vec<Symbol>,
    pub mismatch_delay_ms: u64,
    pub tick_interval_ms: u64,
    /// Shuffle seed. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pair_count: DEFAULT_PAIRS,
            alphabet: DEFAULT_ALPHABET.iter().copied().map(Symbol::from).collect(),
            mismatch_delay_ms: DEFAULT_MISMATCH_DELAY_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Build a config from `MEMORY_*` environment variables.
    ///
    /// Missing or unparsable values fall back to the defaults. The result is
    /// not validated here; construction of a game does that.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// [`GameConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let pair_count = lookup("MEMORY_PAIRS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.pair_count);

        let alphabet = lookup("MEMORY_ALPHABET")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Symbol::from)
                    .collect::<Vec<_>>()
            })
            .filter(|symbols| !symbols.is_empty())
            .unwrap_or(defaults.alphabet);

        let mismatch_delay_ms = lookup("MEMORY_MISMATCH_DELAY_MS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.mismatch_delay_ms);

        let tick_interval_ms = lookup("MEMORY_TICK_INTERVAL_MS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.tick_interval_ms);

        let seed = lookup("MEMORY_SEED").and_then(|s| s.trim().parse().ok());

        Self {
            pair_count,
            alphabet,
            mismatch_delay_ms,
            tick_interval_ms,
            seed,
        }
    }

    pub fn with_pairs(mut self, pair_count: usize) -> Self {
        self.pair_count = pair_count;
        self
    }

    pub fn with_alphabet<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.alphabet = symbols.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_mismatch_delay_ms(mut self, delay_ms: u64) -> Self {
        self.mismatch_delay_ms = delay_ms;
        self
    }

    pub fn with_tick_interval_ms(mut self, interval_ms: u64) -> Self {
        self.tick_interval_ms = interval_ms;
        self
    }

    /// The symbols that will be dealt.
    pub fn dealt_symbols(&self) -> &[Symbol] {
        let n = self.pair_count.min(self.alphabet.len());
        &self.alphabet[..n]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pair_count == 0 {
            return Err(ConfigError::NoPairs);
        }
        if self.pair_count > self.alphabet.len() {
            return Err(ConfigError::TooManyPairs {
                requested: self.pair_count,
                available: self.alphabet.len(),
            });
        }
        if u16::try_from(self.pair_count * 2).is_err() {
            return Err(ConfigError::TooManyPairs {
                requested: self.pair_count,
                available: usize::from(u16::MAX / 2),
            });
        }
        let dealt = self.dealt_symbols();
        for (i, symbol) in dealt.iter().enumerate() {
            if dealt[i + 1..].contains(symbol) {
                return Err(ConfigError::DuplicateSymbol(symbol.clone()));
            }
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}
