//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the game.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, async host, presentation adapters).
//!
//! # Card Lifecycle
//!
//! Every card starts face down and only ever moves forward within a turn:
//!
//! | State | Meaning |
//! |-------|---------|
//! | `Hidden` | Face down, selectable |
//! | `Revealed` | Face up as part of the current turn |
//! | `Matched` | Paired with its twin, permanently inert |
//!
//! A mismatched pair goes back from `Revealed` to `Hidden` once the settle
//! delay has elapsed.
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_MISMATCH_DELAY_MS` | 700 | Pause before a mismatched pair flips back |
//! | `DEFAULT_TICK_INTERVAL_MS` | 250 | Live elapsed-time refresh interval |
//!
//! # Examples
//!
//! ```
//! use memory_match_types::{format_elapsed, CardState, GamePhase, DEFAULT_ALPHABET, DEFAULT_PAIRS};
//!
//! assert_eq!(DEFAULT_PAIRS, 8);
//! assert_eq!(DEFAULT_ALPHABET.len(), 12);
//!
//! assert_eq!(CardState::from_str("matched"), Some(CardState::Matched));
//! assert_eq!(GamePhase::Won.as_str(), "won");
//!
//! assert_eq!(format_elapsed(0), "00:00");
//! assert_eq!(format_elapsed(61_500), "01:01");
//! ```

use std::fmt;

/// Number of symbol pairs dealt by default (16 cards).
pub const DEFAULT_PAIRS: usize = 8;

/// Settle delay after a mismatch before both cards flip back (700ms).
pub const DEFAULT_MISMATCH_DELAY_MS: u64 = 700;

/// Interval between live elapsed-time ticks while the timer runs (250ms).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 250;

/// Key under which the best score record is persisted.
pub const BEST_SCORE_KEY: &str = "memory_best";

/// Default symbol alphabet, in deal order.
///
/// The first `pair_count` entries are used for a game.
pub const DEFAULT_ALPHABET: [&str; 12] = [
    "🍉", "🍓", "🍌", "🍇", "🍒", "🍍", "🥝", "🍑", "🥥", "🥭", "🍋", "🍊",
];


/// A pairable card face value (an emoji-like token).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identity of one physical card.
///
/// `epoch` is the game generation the card was dealt in, so ids held over
/// from a previous deal never address a card of the current one. `slot` is
/// the card's position in the unshuffled deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId {
    epoch: u32,
    slot: u16,
}

impl CardId {
    pub const fn new(epoch: u32, slot: u16) -> Self {
        Self { epoch, slot }
    }

    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    pub const fn slot(&self) -> u16 {
        self.slot
    }

    /// Parse the `"<epoch>:<slot>"` form produced by `Display`.
    ///
    /// # Examples
    ///
    /// ```
    /// use memory_match_types::CardId;
    ///
    /// assert_eq!(CardId::parse("0:7"), Some(CardId::new(0, 7)));
    /// assert_eq!(CardId::parse("nope"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let (epoch, slot) = s.split_once(':')?;
        Some(Self {
            epoch: epoch.trim().parse().ok()?,
            slot: slot.trim().parse().ok()?,
        })
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.epoch, self.slot)
    }
}

/// Lifecycle state of a card on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CardState {
    #[default]
    Hidden,
    Revealed,
    Matched,
}

impl CardState {
    /// Parse card state from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hidden" => Some(CardState::Hidden),
            "revealed" => Some(CardState::Revealed),
            "matched" => Some(CardState::Matched),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CardState::Hidden => "hidden",
            CardState::Revealed => "revealed",
            CardState::Matched => "matched",
        }
    }

    pub fn is_face_up(&self) -> bool {
        !matches!(self, CardState::Hidden)
    }
}

/// One card of the deck.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Card {
    pub id: CardId,
    pub symbol: Symbol,
    pub state: CardState,
}

impl Card {
    /// Create a face-down card
    pub fn new(id: CardId, symbol: Symbol) -> Self {
        Self {
            id,
            symbol,
            state: CardState::Hidden,
        }
    }

    /// Display token in the `"<slot>-<symbol>"` form.
    pub fn token(&self) -> String {
        format!("{}-{}", self.id.slot(), self.symbol)
    }

    /// Symbol text, only while the card is face up.
    pub fn visible_symbol(&self) -> Option<&Symbol> {
        self.state.is_face_up().then_some(&self.symbol)
    }
}

/// States of the game state machine
///
/// - **Idle**: No card selected (fresh deal, or after a turn resolved)
/// - **OneSelected**: First card of the turn is face up
/// - **Evaluating**: Mismatched pair face up, board locked until settle
/// - **Won**: Every pair matched; terminal until reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    Idle,
    OneSelected,
    Evaluating,
    Won,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::OneSelected => "oneSelected",
            GamePhase::Evaluating => "evaluating",
            GamePhase::Won => "won",
        }
    }
}

/// Identifies one pending mismatch settle.
///
/// `epoch` is the game generation and `turn` the move number that produced the
/// mismatch. A settle callback carrying a token that is no longer pending is
/// stale and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettleToken {
    pub epoch: u32,
    pub turn: u32,
}

/// Why a selection had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// A mismatch is still settling
    Locked,
    /// The card is already the first selection of this turn
    AlreadySelected,
    /// The card has been matched
    AlreadyMatched,
    /// The id does not address a card of the current deal
    UnknownCard,
    /// The game is won; only reset is accepted
    GameOver,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::Locked => "locked",
            IgnoreReason::AlreadySelected => "alreadySelected",
            IgnoreReason::AlreadyMatched => "alreadyMatched",
            IgnoreReason::UnknownCard => "unknownCard",
            IgnoreReason::GameOver => "gameOver",
        }
    }
}

/// Result of a single card selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Ignored(IgnoreReason),
    /// First card of a turn turned face up
    Revealed,
    /// Second card matched the first
    Matched,
    /// Second card did not match; the board is locked until the token settles
    Mismatched(SettleToken),
    /// The final pair matched
    Won { moves: u32, time_ms: u64 },
}

impl SelectOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, SelectOutcome::Ignored(_))
    }
}

/// Events emitted by the state machine, in the order they happened.
///
/// Presentation adapters consume the card and win events. `MismatchPending`,
/// `TimerStarted` and `TimerStopped` are scheduling requests for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A fresh deck was dealt (on construction and on every reset)
    DeckBuilt { epoch: u32, cards: Vec<Card> },
    Revealed(Card),
    Unflipped(Card),
    Matched(Card, Card),
    /// Host should call back with `token` after `delay_ms`
    MismatchPending { token: SettleToken, delay_ms: u64 },
    /// Host should start ticking for this timer epoch
    TimerStarted { epoch: u32 },
    /// Host should cancel ticking
    TimerStopped,
    Tick { elapsed_ms: u64 },
    Won {
        moves: u32,
        time_ms: u64,
        formatted_time: String,
        new_best: bool,
    },
}

/// Format milliseconds as `MM:SS`.
///
/// Sub-second remainders are truncated; minutes are zero padded to two digits
/// but not capped.
pub fn format_elapsed(ms: u64) -> String {
    let total_sec = ms / 1000;
    format!("{:02}:{:02}", total_sec / 60, total_sec % 60)
}
