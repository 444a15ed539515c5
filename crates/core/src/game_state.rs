//! Game state module - manages the complete game state
//!
//! This module ties together the deck, the selection, the turn and match
//! counters, the timer and the score store. It handles selection filtering,
//! match evaluation, the mismatch lock, win detection and reset.
//!
//! Time is never read here. Every operation that needs it takes `now_ms` from
//! the host's monotonic clock, which keeps the machine deterministic.
//!
//! Deferred work is requested through events rather than performed:
//! a mismatch emits [`GameEvent::MismatchPending`] and the host calls
//! [`GameState::resolve_mismatch`] with the token once the delay has passed;
//! starting the timer emits [`GameEvent::TimerStarted`] and the host calls
//! [`GameState::timer_tick`] at the tick interval. Tokens and timer epochs from
//! before a reset are rejected, so late callbacks cannot touch a new game.

use arrayvec::ArrayVec;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

use crate::config::{ConfigError, GameConfig};
use crate::deck::Deck;
use crate::score::{BestScore, ScoreStore};
use crate::snapshot::{CardSnapshot, GameSnapshot};
use crate::timer::Timer;
use crate::types::*;

/// Mismatch waiting for its settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSettle {
    token: SettleToken,
    due_ms: u64,
}

/// Complete game state
#[derive(Debug)]
pub struct GameState<S> {
    config: GameConfig,
    deck: Deck,
    rng: StdRng,
    /// Deck indices of `first` and `second`, in selection order.
    selection: ArrayVec<usize, 2>,
    phase: GamePhase,
    /// Game generation (increments on reset).
    epoch: u32,
    moves: u32,
    matches: usize,
    timer: Timer,
    last_tick_ms: u64,
    pending: Option<PendingSettle>,
    events: Vec<GameEvent>,
    store: S,
}

impl<S: ScoreStore> GameState<S> {
    /// Validate `config` and deal the first deck.
    pub fn new(config: GameConfig, store: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let deck = Deck::build(config.pair_count, &config.alphabet, 0, &mut rng)?;

        let mut state = Self {
            config,
            deck,
            rng,
            selection: ArrayVec::new(),
            phase: GamePhase::Idle,
            epoch: 0,
            moves: 0,
            matches: 0,
            timer: Timer::new(),
            last_tick_ms: 0,
            pending: None,
            events: Vec::new(),
            store,
        };
        state.emit_deck_built();
        Ok(state)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Completed turns (pairs of selections).
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Resolved pairs.
    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn pair_count(&self) -> usize {
        self.deck.pair_count()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.deck.card(id)
    }

    /// Selections are rejected while a mismatch settles.
    pub fn is_locked(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_won(&self) -> bool {
        self.phase == GamePhase::Won
    }

    /// Current `(first, second)` selection.
    pub fn selection(&self) -> (Option<&Card>, Option<&Card>) {
        let at = |i: usize| self.selection.get(i).and_then(|&idx| self.deck.get(idx));
        (at(0), at(1))
    }

    /// Token of the mismatch currently settling.
    pub fn pending_settle(&self) -> Option<SettleToken> {
        self.pending.map(|p| p.token)
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        self.timer.elapsed(now_ms)
    }

    pub fn best_score(&self) -> Option<BestScore> {
        self.store.load()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Take the events emitted since the last call.
    ///
    /// Hosts should drain after every operation. Undrained events are
    /// coalesced: a `Tick` replaces any queued `Tick`, and a new deal drops
    /// queued events of the abandoned one (only `Won` and `TimerStopped`
    /// survive), so the queue stays bounded by player input.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn push_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::Tick { .. } => self
                .events
                .retain(|e| !matches!(e, GameEvent::Tick { .. })),
            GameEvent::DeckBuilt { .. } => self
                .events
                .retain(|e| matches!(e, GameEvent::Won { .. } | GameEvent::TimerStopped)),
            _ => {}
        }
        self.events.push(event);
    }

    /// Select the card `id` at `now_ms`.
    ///
    /// Invalid selections are absorbed and reported as
    /// [`SelectOutcome::Ignored`]; they never change state.
    pub fn select_card(&mut self, id: CardId, now_ms: u64) -> SelectOutcome {
        let index = match self.check_selectable(id) {
            Ok(index) => index,
            Err(reason) => {
                debug!(card = %id, reason = reason.as_str(), "selection ignored");
                return SelectOutcome::Ignored(reason);
            }
        };

        // Start timer at first interaction
        if self.moves == 0 && !self.timer.is_running() {
            let epoch = self.timer.start(now_ms);
            self.last_tick_ms = now_ms;
            self.push_event(GameEvent::TimerStarted { epoch });
        }

        self.reveal(index);

        if self.selection.is_empty() {
            self.selection.push(index);
            self.phase = GamePhase::OneSelected;
            return SelectOutcome::Revealed;
        }

        self.selection.push(index);
        self.moves += 1;
        self.evaluate(now_ms)
    }

    /// Deck index of `id` if it may be selected now.
    fn check_selectable(&self, id: CardId) -> Result<usize, IgnoreReason> {
        if self.phase == GamePhase::Won {
            return Err(IgnoreReason::GameOver);
        }
        if self.pending.is_some() {
            return Err(IgnoreReason::Locked);
        }
        let index = self.deck.position(id).ok_or(IgnoreReason::UnknownCard)?;
        if self.selection.first() == Some(&index) {
            return Err(IgnoreReason::AlreadySelected);
        }
        match self.deck.get(index).map(|c| c.state) {
            Some(CardState::Matched) => Err(IgnoreReason::AlreadyMatched),
            Some(_) => Ok(index),
            None => Err(IgnoreReason::UnknownCard),
        }
    }

    fn reveal(&mut self, index: usize) {
        if let Some(card) = self.deck.set_state(index, CardState::Revealed).cloned() {
            self.push_event(GameEvent::Revealed(card));
        }
    }

    /// Compare the two selected cards.
    fn evaluate(&mut self, now_ms: u64) -> SelectOutcome {
        let (a, b) = (self.selection[0], self.selection[1]);
        let is_match = match (self.deck.get(a), self.deck.get(b)) {
            (Some(first), Some(second)) => first.symbol == second.symbol,
            _ => false,
        };

        if is_match {
            let first = self.deck.set_state(a, CardState::Matched).cloned();
            let second = self.deck.set_state(b, CardState::Matched).cloned();
            if let (Some(first), Some(second)) = (first, second) {
                self.push_event(GameEvent::Matched(first, second));
            }
            self.matches += 1;
            self.selection.clear();
            self.phase = GamePhase::Idle;

            if self.matches == self.deck.pair_count() {
                return self.win(now_ms);
            }
            return SelectOutcome::Matched;
        }

        let token = SettleToken {
            epoch: self.epoch,
            turn: self.moves,
        };
        let delay_ms = self.config.mismatch_delay_ms;
        self.pending = Some(PendingSettle {
            token,
            due_ms: now_ms.saturating_add(delay_ms),
        });
        self.phase = GamePhase::Evaluating;
        self.push_event(GameEvent::MismatchPending { token, delay_ms });
        SelectOutcome::Mismatched(token)
    }

    /// Flip a settled mismatch back and unlock.
    ///
    /// Returns `false` (and does nothing) when `token` is not the pending
    /// mismatch, e.g. a callback scheduled before a reset.
    pub fn resolve_mismatch(&mut self, token: SettleToken) -> bool {
        match self.pending {
            Some(pending) if pending.token == token => {}
            _ => {
                trace!(?token, "stale settle ignored");
                return false;
            }
        }

        for index in std::mem::take(&mut self.selection) {
            if let Some(card) = self.deck.set_state(index, CardState::Hidden).cloned() {
                self.push_event(GameEvent::Unflipped(card));
            }
        }
        self.pending = None;
        self.phase = GamePhase::Idle;
        true
    }

    /// Live timer tick for the timer epoch announced by `TimerStarted`.
    ///
    /// Emits [`GameEvent::Tick`] and returns the elapsed time, or `None` when
    /// `epoch` is not the running timer.
    pub fn timer_tick(&mut self, epoch: u32, now_ms: u64) -> Option<u64> {
        if !self.timer.is_current(epoch) {
            trace!(epoch, "stale timer tick ignored");
            return None;
        }
        let elapsed_ms = self.timer.elapsed(now_ms);
        self.last_tick_ms = now_ms;
        self.push_event(GameEvent::Tick { elapsed_ms });
        Some(elapsed_ms)
    }

    /// Fixed-timestep driver for hosts without a scheduler.
    ///
    /// Resolves a mismatch whose settle delay has passed and emits a live tick
    /// once per `tick_interval_ms`. Returns whether anything changed.
    ///
    /// Emitted events wait in the queue until [`GameState::take_events`];
    /// only the latest undrained `Tick` is kept.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let mut changed = false;

        if let Some(pending) = self.pending {
            if now_ms >= pending.due_ms {
                changed |= self.resolve_mismatch(pending.token);
            }
        }

        if self.timer.is_running()
            && now_ms.saturating_sub(self.last_tick_ms) >= self.config.tick_interval_ms
        {
            changed |= self.timer_tick(self.timer.epoch(), now_ms).is_some();
        }

        changed
    }

    fn win(&mut self, now_ms: u64) -> SelectOutcome {
        let time_ms = match self.timer.stop(now_ms) {
            Some(elapsed) => {
                self.push_event(GameEvent::TimerStopped);
                elapsed
            }
            None => self.timer.elapsed(now_ms),
        };
        let moves = self.moves;
        self.phase = GamePhase::Won;

        let new_best = self.store.save(BestScore::new(moves, time_ms));
        let formatted_time = format_elapsed(time_ms);
        info!(moves, time = %formatted_time, new_best, "game won");

        self.push_event(GameEvent::Won {
            moves,
            time_ms,
            formatted_time,
            new_best,
        });
        SelectOutcome::Won { moves, time_ms }
    }

    /// Abandon the current game and deal a fresh one.
    ///
    /// Callable from any phase. Any pending settle token and timer epoch from
    /// the old game become stale.
    pub fn reset(&mut self) {
        if self.timer.clear() {
            self.push_event(GameEvent::TimerStopped);
        }
        self.epoch = self.epoch.wrapping_add(1);
        self.selection.clear();
        self.pending = None;
        self.moves = 0;
        self.matches = 0;
        self.last_tick_ms = 0;

        // Config was validated at construction, so a deal cannot fail here; keep the
        // previous deck rather than panic if it somehow does.
        match Deck::build(
            self.config.pair_count,
            &self.config.alphabet,
            self.epoch,
            &mut self.rng,
        ) {
            Ok(deck) => self.deck = deck,
            Err(err) => warn!(error = %err, "redeal failed; keeping previous deck"),
        }
        self.phase = GamePhase::Idle;
        self.emit_deck_built();
    }

    fn emit_deck_built(&mut self) {
        let cards = self.deck.cards().to_vec();
        self.push_event(GameEvent::DeckBuilt {
            epoch: self.epoch,
            cards,
        });
    }

    pub fn snapshot_into(&self, now_ms: u64, out: &mut GameSnapshot) {
        out.cards.clear();
        out.cards.extend(self.deck.iter().map(CardSnapshot::from));
        out.epoch = self.epoch;
        out.phase = self.phase.as_str().to_string();
        out.locked = self.is_locked();
        out.moves = self.moves;
        out.matches = self.matches;
        out.pairs = self.deck.pair_count();
        out.elapsed_ms = self.timer.elapsed(now_ms);
        out.elapsed = format_elapsed(out.elapsed_ms);
        out.timer_running = self.timer.is_running();
        out.best = self.store.load();
    }

    pub fn snapshot(&self, now_ms: u64) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(now_ms, &mut s);
        s
    }
}
