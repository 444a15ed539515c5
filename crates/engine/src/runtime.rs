//! Async host for one game.
//!
//! A driver task owns the [`GameState`] and processes commands one at a time,
//! so the state machine never sees concurrent mutation. Presentation code talks
//! to it through a cloneable [`GameHandle`].
//!
//! Deferred work requested by the core is turned into [`Schedule`]s that post
//! commands back into the same queue:
//!
//! - `MismatchPending` arms the settle schedule, which later posts
//!   `SettleExpired(token)`.
//! - `TimerStarted` arms the ticker, which posts `TimerTick(epoch)` every
//!   tick interval; `TimerStopped` cancels it.
//! - `DeckBuilt` (a reset) cancels any armed settle.
//!
//! Both callbacks carry the token/epoch they were armed for, and the core drops
//! them if that is no longer current.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::clock::{Clock, TokioClock};
use crate::core::{BestScore, ConfigError, GameConfig, GameSnapshot, GameState, ScoreStore};
use crate::observer::GameObserver;
use crate::schedule::Schedule;
use crate::types::{CardId, GameEvent, SelectOutcome, SettleToken};

/// Maximum queued commands before senders wait.
const COMMAND_QUEUE_DEPTH: usize = 64;

/// Command delivered to the driver task.
#[derive(Debug)]
pub(crate) enum Command {
    Select {
        id: CardId,
        reply: oneshot::Sender<SelectOutcome>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
    BestScore {
        reply: oneshot::Sender<Option<BestScore>>,
    },
    SettleExpired(SettleToken),
    TimerTick(u32),
}

/// Cloneable front door to a running game.
#[derive(Debug, Clone)]
pub struct GameHandle {
    tx: mpsc::Sender<Command>,
}

impl GameHandle {
    /// Forward a card selection.
    pub async fn select_card(&self, id: CardId) -> Result<SelectOutcome> {
        self.request(|reply| Command::Select { id, reply }).await
    }

    /// Abandon the current game and deal a new one.
    pub async fn reset(&self) -> Result<()> {
        self.request(|reply| Command::Reset { reply }).await
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn best_score(&self) -> Result<Option<BestScore>> {
        self.request(|reply| Command::BestScore { reply }).await
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| anyhow!("game driver has stopped"))?;
        rx.await.context("game driver dropped the request")
    }
}

/// Task that owns the game state.
pub(crate) struct GameDriver<S, O, C = TokioClock> {
    state: GameState<S>,
    observer: O,
    clock: C,
    tick_interval: Duration,
    cmd_rx: mpsc::Receiver<Command>,
    cmd_tx: mpsc::WeakSender<Command>,
    settle: Schedule,
    ticker: Schedule,
}

impl<S, O, C> GameDriver<S, O, C>
where
    S: ScoreStore,
    O: GameObserver,
    C: Clock,
{
    /// Main driver loop. Ends once every [`GameHandle`] is dropped.
    pub(crate) async fn run(mut self) {
        // Deliver the initial deal.
        self.flush_events();

        while let Some(cmd) = self.cmd_rx.recv().await {
            self.handle_command(cmd);
        }

        self.settle.cancel();
        self.ticker.cancel();
        debug!("game driver stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        let now_ms = self.clock.now_ms();
        match cmd {
            Command::Select { id, reply } => {
                let outcome = self.state.select_card(id, now_ms);
                self.flush_events();
                let _ = reply.send(outcome);
            }
            Command::Reset { reply } => {
                self.state.reset();
                self.flush_events();
                let _ = reply.send(());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.state.snapshot(now_ms));
            }
            Command::BestScore { reply } => {
                let _ = reply.send(self.state.best_score());
            }
            Command::SettleExpired(token) => {
                self.state.resolve_mismatch(token);
                self.flush_events();
            }
            Command::TimerTick(epoch) => {
                self.state.timer_tick(epoch, now_ms);
                self.flush_events();
            }
        }
    }

    /// Act on scheduling requests, then hand every event to the observer.
    fn flush_events(&mut self) {
        for event in self.state.take_events() {
            match &event {
                GameEvent::MismatchPending { token, delay_ms } => {
                    self.settle.once(
                        Duration::from_millis(*delay_ms),
                        self.cmd_tx.clone(),
                        Command::SettleExpired(*token),
                    );
                }
                GameEvent::TimerStarted { epoch } => {
                    let epoch = *epoch;
                    self.ticker.every(self.tick_interval, self.cmd_tx.clone(), move || {
                        Command::TimerTick(epoch)
                    });
                }
                GameEvent::TimerStopped => {
                    self.ticker.cancel();
                }
                GameEvent::DeckBuilt { .. } => {
                    self.settle.cancel();
                }
                _ => {}
            }
            self.observer.on_event(&event);
        }
    }
}

/// Start a game on the current tokio runtime.
///
/// The configuration is validated before anything is spawned. Returns the
/// handle and the driver's join handle; the driver exits once every handle is
/// dropped.
pub fn spawn_game<S, O>(
    config: GameConfig,
    store: S,
    observer: O,
) -> Result<(GameHandle, JoinHandle<()>), ConfigError>
where
    S: ScoreStore + Send + 'static,
    O: GameObserver + Send + 'static,
{
    spawn_game_with_clock(config, store, observer, TokioClock::new())
}

/// [`spawn_game`] with a caller-supplied clock.
pub fn spawn_game_with_clock<S, O, C>(
    config: GameConfig,
    store: S,
    observer: O,
    clock: C,
) -> Result<(GameHandle, JoinHandle<()>), ConfigError>
where
    S: ScoreStore + Send + 'static,
    O: GameObserver + Send + 'static,
    C: Clock + Send + 'static,
{
    let tick_interval = Duration::from_millis(config.tick_interval_ms);
    let pairs = config.pair_count;
    let state = GameState::new(config, store)?;

    let (tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let driver = GameDriver {
        state,
        observer,
        clock,
        tick_interval,
        cmd_rx,
        cmd_tx: tx.downgrade(),
        settle: Schedule::new(),
        ticker: Schedule::new(),
    };

    let task = tokio::spawn(driver.run());
    info!(pairs, "game started");
    Ok((GameHandle { tx }, task))
}
