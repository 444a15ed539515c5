//! Presentation-side callbacks.
//!
//! A view binds to the game by implementing [`GameObserver`]. Every method
//! has a no-op default, so an observer only overrides what it renders.
//! [`GameObserver::on_event`] receives every event (including the host-side
//! scheduling events) and fans out to the typed callbacks by default.

use tokio::sync::mpsc;

use crate::types::{Card, GameEvent};

pub trait GameObserver {
    fn on_deck_built(&mut self, _cards: &[Card]) {}

    fn on_reveal(&mut self, _card: &Card) {}

    fn on_unflip(&mut self, _card: &Card) {}

    fn on_matched(&mut self, _first: &Card, _second: &Card) {}

    fn on_tick(&mut self, _elapsed_ms: u64) {}

    fn on_win(&mut self, _moves: u32, _formatted_time: &str) {}

    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::DeckBuilt { cards, .. } => self.on_deck_built(cards),
            GameEvent::Revealed(card) => self.on_reveal(card),
            GameEvent::Unflipped(card) => self.on_unflip(card),
            GameEvent::Matched(first, second) => self.on_matched(first, second),
            GameEvent::Tick { elapsed_ms } => self.on_tick(*elapsed_ms),
            GameEvent::Won {
                moves,
                formatted_time,
                ..
            } => self.on_win(*moves, formatted_time),
            GameEvent::MismatchPending { .. }
            | GameEvent::TimerStarted { .. }
            | GameEvent::TimerStopped => {}
        }
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl GameObserver for NoopObserver {}

/// Observer that forwards every event into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<GameEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<GameEvent>) -> Self {
        Self { tx }
    }

    /// Observer plus the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl GameObserver for ChannelObserver {
    fn on_event(&mut self, event: &GameEvent) {
        // Receiver gone just means nobody is watching any more.
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CardId, SettleToken, Symbol};

    #[derive(Default)]
    struct Tally {
        decks: usize,
        reveals: usize,
        unflips: usize,
        matches: usize,
        ticks: Vec<u64>,
        wins: Vec<(u32, String)>,
    }

    impl GameObserver for Tally {
        fn on_deck_built(&mut self, _cards: &[Card]) {
            self.decks += 1;
        }

        fn on_reveal(&mut self, _card: &Card) {
            self.reveals += 1;
        }

        fn on_unflip(&mut self, _card: &Card) {
            self.unflips += 1;
        }

        fn on_matched(&mut self, _first: &Card, _second: &Card) {
            self.matches += 1;
        }

        fn on_tick(&mut self, elapsed_ms: u64) {
            self.ticks.push(elapsed_ms);
        }

        fn on_win(&mut self, moves: u32, formatted_time: &str) {
            self.wins.push((moves, formatted_time.to_string()));
        }
    }

    fn card(slot: u16) -> Card {
        Card::new(CardId::new(0, slot), Symbol::from("🍇"))
    }

    #[test]
    fn on_event_dispatches_to_typed_callbacks() {
        let mut tally = Tally::default();
        let events = [
            GameEvent::DeckBuilt {
                epoch: 0,
                cards: vec![card(0), card(1)],
            },
            GameEvent::TimerStarted { epoch: 1 },
            GameEvent::Revealed(card(0)),
            GameEvent::Revealed(card(1)),
            GameEvent::MismatchPending {
                token: SettleToken { epoch: 0, turn: 1 },
                delay_ms: 700,
            },
            GameEvent::Unflipped(card(0)),
            GameEvent::Tick { elapsed_ms: 250 },
            GameEvent::Matched(card(0), card(1)),
            GameEvent::TimerStopped,
            GameEvent::Won {
                moves: 1,
                time_ms: 900,
                formatted_time: "00:00".to_string(),
                new_best: true,
            },
        ];
        for event in &events {
            tally.on_event(event);
        }

        assert_eq!(tally.decks, 1);
        assert_eq!(tally.reveals, 2);
        assert_eq!(tally.unflips, 1);
        assert_eq!(tally.matches, 1);
        assert_eq!(tally.ticks, vec![250]);
        assert_eq!(tally.wins, vec![(1, "00:00".to_string())]);
    }

    #[test]
    fn channel_observer_forwards_everything() {
        let (mut observer, mut rx) = ChannelObserver::channel();
        observer.on_event(&GameEvent::TimerStopped);
        observer.on_event(&GameEvent::Tick { elapsed_ms: 5 });

        assert_eq!(rx.try_recv().ok(), Some(GameEvent::TimerStopped));
        assert_eq!(rx.try_recv().ok(), Some(GameEvent::Tick { elapsed_ms: 5 }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_observer_survives_dropped_receiver() {
        let (mut observer, rx) = ChannelObserver::channel();
        drop(rx);
        observer.on_event(&GameEvent::TimerStopped);
    }
}
