use serde::Serialize;

use crate::score::BestScore;
use crate::types::Card;

/// Presentation view of one card.
///
/// `symbol` is only filled in while the card is face up, so the snapshot can
/// be handed to a view (or a screen reader) without leaking hidden faces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CardSnapshot {
    pub id: String,
    pub token: String,
    pub state: &'static str,
    pub symbol: Option<String>,
}

impl From<&Card> for CardSnapshot {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id.to_string(),
            token: card.token(),
            state: card.state.as_str(),
            symbol: card.visible_symbol().map(|s| s.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub cards: Vec<CardSnapshot>,
    pub epoch: u32,
    pub phase: String,
    pub locked: bool,
    pub moves: u32,
    pub matches: usize,
    pub pairs: usize,
    pub elapsed_ms: u64,
    /// `elapsed_ms` as `MM:SS`.
    pub elapsed: String,
    pub timer_running: bool,
    pub best: Option<BestScore>,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn playable(&self) -> bool {
        !self.locked && self.matches < self.pairs
    }

    pub fn face_up(&self) -> usize {
        self.cards.iter().filter(|c| c.symbol.is_some()).count()
    }
}
