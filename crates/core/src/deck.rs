//! Deck module - paired deal and Fisher-Yates shuffle
//!
//! A deal takes the first `pair_count` symbols of the alphabet, duplicates
//! them, numbers every slot, then shuffles the whole sequence. Every symbol
//! ends up on exactly two cards and every card gets a distinct id.

use rand::Rng;

use crate::config::ConfigError;
use crate::types::{Card, CardId, CardState, Symbol};

/// Shuffle a slice in place using Fisher-Yates.
///
/// Walks from the last index down to 1 and swaps each element with one drawn
/// uniformly from `[0, i]`, so every permutation is equally likely given a
/// uniform source.
pub fn shuffle<T, R: Rng + ?Sized>(slice: &mut [T], rng: &mut R) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

/// Ordered cards of one deal.
///
/// Composition is fixed once dealt; only per-card state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Deal a shuffled deck of `pair_count` pairs tagged with `epoch`.
    pub fn build<R: Rng + ?Sized>(
        pair_count: usize,
        alphabet: &[Symbol],
        epoch: u32,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        if pair_count == 0 {
            return Err(ConfigError::NoPairs);
        }
        if pair_count > alphabet.len() {
            return Err(ConfigError::TooManyPairs {
                requested: pair_count,
                available: alphabet.len(),
            });
        }

        let choices = &alphabet[..pair_count];
        let mut cards = Vec::with_capacity(pair_count * 2);
        for (slot, symbol) in choices.iter().chain(choices.iter()).enumerate() {
            let slot = u16::try_from(slot).map_err(|_| ConfigError::TooManyPairs {
                requested: pair_count,
                available: usize::from(u16::MAX / 2),
            })?;
            cards.push(Card::new(CardId::new(epoch, slot), symbol.clone()));
        }

        shuffle(&mut cards, rng);
        Ok(Self { cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    /// Position of the card with `id`, if it belongs to this deal.
    pub fn position(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub(crate) fn set_state(&mut self, index: usize, state: CardState) -> Option<&Card> {
        let card = self.cards.get_mut(index)?;
        card.state = state;
        Some(card)
    }

    pub fn count_in_state(&self, state: CardState) -> usize {
        self.cards.iter().filter(|c| c.state == state).count()
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}
