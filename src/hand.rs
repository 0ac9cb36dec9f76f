//! A player's remaining cards and coin balance.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Cards left to play and coins at stake for one player.
///
/// Only the tournament mutates hands during a round; strategies receive them read-only.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
    coins: i32,
}

impl Hand {
    /// A fresh hand with `cards_per_kind` copies of each card.
    pub fn new(cards_per_kind: usize, coins: i32) -> Self {
        let cards = Card::ALL
            .iter()
            .flat_map(|card| std::iter::repeat(*card).take(cards_per_kind))
            .collect();
        Self { cards, coins }
    }

    /// A hand holding exactly `cards`.
    pub fn from_cards(cards: Vec<Card>, coins: i32) -> Self {
        Self { cards, coins }
    }

    /// Cards left, in no particular order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Current balance.
    pub fn coins(&self) -> i32 {
        self.coins
    }

    /// Number of copies of `card` still held.
    pub fn count(&self, card: Card) -> usize {
        self.cards.iter().filter(|c| **c == card).count()
    }

    /// True if at least one card is left.
    pub fn has_playable_cards(&self) -> bool {
        !self.cards.is_empty()
    }

    /// A player can be paired only with at least one card and a positive balance.
    pub fn is_eligible(&self) -> bool {
        self.has_playable_cards() && self.coins > 0
    }

    /// Removes one copy of `card`, or returns `None` if none is left.
    pub fn take_card(&mut self, card: Card) -> Option<Card> {
        let pos = self.cards.iter().position(|c| *c == card)?;
        Some(self.cards.remove(pos))
    }

    /// `coins += delta`, without any floor.
    pub fn adjust_coins(&mut self, delta: i32) {
        self.coins += delta;
    }

    /// Sets the balance to exactly zero.
    pub fn clear_coins(&mut self) {
        self.coins = 0;
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cards = self
            .cards
            .iter()
            .map(Card::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "[{}] {cards}", self.coins)
    }
}
