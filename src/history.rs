//! Append-only record of every duel played in a tournament.
//!
//! History is shared with every strategy as information only. The authoritative state is in
//! the hands.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// What one side of a duel did.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Play {
    /// A card was validly played.
    Card(Card),
    /// The strategy failed or asked for a card that was not in the hand.
    Forfeit,
}

impl Play {
    /// The card played, if any.
    pub fn card(self) -> Option<Card> {
        match self {
            Play::Card(card) => Some(card),
            Play::Forfeit => None,
        }
    }

    /// True for [`Play::Forfeit`].
    pub fn is_forfeit(self) -> bool {
        self == Play::Forfeit
    }
}

impl Display for Play {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Play::Card(card) => write!(f, "{card}"),
            Play::Forfeit => write!(f, "forfeit"),
        }
    }
}

/// One duel between two players.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct DuelRecord {
    /// Round in which the duel happened, starting at 1.
    pub round: usize,
    /// Both participants with what they played, in pairing order.
    pub plays: [(String, Play); 2],
}

impl DuelRecord {
    /// What `name` played in this duel, if they took part.
    pub fn play_of(&self, name: &str) -> Option<Play> {
        self.plays
            .iter()
            .find_map(|(player, play)| (player == name).then_some(*play))
    }

    /// The other participant, if `name` took part.
    pub fn opponent_of(&self, name: &str) -> Option<&str> {
        match &self.plays {
            [(a, _), (b, _)] if a == name => Some(b.as_str()),
            [(a, _), (b, _)] if b == name => Some(a.as_str()),
            _ => None,
        }
    }

    /// True if `name` took part in this duel.
    pub fn involves(&self, name: &str) -> bool {
        self.plays.iter().any(|(player, _)| player == name)
    }
}

impl Display for DuelRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [(a, play_a), (b, play_b)] = &self.plays;
        write!(f, "#{} {a} [{play_a}] VS {b} [{play_b}]", self.round)
    }
}

/// Ordered sequence of duels. Grows monotonically, never rewritten.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    records: Vec<DuelRecord>,
}

impl History {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: DuelRecord) {
        self.records.push(record);
    }

    /// Every duel, oldest first.
    pub fn records(&self) -> &[DuelRecord] {
        &self.records
    }

    /// Iterates over duels, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DuelRecord> {
        self.records.iter()
    }

    /// Number of duels recorded.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True before the first duel.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent duel.
    pub fn last(&self) -> Option<&DuelRecord> {
        self.records.last()
    }

    /// Every play made by `name`, oldest first.
    pub fn plays_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Play> + 'a {
        self.records.iter().filter_map(move |r| r.play_of(name))
    }

    /// Duels where `name` met `opponent`, oldest first.
    pub fn between<'a>(
        &'a self,
        name: &'a str,
        opponent: &'a str,
    ) -> impl Iterator<Item = &'a DuelRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.opponent_of(name) == Some(opponent))
    }
}
