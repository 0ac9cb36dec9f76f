//! Decision strategies and the players they are bound to.
//!
//! A strategy is anything implementing [`Strategy`], including plain closures with the
//! signature `Fn(&Hand, &str, &History) -> anyhow::Result<Card>`.
//!
//! Strategies are untrusted: they may return a card the hand does not hold, return an error, or
//! even panic. The tournament turns all of these into a forfeit instead of propagating them.

use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    sync::{Mutex, PoisonError},
};

use anyhow::Context;
use rand::{rngs::StdRng, seq::IndexedRandom, SeedableRng};

use crate::{card::Card, hand::Hand, history::History};

/// Chooses which card to play against an opponent.
pub trait Strategy {
    /// Returns the card to play.
    ///
    /// `hand` is the caller's own hand, `opponent` the name of the other player (usable as a key
    /// into `history`). Nothing forces the returned card to be in `hand`: an unavailable card is
    /// a forfeit.
    fn decide(&self, hand: &Hand, opponent: &str, history: &History) -> anyhow::Result<Card>;
}

impl<F> Strategy for F
where
    F: Fn(&Hand, &str, &History) -> anyhow::Result<Card>,
{
    fn decide(&self, hand: &Hand, opponent: &str, history: &History) -> anyhow::Result<Card> {
        self(hand, opponent, history)
    }
}

/// Plays a uniformly random card from the hand.
///
/// A seeded generator keeps working after a panic poisoned its lock.
#[derive(Debug, Default)]
pub struct RandomCard {
    rng: Option<Mutex<StdRng>>,
}

impl RandomCard {
    /// Draws from the thread-local generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws from a generator seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl Strategy for RandomCard {
    fn decide(&self, hand: &Hand, _opponent: &str, _history: &History) -> anyhow::Result<Card> {
        let card = match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                hand.cards().choose(&mut *rng).copied()
            }
            None => hand.cards().choose(&mut rand::rng()).copied(),
        };
        card.context("no card left to play")
    }
}

/// Always plays the same card, whether or not it is still in the hand.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysPlay(pub Card);

impl Strategy for AlwaysPlay {
    fn decide(&self, _hand: &Hand, _opponent: &str, _history: &History) -> anyhow::Result<Card> {
        Ok(self.0)
    }
}

/// A uniquely named participant bound to its strategy.
pub struct Player {
    /// Unique key of the player in a tournament.
    pub name: String,
    strategy: Box<dyn Strategy>,
}

impl Player {
    /// Binds `strategy` to `name`.
    pub fn new(name: impl Into<String>, strategy: impl Strategy + 'static) -> Player {
        Player {
            name: name.into(),
            strategy: Box::new(strategy),
        }
    }

    /// Binds an already boxed strategy to `name`.
    pub fn from_boxed(name: impl Into<String>, strategy: Box<dyn Strategy>) -> Player {
        Player {
            name: name.into(),
            strategy,
        }
    }

    /// Asks the bound strategy for a card.
    pub fn decide(&self, hand: &Hand, opponent: &str, history: &History) -> anyhow::Result<Card> {
        self.strategy.decide(hand, opponent, history)
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Player {}

impl Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player").field("name", &self.name).finish()
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Caller-supplied table of strategies, keyed by player name.
///
/// Snapshots only carry player names; the registry gives their behavior back when a
/// tournament is restored.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Box<dyn Strategy>>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the strategy of `name`.
    pub fn insert(&mut self, name: impl Into<String>, strategy: impl Strategy + 'static) {
        self.strategies.insert(name.into(), Box::new(strategy));
    }

    /// Chainable [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, strategy: impl Strategy + 'static) -> Self {
        self.insert(name, strategy);
        self
    }

    /// Removes the strategy of `name` and binds it into a [`Player`].
    pub fn take_player(&mut self, name: &str) -> Option<Player> {
        self.strategies
            .remove(name)
            .map(|strategy| Player::from_boxed(name, strategy))
    }

    /// True if `name` has a strategy.
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }
}

impl Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.strategies.keys()).finish()
    }
}

#[cfg(test)]
mod strategy_tests {
    use super::*;

    #[test]
    fn test_closure_strategy() -> anyhow::Result<()> {
        let player = Player::new("hoge", |hand: &Hand, _: &str, _: &History| {
            hand.cards().last().copied().context("empty hand")
        });
        let hand = Hand::from_cards(vec![Card::Rock, Card::Paper], 1);
        assert_eq!(player.decide(&hand, "foo", &History::new())?, Card::Paper);
        assert!(player
            .decide(&Hand::from_cards(vec![], 1), "foo", &History::new())
            .is_err());
        Ok(())
    }

    #[test]
    fn test_random_card_plays_from_hand() -> anyhow::Result<()> {
        let strategy = RandomCard::seeded(42);
        let hand = Hand::from_cards(vec![Card::Scissors, Card::Scissors], 1);
        for _ in 0..10 {
            assert_eq!(strategy.decide(&hand, "x", &History::new())?, Card::Scissors);
        }
        let unseeded = RandomCard::new();
        let card = unseeded.decide(&Hand::new(4, 1), "x", &History::new())?;
        assert!(Card::ALL.contains(&card));
        assert!(strategy
            .decide(&Hand::from_cards(vec![], 1), "x", &History::new())
            .is_err());
        Ok(())
    }

    #[test]
    fn test_seeded_random_card_survives_poisoned_lock() -> anyhow::Result<()> {
        let strategy = RandomCard::seeded(7);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            if let Some(rng) = &strategy.rng {
                let _guard = rng.lock();
                panic!("strategy panicked mid-decision");
            }
        }));
        assert!(result.is_err());
        assert!(strategy.rng.as_ref().is_some_and(|rng| rng.is_poisoned()));

        let hand = Hand::from_cards(vec![Card::Paper], 1);
        assert_eq!(strategy.decide(&hand, "x", &History::new())?, Card::Paper);
        Ok(())
    }

    #[test]
    fn test_registry() {
        let mut registry = StrategyRegistry::new()
            .with("rocky", AlwaysPlay(Card::Rock))
            .with("lucky", RandomCard::new());
        assert!(registry.contains("rocky"));
        let player = registry.take_player("rocky");
        assert_eq!(player.map(|p| p.name), Some("rocky".to_owned()));
        assert!(!registry.contains("rocky"));
        assert!(registry.take_player("nobody").is_none());
    }
}
