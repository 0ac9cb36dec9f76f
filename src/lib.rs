//! # Rps Tournament
//!
//! A round-pairing engine for elimination tournaments of rock-paper-scissors played with a
//! scarce hand of cards and a coin stake.
//!
//! It provides:
//! - The cards and their cyclic dominance ([`card`])
//! - Per-player hands of cards and coins ([`hand`])
//! - Pluggable decision strategies ([`strategy`])
//! - The round engine, its state machine and snapshots ([`tournament`])
//!
//! Every player starts with the same hand (see [`Ruleset`](crate::configuration::Ruleset)).
//! Each round, eligible players are shuffled and paired, each reveals one card chosen by its
//! strategy, and the winner of each pair takes a coin from the loser. A strategy naming a card
//! it does not hold forfeits its whole balance. Players without cards or coins are out; the
//! tournament is over once fewer than two players remain.
//!
//! # Usage Example
//!
//! ```
//! use rps_tournament::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Configuration::new().with_seed(42);
//!     let mut tournament = Tournament::new(config);
//!
//!     tournament.register(Player::new("hoge", RandomCard::new()));
//!     tournament.register(Player::new("foo", AlwaysPlay(Card::Rock)));
//!     tournament.register(Player::new(
//!         "bar",
//!         |hand: &Hand, opponent: &str, history: &History| {
//!             // answer the opponent's last card, if we still can
//!             let last = history.plays_of(opponent).filter_map(Play::card).last();
//!             match last.map(Card::superior) {
//!                 Some(card) if hand.count(card) > 0 => Ok(card),
//!                 _ => hand.cards().first().copied().ok_or(anyhow::anyhow!("empty")),
//!             }
//!         },
//!     ));
//!
//!     tournament.initialize();
//!     while tournament.simulate()? {
//!         println!("{tournament}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub use anyhow;
pub mod card;
pub mod configuration;
pub mod hand;
pub mod history;
mod logger;
pub mod strategy;
pub mod tournament;

/// Commonly used types and traits for quick access.
///
/// ```rust
/// use rps_tournament::prelude::*;
/// ```
pub mod prelude {
    pub use crate::card::Card;
    pub use crate::configuration::{Configuration, Ruleset};
    pub use crate::hand::Hand;
    pub use crate::history::{DuelRecord, History, Play};
    pub use crate::strategy::{AlwaysPlay, Player, RandomCard, Strategy, StrategyRegistry};
    pub use crate::tournament::{Tournament, TournamentError, TournamentSnapshot, TournamentState};
}
