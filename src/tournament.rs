//! The round engine.
//!
//! A [`Tournament`] owns the registered players, one [`Hand`] per player and the shared
//! [`History`]. The caller drives it:
//!
//! 1. [`register`](Tournament::register) every player,
//! 2. [`initialize`](Tournament::initialize) to deal fresh hands,
//! 3. call [`simulate`](Tournament::simulate) until it returns `Ok(false)`.
//!
//! Each `simulate` call plays exactly one round: eligible players (cards left and a positive
//! balance) are shuffled and paired in order. With an odd count the last player of the
//! shuffled order sits out, untouched. In each pair both strategies are asked for a card; a
//! strategy that fails, panics, or names a card its hand no longer holds forfeits and its
//! balance drops to zero. Otherwise the winner takes one coin from the loser.
//!
//! The whole state can be exported with [`snapshot`](Tournament::snapshot) and rebuilt with
//! [`restore`](Tournament::restore).

use std::{
    collections::BTreeMap,
    fmt::Display,
    panic::{self, AssertUnwindSafe},
};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{
    card::beats,
    configuration::Configuration,
    hand::Hand,
    history::{DuelRecord, History, Play},
    logger::init_logger,
    strategy::{Player, StrategyRegistry},
};

/// Misuse of the engine. Never raised for anything a strategy does.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TournamentError {
    /// `simulate` was called before `initialize`, or after a new registration.
    #[error("tournament is not initialized")]
    NotInitialized,
    /// A round needs at least two registered players.
    #[error("at least 2 players are needed, {registered} registered")]
    NotEnoughPlayers {
        /// Players registered when the round was requested.
        registered: usize,
    },
    /// A snapshot names a player the registry has no strategy for.
    #[error("no strategy registered for player '{name}'")]
    MissingStrategy {
        /// Name of the player without strategy.
        name: String,
    },
    /// A snapshot marked as initialized lacks a hand.
    #[error("no hand for player '{name}'")]
    MissingHand {
        /// Name of the player without hand.
        name: String,
    },
}

/// Lifecycle of a tournament.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum TournamentState {
    /// No hands dealt since the last registration.
    NotInitialized,
    /// Hands dealt, no round played yet.
    Ready,
    /// At least one round played.
    InProgress,
    /// Fewer than two players are still eligible.
    Concluded,
}

/// Everything needed to rebuild a tournament, except the strategies themselves.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    /// Player names in registration order.
    pub players: Vec<String>,
    /// Hand of each player, empty before initialization.
    pub hands: BTreeMap<String, Hand>,
    /// Every duel played so far.
    pub history: History,
    /// Rounds played since initialization.
    pub round: usize,
    /// Lifecycle state at the time of the snapshot.
    pub state: TournamentState,
}

/// One elimination tournament.
pub struct Tournament {
    config: Configuration,
    players: Vec<Player>,
    hands: BTreeMap<String, Hand>,
    history: History,
    round: usize,
    state: TournamentState,
    rng: StdRng,
}

impl Tournament {
    /// Creates an empty tournament.
    ///
    /// The pairing shuffle is seeded from `config` when a seed is set, from OS entropy otherwise.
    /// If `config` enables logging, a file logger is installed; failing to do so is only logged.
    #[instrument(skip_all)]
    pub fn new(config: Configuration) -> Self {
        if config.log {
            if let Err(e) = init_logger() {
                error!("{e:#}");
            }
        }
        trace!(?config);

        Self::with_rng(config, shuffle_rng(&config))
    }

    /// Creates an empty tournament shuffling pairings with `rng`.
    pub fn with_rng(config: Configuration, rng: StdRng) -> Self {
        Tournament {
            config,
            players: vec![],
            hands: BTreeMap::new(),
            history: History::new(),
            round: 0,
            state: TournamentState::NotInitialized,
            rng,
        }
    }

    /// Adds a player. A player with the same name is replaced, keeping its place.
    ///
    /// Registering puts the tournament back to [`TournamentState::NotInitialized`].
    #[instrument(skip_all, fields(name = %player.name))]
    pub fn register(&mut self, player: Player) {
        if let Some(slot) = self.players.iter_mut().find(|p| p.name == player.name) {
            warn!("'{}' already registered, replacing its strategy", player.name);
            *slot = player;
        } else {
            info!("'{}' registered", player.name);
            self.players.push(player);
        }
        if self.state != TournamentState::NotInitialized {
            warn!("registration after initialization, hands must be dealt again");
            self.state = TournamentState::NotInitialized;
        }
    }

    /// Deals a fresh hand to every registered player and clears the history.
    #[instrument(skip_all)]
    pub fn initialize(&mut self) {
        let coins = self.config.starting_coins();
        let cards_per_kind = self.config.cards_per_kind();
        self.hands = self
            .players
            .iter()
            .map(|p| (p.name.clone(), Hand::new(cards_per_kind, coins)))
            .collect();
        self.history = History::new();
        self.round = 0;
        self.state = TournamentState::Ready;
        info!(
            players = self.players.len(),
            coins, cards_per_kind, "tournament initialized"
        );
    }

    /// Plays one round.
    ///
    /// Returns `Ok(false)` once fewer than two players are eligible, in which case nothing is
    /// played. `Ok(true)` means a round was played and another one may be possible.
    ///
    /// # Errors
    /// [`TournamentError::NotInitialized`] and [`TournamentError::NotEnoughPlayers`] signal
    /// misuse, distinct from the normal end of the tournament.
    #[instrument(skip_all)]
    pub fn simulate(&mut self) -> Result<bool, TournamentError> {
        if self.state == TournamentState::NotInitialized {
            return Err(TournamentError::NotInitialized);
        }
        if self.players.len() < 2 {
            return Err(TournamentError::NotEnoughPlayers {
                registered: self.players.len(),
            });
        }

        let mut eligible: Vec<usize> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| self.hands.get(&p.name).is_some_and(Hand::is_eligible))
            .map(|(i, _)| i)
            .collect();
        if eligible.len() < 2 {
            debug!("no more matches enabled");
            self.state = TournamentState::Concluded;
            return Ok(false);
        }

        eligible.shuffle(&mut self.rng);
        self.round += 1;
        self.state = TournamentState::InProgress;
        info!(eligible = eligible.len(), "round {}", self.round);

        let pairs = eligible.chunks_exact(2);
        if let [idle] = pairs.remainder() {
            info!("{} sits out this round", self.players[*idle].name);
        }
        for pair in pairs {
            self.duel(pair[0], pair[1]);
        }
        Ok(true)
    }

    fn duel(&mut self, a: usize, b: usize) {
        let play_a = self.play(a, b);
        let play_b = self.play(b, a);
        let name_a = self.players[a].name.clone();
        let name_b = self.players[b].name.clone();

        self.history.push(DuelRecord {
            round: self.round,
            plays: [(name_a.clone(), play_a), (name_b.clone(), play_b)],
        });
        debug!("{name_a} [{play_a}] vs {name_b} [{play_b}]");

        let (Play::Card(card_a), Play::Card(card_b)) = (play_a, play_b) else {
            return;
        };
        if beats(card_a, card_b) {
            debug!("{name_a} wins");
            self.transfer_coin(&name_a, &name_b);
        } else if beats(card_b, card_a) {
            debug!("{name_b} wins");
            self.transfer_coin(&name_b, &name_a);
        } else {
            debug!("draw");
        }
    }

    /// Asks `player` for a card against `opponent` and takes it from their hand.
    ///
    /// Any failure zeroes the player's coins and is recorded as a forfeit.
    fn play(&mut self, player: usize, opponent: usize) -> Play {
        let name = &self.players[player].name;
        let Some(hand) = self.hands.get(name) else {
            // unreachable while initialized: every player was dealt a hand
            return Play::Forfeit;
        };

        let decision = panic::catch_unwind(AssertUnwindSafe(|| {
            self.players[player].decide(hand, &self.players[opponent].name, &self.history)
        }));
        let card = match decision {
            Ok(Ok(card)) => Some(card),
            Ok(Err(e)) => {
                warn!("strategy of '{name}' failed: {e:#}");
                None
            }
            Err(_) => {
                warn!("strategy of '{name}' panicked");
                None
            }
        };

        let Some(hand) = self.hands.get_mut(name) else {
            return Play::Forfeit;
        };
        match card.and_then(|card| hand.take_card(card)) {
            Some(card) => Play::Card(card),
            None => {
                if let Some(card) = card {
                    warn!("'{name}' played {card} without holding one");
                }
                warn!("'{name}' forfeits, losing {} coins", hand.coins());
                hand.clear_coins();
                Play::Forfeit
            }
        }
    }

    fn transfer_coin(&mut self, winner: &str, loser: &str) {
        if let Some(hand) = self.hands.get_mut(winner) {
            hand.adjust_coins(1);
        }
        if let Some(hand) = self.hands.get_mut(loser) {
            hand.adjust_coins(-1);
            if hand.coins() < 0 {
                hand.clear_coins();
            }
        }
    }

    /// Exports the current state.
    pub fn snapshot(&self) -> TournamentSnapshot {
        TournamentSnapshot {
            players: self.players.iter().map(|p| p.name.clone()).collect(),
            hands: self.hands.clone(),
            history: self.history.clone(),
            round: self.round,
            state: self.state,
        }
    }

    /// Rebuilds a tournament from `snapshot`, taking each player's strategy from `registry`.
    ///
    /// # Errors
    /// Fails if a player has no strategy in `registry`, or if an initialized snapshot lacks a
    /// player's hand.
    #[instrument(skip_all)]
    pub fn restore(
        snapshot: TournamentSnapshot,
        mut registry: StrategyRegistry,
        config: Configuration,
    ) -> Result<Self, TournamentError> {
        let players = snapshot
            .players
            .iter()
            .map(|name| {
                registry
                    .take_player(name)
                    .ok_or_else(|| TournamentError::MissingStrategy { name: name.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if snapshot.state != TournamentState::NotInitialized {
            if let Some(name) = snapshot
                .players
                .iter()
                .find(|name| !snapshot.hands.contains_key(*name))
            {
                return Err(TournamentError::MissingHand { name: name.clone() });
            }
        }

        // the logger, if any, was installed when the original tournament was created
        let mut tournament = Self::with_rng(config, shuffle_rng(&config));
        tournament.players = players;
        tournament.hands = snapshot.hands;
        tournament.history = snapshot.history;
        tournament.round = snapshot.round;
        tournament.state = snapshot.state;
        info!(
            players = tournament.players.len(),
            round = tournament.round,
            "tournament restored"
        );
        Ok(tournament)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TournamentState {
        self.state
    }

    /// Number of rounds played since the last initialization.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Registered players, in registration order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Hand of `name`, if dealt.
    pub fn hand(&self, name: &str) -> Option<&Hand> {
        self.hands.get(name)
    }

    /// Duels played since initialization.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Names of the players that can still be paired.
    pub fn eligible_players(&self) -> Vec<&str> {
        self.players
            .iter()
            .filter(|p| self.hands.get(&p.name).is_some_and(Hand::is_eligible))
            .map(|p| p.name.as_str())
            .collect()
    }
}

fn shuffle_rng(config: &Configuration) -> StdRng {
    match config.seed() {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

impl Display for Tournament {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines = self
            .players
            .iter()
            .map(|p| match self.hands.get(&p.name) {
                Some(hand) => format!("{p}: {hand}"),
                None => format!("{p}: -"),
            })
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tournament_tests {
    use super::*;
    use crate::{card::Card, strategy::AlwaysPlay};

    fn seeded(seed: u64) -> Tournament {
        Tournament::with_rng(Configuration::new(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_precondition_errors() {
        let mut tournament = seeded(0);
        assert_eq!(tournament.simulate(), Err(TournamentError::NotInitialized));

        tournament.register(Player::new("solo", AlwaysPlay(Card::Rock)));
        tournament.initialize();
        assert_eq!(
            tournament.simulate(),
            Err(TournamentError::NotEnoughPlayers { registered: 1 })
        );

        tournament.register(Player::new("duo", AlwaysPlay(Card::Paper)));
        assert_eq!(tournament.state(), TournamentState::NotInitialized);
        assert_eq!(tournament.simulate(), Err(TournamentError::NotInitialized));
    }

    #[test]
    fn test_initialize_deals_fresh_hands() -> Result<(), TournamentError> {
        let mut tournament = seeded(1);
        tournament.register(Player::new("a", AlwaysPlay(Card::Rock)));
        tournament.register(Player::new("b", AlwaysPlay(Card::Paper)));
        tournament.initialize();
        assert_eq!(tournament.state(), TournamentState::Ready);
        assert!(tournament.simulate()?);
        assert_eq!(tournament.history().len(), 1);

        tournament.initialize();
        assert!(tournament.history().is_empty());
        assert_eq!(tournament.round(), 0);
        assert_eq!(tournament.hand("a"), Some(&Hand::new(4, 4)));
        assert_eq!(tournament.hand("b"), Some(&Hand::new(4, 4)));
        Ok(())
    }

    #[test]
    fn test_duplicate_registration_replaces() -> Result<(), TournamentError> {
        let mut tournament = seeded(2);
        tournament.register(Player::new("a", AlwaysPlay(Card::Scissors)));
        tournament.register(Player::new("b", AlwaysPlay(Card::Paper)));
        tournament.register(Player::new("a", AlwaysPlay(Card::Rock)));
        assert_eq!(tournament.players().len(), 2);
        assert_eq!(tournament.players()[0].name, "a");

        tournament.initialize();
        tournament.simulate()?;
        // rock loses to paper: the replacement strategy played
        assert_eq!(tournament.hand("a").map(Hand::coins), Some(3));
        assert_eq!(tournament.hand("b").map(Hand::coins), Some(5));
        Ok(())
    }

    #[test]
    fn test_panicking_strategy_forfeits() -> Result<(), TournamentError> {
        let mut tournament = seeded(3);
        tournament.register(Player::new(
            "boom",
            |_: &Hand, _: &str, _: &History| -> anyhow::Result<Card> { panic!("boom") },
        ));
        tournament.register(Player::new("calm", AlwaysPlay(Card::Rock)));
        tournament.initialize();

        assert!(tournament.simulate()?);
        assert_eq!(tournament.hand("boom").map(Hand::coins), Some(0));
        assert_eq!(tournament.hand("calm").map(Hand::coins), Some(4));
        assert_eq!(tournament.hand("calm").map(|h| h.count(Card::Rock)), Some(3));
        assert_eq!(
            tournament.history().last().and_then(|r| r.play_of("boom")),
            Some(Play::Forfeit)
        );
        assert!(!tournament.simulate()?);
        assert_eq!(tournament.state(), TournamentState::Concluded);
        Ok(())
    }

    #[test]
    fn test_display() {
        let mut tournament = seeded(4);
        tournament.register(Player::new("hoge", AlwaysPlay(Card::Rock)));
        tournament.register(Player::new("foo", AlwaysPlay(Card::Rock)));
        assert_eq!(tournament.to_string(), "hoge: -\nfoo: -");
        tournament.initialize();
        let expected = Hand::new(4, 4).to_string();
        assert_eq!(
            tournament.to_string(),
            format!("hoge: {expected}\nfoo: {expected}")
        );
    }
}
