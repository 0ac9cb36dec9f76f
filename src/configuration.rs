//! Config for the tournament behaviors
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! All values are optional. Unparseable values fall back to the default.
//!
//! - `RPS_RULESET` — `standard` or `short`, case-insensitive (default: `standard`)
//! - `RPS_CARDS_PER_KIND` — copies of each card in a fresh hand (default: ruleset value)
//! - `RPS_SEED` — seed of the pairing shuffle (default: unset, OS entropy)
//! - `RPS_LOG` — set to `"true"` to write a log file (default: `false`)

use std::{env, str::FromStr};

use anyhow::bail;

/// Named starting economy of a tournament.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum Ruleset {
    /// 4 coins and 4 cards of each kind.
    #[default]
    Standard,
    /// 3 coins and 4 cards of each kind.
    ShortStack,
}

impl Ruleset {
    /// Balance of a fresh hand.
    pub fn starting_coins(self) -> i32 {
        match self {
            Ruleset::Standard => 4,
            Ruleset::ShortStack => 3,
        }
    }

    /// Copies of each card in a fresh hand.
    pub fn cards_per_kind(self) -> usize {
        4
    }
}

impl FromStr for Ruleset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("standard") {
            Ok(Ruleset::Standard)
        } else if s.eq_ignore_ascii_case("short") || s.eq_ignore_ascii_case("short-stack") {
            Ok(Ruleset::ShortStack)
        } else {
            bail!("unknown ruleset '{s}'")
        }
    }
}

/// Configuration for tournament behaviors.
#[derive(Debug, Clone, Copy)]
pub struct Configuration {
    pub(crate) ruleset: Ruleset,
    pub(crate) cards_per_kind: Option<usize>,
    pub(crate) seed: Option<u64>,
    pub(crate) log: bool,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - The [`Ruleset::Standard`] economy is used.
    /// - Pairings are shuffled from OS entropy.
    /// - Logging to file is disabled.
    pub fn new() -> Self {
        Self {
            ruleset: Ruleset::Standard,
            cards_per_kind: None,
            seed: None,
            log: false,
        }
    }

    /// Create configuration from environment variables (see module documentation).
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn parse<T: FromStr>(var: &str) -> Option<T> {
            env::var(var).ok()?.trim().parse().ok()
        }

        Self {
            ruleset: parse("RPS_RULESET").unwrap_or_default(),
            cards_per_kind: parse("RPS_CARDS_PER_KIND"),
            seed: parse("RPS_SEED"),
            log: get_env_flag("RPS_LOG", false),
        }
    }

    /// Select the starting economy.
    pub fn with_ruleset(mut self, ruleset: Ruleset) -> Self {
        self.ruleset = ruleset;
        self
    }

    /// Override the number of copies of each card in a fresh hand.
    pub fn with_cards_per_kind(mut self, count: usize) -> Self {
        self.cards_per_kind = Some(count);
        self
    }

    /// Make the pairing shuffle deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Selected economy.
    pub fn ruleset(&self) -> Ruleset {
        self.ruleset
    }

    /// Balance dealt by `initialize`.
    pub fn starting_coins(&self) -> i32 {
        self.ruleset.starting_coins()
    }

    /// Copies of each card dealt by `initialize`, override first.
    pub fn cards_per_kind(&self) -> usize {
        self.cards_per_kind
            .unwrap_or_else(|| self.ruleset.cards_per_kind())
    }

    /// Seed of the pairing shuffle, if fixed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod configuration_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.ruleset(), Ruleset::Standard);
        assert_eq!(config.starting_coins(), 4);
        assert_eq!(config.cards_per_kind(), 4);
        assert_eq!(config.seed(), None);
        assert!(!config.log);
    }

    #[test]
    fn test_builder() {
        let config = Configuration::new()
            .with_ruleset(Ruleset::ShortStack)
            .with_cards_per_kind(1)
            .with_seed(7);
        assert_eq!(config.starting_coins(), 3);
        assert_eq!(config.cards_per_kind(), 1);
        assert_eq!(config.seed(), Some(7));
    }

    #[test]
    fn test_ruleset_from_str() {
        assert_eq!("SHORT".parse::<Ruleset>().ok(), Some(Ruleset::ShortStack));
        assert_eq!("standard".parse::<Ruleset>().ok(), Some(Ruleset::Standard));
        assert!("tall".parse::<Ruleset>().is_err());
    }
}
