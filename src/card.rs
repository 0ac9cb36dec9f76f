//! The three cards of the game and their cyclic dominance.

use std::{fmt::Display, str::FromStr};

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// A playable card.
///
/// Dominance is cyclic: Rock beats Scissors, Scissors beats Paper and Paper beats Rock.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Card {
    /// Beats [`Card::Scissors`].
    Rock,
    /// Beats [`Card::Paper`].
    Scissors,
    /// Beats [`Card::Rock`].
    Paper,
}

impl Card {
    /// Every variant, in a fixed order.
    pub const ALL: [Card; 3] = [Card::Rock, Card::Scissors, Card::Paper];

    /// The card this one defeats.
    pub fn inferior(self) -> Card {
        match self {
            Card::Rock => Card::Scissors,
            Card::Scissors => Card::Paper,
            Card::Paper => Card::Rock,
        }
    }

    /// The card that defeats this one.
    pub fn superior(self) -> Card {
        match self {
            Card::Rock => Card::Paper,
            Card::Scissors => Card::Rock,
            Card::Paper => Card::Scissors,
        }
    }

    /// True if `self` defeats `other`.
    pub fn beats(self, other: Card) -> bool {
        self.inferior() == other
    }
}

/// True iff `a` defeats `b`.
pub fn beats(a: Card, b: Card) -> bool {
    a.beats(b)
}

/// True iff `a` and `b` are the same variant.
pub fn equals(a: Card, b: Card) -> bool {
    a == b
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Card::Rock => "rock",
            Card::Scissors => "scissors",
            Card::Paper => "paper",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Card {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock" => Ok(Card::Rock),
            "scissors" => Ok(Card::Scissors),
            "paper" => Ok(Card::Paper),
            other => bail!("'{other}' is not a card"),
        }
    }
}

#[cfg(test)]
mod card_tests {
    use super::*;

    #[test]
    fn test_cycle() {
        assert!(beats(Card::Rock, Card::Scissors));
        assert!(beats(Card::Scissors, Card::Paper));
        assert!(beats(Card::Paper, Card::Rock));
        for card in Card::ALL {
            assert!(!beats(card, card), "{card} beats itself");
            assert_eq!(card.superior().inferior(), card);
        }
    }

    #[test]
    fn test_exactly_one_relation() {
        for x in Card::ALL {
            for y in Card::ALL {
                let relations = [beats(x, y), beats(y, x), equals(x, y)];
                assert_eq!(
                    relations.iter().filter(|r| **r).count(),
                    1,
                    "{x} vs {y}: {relations:?}"
                );
            }
        }
    }

    #[test]
    fn test_from_str() -> anyhow::Result<()> {
        assert_eq!(Card::from_str("Rock")?, Card::Rock);
        assert_eq!(Card::from_str(" paper\n")?, Card::Paper);
        assert_eq!("scissors".parse::<Card>()?.to_string(), "scissors");
        assert!(Card::from_str("lizard").is_err());
        Ok(())
    }
}
