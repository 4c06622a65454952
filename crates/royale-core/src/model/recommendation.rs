use super::rarity::Rarity;
use super::role::CardRole;
use serde::{Deserialize, Serialize};

/// Standard deck size.
pub const DECK_SIZE: usize = 8;

/// One card inside a recommended deck, carrying the score it was selected with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetail {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub rarity: Option<Rarity>,
    pub elixir: u32,
    pub role: Option<CardRole>,
    pub score: f64,
    #[serde(default)]
    pub evolution_level: u32,
    #[serde(default)]
    pub max_evolution_level: u32,
}

impl CardDetail {
    /// Current level as a fraction of max, capped at 1.0; cards with an
    /// unknown max level contribute nothing.
    pub fn level_ratio(&self) -> f64 {
        if self.max_level == 0 {
            return 0.0;
        }
        (f64::from(self.level) / f64::from(self.max_level)).min(1.0)
    }
}

/// A scored deck produced by a deck builder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeckRecommendation {
    pub cards: Vec<CardDetail>,
    pub average_elixir: f64,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub evolution_slots: Vec<String>,
}

impl DeckRecommendation {
    pub fn new(cards: Vec<CardDetail>) -> Self {
        let mut deck = Self {
            cards,
            ..Self::default()
        };
        deck.average_elixir = deck.calculate_average_elixir();
        deck
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn card_names(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|card| card.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cards.iter().any(|card| card.name == name)
    }

    /// Average elixir rounded to two decimals.
    pub fn calculate_average_elixir(&self) -> f64 {
        if self.cards.is_empty() {
            return 0.0;
        }
        let total: u32 = self.cards.iter().map(|card| card.elixir).sum();
        let avg = f64::from(total) / self.cards.len() as f64;
        (avg * 100.0).round() / 100.0
    }

    /// Sum of per-card scores.
    pub fn total_score(&self) -> f64 {
        self.cards.iter().map(|card| card.score).sum()
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(name: &str, elixir: u32, score: f64) -> CardDetail {
        CardDetail {
            name: name.to_string(),
            level: 10,
            max_level: 16,
            rarity: Some(Rarity::Common),
            elixir,
            role: None,
            score,
            evolution_level: 0,
            max_evolution_level: 0,
        }
    }

    #[test]
    fn average_elixir_rounds_to_two_places() {
        let deck = DeckRecommendation::new(vec![
            detail("A", 3, 1.0),
            detail("B", 4, 1.0),
            detail("C", 4, 1.0),
        ]);
        assert_eq!(deck.average_elixir, 3.67);
        assert_eq!(deck.total_score(), 3.0);
    }

    #[test]
    fn level_ratio_stays_within_unit_range() {
        let mut card = detail("A", 3, 1.0);
        assert_eq!(card.level_ratio(), 10.0 / 16.0);
        card.level = 18;
        assert_eq!(card.level_ratio(), 1.0);
        card.max_level = 0;
        assert_eq!(card.level_ratio(), 0.0);
    }

    #[test]
    fn empty_deck_has_zero_elixir() {
        let deck = DeckRecommendation::new(Vec::new());
        assert!(deck.is_empty());
        assert_eq!(deck.average_elixir, 0.0);
    }
}
