use super::rarity::Rarity;
use super::role::CardRole;
use serde::{Deserialize, Serialize};

/// Snapshot of one card's scoring-relevant attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardCandidate {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub rarity: Option<Rarity>,
    pub elixir: u32,
    pub role: Option<CardRole>,
    pub evolution_level: u32,
    pub max_evolution_level: u32,
}

impl CardCandidate {
    pub fn new(name: impl Into<String>, level: u32, max_level: u32) -> Self {
        Self {
            name: name.into(),
            level,
            max_level,
            rarity: None,
            elixir: 0,
            role: None,
            evolution_level: 0,
            max_evolution_level: 0,
        }
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }

    pub fn with_elixir(mut self, elixir: u32) -> Self {
        self.elixir = elixir;
        self
    }

    pub fn with_role(mut self, role: CardRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_evolution(mut self, level: u32, max_level: u32) -> Self {
        self.evolution_level = level;
        self.max_evolution_level = max_level;
        self
    }

    pub fn has_role(&self) -> bool {
        self.role.is_some()
    }

    /// Linear level progression; zero when the max level is unknown.
    pub fn linear_level_ratio(&self) -> f64 {
        if self.max_level == 0 {
            return 0.0;
        }
        f64::from(self.level) / f64::from(self.max_level)
    }

    /// Evolution progress capped at 1.0; zero when the card cannot evolve or
    /// has not started evolving.
    pub fn evolution_ratio(&self) -> f64 {
        if self.max_evolution_level == 0 || self.evolution_level == 0 {
            return 0.0;
        }
        (f64::from(self.evolution_level) / f64::from(self.max_evolution_level)).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_levels_yield_zero_ratios() {
        let card = CardCandidate::new("Knight", 11, 0).with_evolution(1, 0);
        assert_eq!(card.linear_level_ratio(), 0.0);
        assert_eq!(card.evolution_ratio(), 0.0);
    }

    #[test]
    fn evolution_ratio_is_capped() {
        let card = CardCandidate::new("Knight", 11, 14).with_evolution(3, 1);
        assert_eq!(card.evolution_ratio(), 1.0);
    }
}
