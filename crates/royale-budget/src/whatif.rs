//! What-if simulation of card upgrades.
//!
//! Applies hypothetical level changes to a copy of the collection, rebuilds the
//! deck with the same builder and reports how the deck changed.

use crate::builder::{BuildError, DeckBuilder};
use royale_core::model::{CardLevels, DeckRecommendation};
use royale_core::upgrade::gold_needed_between;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Level, event};

const HIGHLY_RECOMMENDED_PCT: f64 = 10.0;
const RECOMMENDED_PCT: f64 = 5.0;

/// One hypothetical upgrade. `from_level` of `None` is filled in from the
/// collection when the scenario is simulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardUpgrade {
    pub card_name: String,
    pub from_level: Option<u32>,
    pub to_level: u32,
    #[serde(default)]
    pub gold_cost: u64,
}

impl CardUpgrade {
    pub fn new(card_name: impl Into<String>, to_level: u32) -> Self {
        Self {
            card_name: card_name.into(),
            from_level: None,
            to_level,
            gold_cost: 0,
        }
    }

    pub fn with_from_level(mut self, level: u32) -> Self {
        self.from_level = Some(level);
        self
    }
}

impl fmt::Display for CardUpgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from_level {
            Some(from) => write!(f, "{}:{}:{}", self.card_name, from, self.to_level),
            None => write!(f, "{}:{}", self.card_name, self.to_level),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpgradeSpecError {
    #[error("invalid upgrade spec '{0}' (expected Name:ToLevel or Name:FromLevel:ToLevel)")]
    Format(String),
    #[error("upgrade spec '{0}' has an empty card name")]
    EmptyName(String),
    #[error("invalid level '{level}' in upgrade spec '{spec}'")]
    InvalidLevel { spec: String, level: String },
    #[error("invalid level range {from} -> {to} in upgrade spec '{spec}'")]
    InvalidRange { spec: String, from: u32, to: u32 },
}

/// Parses `Name:To` or `Name:From:To`. A from-level of 0 means "infer from the
/// collection", the same as omitting it.
pub fn parse_card_upgrade(spec: &str) -> Result<CardUpgrade, UpgradeSpecError> {
    let parts: Vec<&str> = spec.split(':').collect();
    let (name, from, to) = match parts.as_slice() {
        [name, to] => (*name, None, *to),
        [name, from, to] => (*name, Some(*from), *to),
        _ => return Err(UpgradeSpecError::Format(spec.to_string())),
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(UpgradeSpecError::EmptyName(spec.to_string()));
    }
    let level = |raw: &str| {
        raw.trim()
            .parse::<u32>()
            .map_err(|_| UpgradeSpecError::InvalidLevel {
                spec: spec.to_string(),
                level: raw.to_string(),
            })
    };
    let to_level = level(to)?;
    let from_level = from.map(level).transpose()?.filter(|&from| from > 0);

    if let Some(from) = from_level
        && to_level < from
    {
        return Err(UpgradeSpecError::InvalidRange {
            spec: spec.to_string(),
            from,
            to: to_level,
        });
    }

    Ok(CardUpgrade {
        card_name: name.to_string(),
        from_level,
        to_level,
        gold_cost: 0,
    })
}

impl FromStr for CardUpgrade {
    type Err = UpgradeSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_card_upgrade(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationImpact {
    /// Simulated deck score minus original deck score.
    pub deck_score_delta: f64,
    pub new_cards_in_deck: Vec<String>,
    pub removed_cards: Vec<String>,
    /// Score change as a percentage of the original score.
    pub viability_improvement: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfScenario {
    pub name: String,
    /// Upgrades as applied, with inferred from-levels and gold costs.
    pub upgrades: Vec<CardUpgrade>,
    pub total_gold: u64,
    pub original_deck: DeckRecommendation,
    pub simulated_deck: DeckRecommendation,
    pub impact: SimulationImpact,
}

#[derive(Debug, Error)]
pub enum WhatIfError {
    #[error("no upgrades to simulate")]
    NoUpgrades,
    #[error("failed to build original deck")]
    OriginalBuild(#[source] BuildError),
    #[error("failed to build simulated deck")]
    SimulatedBuild(#[source] BuildError),
}

pub struct WhatIfAnalyzer {
    builder: Arc<dyn DeckBuilder>,
}

impl WhatIfAnalyzer {
    pub fn new(builder: Arc<dyn DeckBuilder>) -> Self {
        Self { builder }
    }

    /// Rebuilds the deck after applying `upgrades` and diffs it against the
    /// deck built from the untouched collection. Upgrades naming cards the
    /// player does not own are carried through unpriced.
    pub fn analyze_upgrade_path(
        &self,
        card_levels: &CardLevels,
        upgrades: &[CardUpgrade],
    ) -> Result<WhatIfScenario, WhatIfError> {
        if upgrades.is_empty() {
            return Err(WhatIfError::NoUpgrades);
        }

        let original_deck = self
            .builder
            .build_deck(card_levels)
            .map_err(WhatIfError::OriginalBuild)?;
        let (modified, applied) = apply_upgrades(card_levels, upgrades);
        let simulated_deck = self
            .builder
            .build_deck(&modified)
            .map_err(WhatIfError::SimulatedBuild)?;

        let total_gold = applied.iter().map(|upgrade| upgrade.gold_cost).sum();
        let impact = measure_impact(&original_deck, &simulated_deck, total_gold);
        let scenario = WhatIfScenario {
            name: scenario_name(&applied),
            upgrades: applied,
            total_gold,
            original_deck,
            simulated_deck,
            impact,
        };

        if tracing::enabled!(Level::INFO) {
            event!(
                target: "royale_budget::what_if",
                Level::INFO,
                scenario = %scenario.name,
                total_gold = scenario.total_gold,
                score_delta = scenario.impact.deck_score_delta,
                improvement_pct = scenario.impact.viability_improvement,
                new_cards = ?scenario.impact.new_cards_in_deck,
                removed_cards = ?scenario.impact.removed_cards,
                "what-if scenario simulated"
            );
        }
        Ok(scenario)
    }
}

fn apply_upgrades(
    card_levels: &CardLevels,
    upgrades: &[CardUpgrade],
) -> (CardLevels, Vec<CardUpgrade>) {
    let mut modified = card_levels.clone();
    let mut applied = Vec::with_capacity(upgrades.len());
    for upgrade in upgrades {
        let mut upgrade = upgrade.clone();
        match modified.get_mut(&upgrade.card_name) {
            Some(card) => {
                let from = *upgrade.from_level.get_or_insert(card.level);
                if upgrade.gold_cost == 0 {
                    upgrade.gold_cost = gold_needed_between(from, upgrade.to_level, card.rarity);
                }
                card.level = upgrade.to_level;
            }
            None => {
                tracing::warn!(
                    target: "royale_budget::what_if",
                    card = %upgrade.card_name,
                    "upgrade names a card missing from the collection"
                );
            }
        }
        applied.push(upgrade);
    }
    (modified, applied)
}

fn measure_impact(
    original: &DeckRecommendation,
    simulated: &DeckRecommendation,
    total_gold: u64,
) -> SimulationImpact {
    let original_score = original.total_score();
    let delta = simulated.total_score() - original_score;

    let before: HashSet<&str> = original.card_names().collect();
    let after: HashSet<&str> = simulated.card_names().collect();
    let new_cards_in_deck = simulated
        .card_names()
        .filter(|name| !before.contains(name))
        .map(String::from)
        .collect();
    let removed_cards = original
        .card_names()
        .filter(|name| !after.contains(name))
        .map(String::from)
        .collect();

    let viability_improvement = if original_score > 0.0 {
        delta / original_score * 100.0
    } else {
        0.0
    };

    SimulationImpact {
        deck_score_delta: delta,
        new_cards_in_deck,
        removed_cards,
        viability_improvement,
        recommendation: recommendation(delta, viability_improvement, total_gold),
    }
}

fn recommendation(delta: f64, improvement: f64, total_gold: u64) -> String {
    if delta <= 0.0 {
        format!(
            "These upgrades are not recommended. The simulated deck score decreased by {:.2} points.",
            -delta
        )
    } else if improvement > HIGHLY_RECOMMENDED_PCT {
        format!(
            "Highly recommended! These upgrades ({total_gold} gold) significantly improve your deck viability by {improvement:.1}%."
        )
    } else if improvement > RECOMMENDED_PCT {
        format!(
            "Recommended. These upgrades ({total_gold} gold) moderately improve your deck viability by {improvement:.1}%."
        )
    } else {
        format!(
            "Minor improvement. These upgrades ({total_gold} gold) slightly improve your deck by {improvement:.1}%. Consider prioritizing other upgrades."
        )
    }
}

fn scenario_name(upgrades: &[CardUpgrade]) -> String {
    match upgrades {
        [single] => format!("Upgrade {} to Lv{}", single.card_name, single.to_level),
        _ => {
            let names: Vec<&str> = upgrades.iter().map(|u| u.card_name.as_str()).collect();
            format!("Upgrade {} cards: {}", upgrades.len(), names.join(", "))
        }
    }
}
