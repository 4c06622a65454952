//! Pluggable card scorers.
//!
//! Every scorer maps a [`CardCandidate`] plus a borrowed [`ScoringContext`] to
//! an `f64`. Missing context degrades to a neutral contribution; scoring never
//! fails.

pub mod combat;
pub mod composite;
pub mod evolution;
pub mod level_rarity;
pub mod synergy;

use crate::model::{CardCandidate, CardRole};
use crate::providers::{CombatStatsProvider, LevelCurve, SynergyProvider};
use std::collections::{HashMap, HashSet};

pub use combat::{CombatConfig, CombatStatsScorer, CombatThresholds, CombatWeights};
pub use composite::{CompositeScorer, WeightedScorer};
pub use evolution::{EvolutionConfig, EvolutionMode, EvolutionScorer, evolution_bonus_for_card};
pub use level_rarity::{LevelRarityBreakdown, LevelRarityConfig, LevelRarityScorer};
pub use synergy::{SynergyConfig, SynergyScorer};

pub trait Scorer: Send + Sync {
    fn score(&self, candidate: &CardCandidate, ctx: &ScoringContext<'_>) -> f64;
}

/// Adapts a plain function or closure into a [`Scorer`].
pub struct FnScorer<F>(pub F);

impl<F> Scorer for FnScorer<F>
where
    F: Fn(&CardCandidate, &ScoringContext<'_>) -> f64 + Send + Sync,
{
    fn score(&self, candidate: &CardCandidate, ctx: &ScoringContext<'_>) -> f64 {
        (self.0)(candidate, ctx)
    }
}

pub fn scorer_fn<F>(f: F) -> FnScorer<F>
where
    F: Fn(&CardCandidate, &ScoringContext<'_>) -> f64 + Send + Sync,
{
    FnScorer(f)
}

/// Read-only inputs threaded through every scorer call.
#[derive(Clone, Copy, Default)]
pub struct ScoringContext<'a> {
    pub level_curve: Option<&'a dyn LevelCurve>,
    pub combat_stats: Option<&'a dyn CombatStatsProvider>,
    pub synergy: Option<&'a dyn SynergyProvider>,
    /// Cards already chosen for the deck under construction.
    pub current_deck: &'a [CardCandidate],
    pub unlocked_evolutions: Option<&'a HashSet<String>>,
    /// Strategy elixir window `(min, max)` consulted by deck builders.
    pub target_elixir: Option<(f64, f64)>,
    pub role_multipliers: Option<&'a HashMap<CardRole, f64>>,
}

impl<'a> ScoringContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level_curve(mut self, curve: &'a dyn LevelCurve) -> Self {
        self.level_curve = Some(curve);
        self
    }

    pub fn with_combat_stats(mut self, stats: &'a dyn CombatStatsProvider) -> Self {
        self.combat_stats = Some(stats);
        self
    }

    pub fn with_synergy(mut self, synergy: &'a dyn SynergyProvider) -> Self {
        self.synergy = Some(synergy);
        self
    }

    pub fn with_current_deck(mut self, deck: &'a [CardCandidate]) -> Self {
        self.current_deck = deck;
        self
    }

    pub fn with_unlocked_evolutions(mut self, unlocked: &'a HashSet<String>) -> Self {
        self.unlocked_evolutions = Some(unlocked);
        self
    }

    pub fn with_target_elixir(mut self, min: f64, max: f64) -> Self {
        self.target_elixir = Some((min, max));
        self
    }

    pub fn with_role_multipliers(mut self, multipliers: &'a HashMap<CardRole, f64>) -> Self {
        self.role_multipliers = Some(multipliers);
        self
    }

    /// Strategy multiplier for the candidate's role; 1.0 when unset.
    pub fn role_multiplier(&self, role: Option<CardRole>) -> f64 {
        match (self.role_multipliers, role) {
            (Some(map), Some(role)) => map.get(&role).copied().unwrap_or(1.0),
            _ => 1.0,
        }
    }
}

impl std::fmt::Debug for ScoringContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringContext")
            .field("level_curve", &self.level_curve.is_some())
            .field("combat_stats", &self.combat_stats.is_some())
            .field("synergy", &self.synergy.is_some())
            .field("current_deck", &self.current_deck.len())
            .field("unlocked_evolutions", &self.unlocked_evolutions.map(HashSet::len))
            .field("target_elixir", &self.target_elixir)
            .field("role_multipliers", &self.role_multipliers.map(HashMap::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_act_as_scorers() {
        let scorer = scorer_fn(|card: &CardCandidate, _: &ScoringContext<'_>| {
            card.linear_level_ratio()
        });
        let card = CardCandidate::new("Knight", 7, 14);
        assert_eq!(scorer.score(&card, &ScoringContext::new()), 0.5);
    }

    #[test]
    fn role_multiplier_defaults_to_one() {
        let mut map = HashMap::new();
        map.insert(CardRole::WinCondition, 2.0);
        let ctx = ScoringContext::new().with_role_multipliers(&map);
        assert_eq!(ctx.role_multiplier(Some(CardRole::WinCondition)), 2.0);
        assert_eq!(ctx.role_multiplier(Some(CardRole::Cycle)), 1.0);
        assert_eq!(ctx.role_multiplier(None), 1.0);
        assert_eq!(ScoringContext::new().role_multiplier(Some(CardRole::Cycle)), 1.0);
    }
}
