use super::{Scorer, ScoringContext};
use crate::model::CardCandidate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionMode {
    /// `base × progress`.
    Flat,
    /// `base × level_ratio^exp × (1 + multi × (max_evo - 1)) × progress`.
    #[default]
    LevelScaled,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Cards whose evolution the player has unlocked.
    pub unlocked: HashSet<String>,
    pub mode: EvolutionMode,
    /// Default 0.25.
    pub base_bonus: Option<f64>,
    /// Default 1.5.
    pub level_exponent: Option<f64>,
    /// Extra bonus per additional evolution tier. Default 0.2.
    pub multi_evo_multiplier: Option<f64>,
}

const DEFAULT_BASE_BONUS: f64 = 0.25;
const DEFAULT_LEVEL_EXPONENT: f64 = 1.5;
const DEFAULT_MULTI_EVO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
struct EvolutionParams {
    mode: EvolutionMode,
    base_bonus: f64,
    level_exponent: f64,
    multi_evo_multiplier: f64,
}

struct EvolutionState {
    unlocked: HashSet<String>,
    params: EvolutionParams,
}

/// Bonus for cards with an unlocked, at least partially progressed evolution.
pub struct EvolutionScorer {
    state: RwLock<EvolutionState>,
}

impl Default for EvolutionScorer {
    fn default() -> Self {
        Self::with_config(EvolutionConfig::default())
    }
}

impl EvolutionScorer {
    pub fn new(unlocked: HashSet<String>) -> Self {
        Self::with_config(EvolutionConfig {
            unlocked,
            ..EvolutionConfig::default()
        })
    }

    pub fn with_config(config: EvolutionConfig) -> Self {
        Self {
            state: RwLock::new(EvolutionState {
                params: EvolutionParams {
                    mode: config.mode,
                    base_bonus: config.base_bonus.unwrap_or(DEFAULT_BASE_BONUS),
                    level_exponent: config.level_exponent.unwrap_or(DEFAULT_LEVEL_EXPONENT),
                    multi_evo_multiplier: config
                        .multi_evo_multiplier
                        .unwrap_or(DEFAULT_MULTI_EVO),
                },
                unlocked: config.unlocked,
            }),
        }
    }

    pub fn set_unlocked(&self, unlocked: HashSet<String>) {
        self.state.write().unlocked = unlocked;
    }

    pub fn unlocked(&self) -> HashSet<String> {
        self.state.read().unlocked.clone()
    }

    pub fn set_mode(&self, mode: EvolutionMode) {
        self.state.write().params.mode = mode;
    }

    pub fn mode(&self) -> EvolutionMode {
        self.state.read().params.mode
    }

    pub fn set_base_bonus(&self, bonus: f64) {
        self.state.write().params.base_bonus = bonus;
    }

    pub fn base_bonus(&self) -> f64 {
        self.state.read().params.base_bonus
    }

    pub fn set_level_exponent(&self, exponent: f64) {
        self.state.write().params.level_exponent = exponent;
    }

    pub fn level_exponent(&self) -> f64 {
        self.state.read().params.level_exponent
    }
}

impl Scorer for EvolutionScorer {
    fn score(&self, candidate: &CardCandidate, ctx: &ScoringContext<'_>) -> f64 {
        let state = self.state.read();
        let unlocked = ctx.unlocked_evolutions.unwrap_or(&state.unlocked);
        if !unlocked.contains(&candidate.name) {
            return 0.0;
        }
        let params = state.params;
        drop(state);
        bonus(candidate, &params)
    }
}

fn bonus(candidate: &CardCandidate, params: &EvolutionParams) -> f64 {
    let progress = candidate.evolution_ratio();
    if progress == 0.0 {
        return 0.0;
    }
    match params.mode {
        EvolutionMode::Flat => params.base_bonus * progress,
        EvolutionMode::LevelScaled => {
            if candidate.max_level == 0 {
                return 0.0;
            }
            let scaled = candidate.linear_level_ratio().powf(params.level_exponent);
            let tiers = f64::from(candidate.max_evolution_level - 1);
            let multi = 1.0 + params.multi_evo_multiplier * tiers;
            params.base_bonus * scaled * multi * progress
        }
    }
}

/// Flat-mode bonus for a single card without building a scorer.
pub fn evolution_bonus_for_card(
    name: &str,
    level: u32,
    max_level: u32,
    evolution_level: u32,
    max_evolution_level: u32,
    unlocked: &HashSet<String>,
) -> f64 {
    if !unlocked.contains(name) {
        return 0.0;
    }
    let candidate =
        CardCandidate::new(name, level, max_level).with_evolution(evolution_level, max_evolution_level);
    bonus(
        &candidate,
        &EvolutionParams {
            mode: EvolutionMode::Flat,
            base_bonus: DEFAULT_BASE_BONUS,
            level_exponent: DEFAULT_LEVEL_EXPONENT,
            multi_evo_multiplier: DEFAULT_MULTI_EVO,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlocked(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn locked_or_unprogressed_cards_score_zero() {
        let scorer = EvolutionScorer::new(unlocked(&["Knight"]));
        let ctx = ScoringContext::new();
        let locked = CardCandidate::new("Archers", 14, 14).with_evolution(1, 1);
        let no_evo = CardCandidate::new("Knight", 14, 14).with_evolution(0, 1);
        let no_max = CardCandidate::new("Knight", 14, 14).with_evolution(1, 0);
        assert_eq!(scorer.score(&locked, &ctx), 0.0);
        assert_eq!(scorer.score(&no_evo, &ctx), 0.0);
        assert_eq!(scorer.score(&no_max, &ctx), 0.0);
    }

    #[test]
    fn level_scaled_bonus_rewards_level_and_tiers() {
        let scorer = EvolutionScorer::new(unlocked(&["Knight"]));
        let ctx = ScoringContext::new();
        let maxed = CardCandidate::new("Knight", 14, 14).with_evolution(1, 1);
        assert!((scorer.score(&maxed, &ctx) - 0.25).abs() < 1e-12);

        let two_tier = CardCandidate::new("Knight", 14, 14).with_evolution(2, 2);
        assert!((scorer.score(&two_tier, &ctx) - 0.25 * 1.2).abs() < 1e-12);

        let half = CardCandidate::new("Knight", 7, 14).with_evolution(1, 1);
        assert!((scorer.score(&half, &ctx) - 0.25 * 0.5f64.powf(1.5)).abs() < 1e-12);

        let unknown_max = CardCandidate::new("Knight", 7, 0).with_evolution(1, 1);
        assert_eq!(scorer.score(&unknown_max, &ctx), 0.0);
    }

    #[test]
    fn context_unlocks_take_precedence() {
        let scorer = EvolutionScorer::new(unlocked(&["Knight"]));
        let override_set = unlocked(&["Archers"]);
        let ctx = ScoringContext::new().with_unlocked_evolutions(&override_set);
        let knight = CardCandidate::new("Knight", 14, 14).with_evolution(1, 1);
        let archers = CardCandidate::new("Archers", 14, 14).with_evolution(1, 1);
        assert_eq!(scorer.score(&knight, &ctx), 0.0);
        assert!(scorer.score(&archers, &ctx) > 0.0);
    }

    #[test]
    fn flat_mode_ignores_level() {
        let scorer = EvolutionScorer::new(unlocked(&["Knight"]));
        scorer.set_mode(EvolutionMode::Flat);
        let low = CardCandidate::new("Knight", 3, 14).with_evolution(1, 2);
        assert!((scorer.score(&low, &ScoringContext::new()) - 0.125).abs() < 1e-12);
        assert_eq!(
            evolution_bonus_for_card("Knight", 3, 14, 1, 2, &unlocked(&["Knight"])),
            0.125
        );
        assert_eq!(
            evolution_bonus_for_card("Knight", 3, 14, 1, 2, &HashSet::new()),
            0.0
        );
    }
}
