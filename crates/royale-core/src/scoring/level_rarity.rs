use super::{Scorer, ScoringContext};
use crate::model::{CardCandidate, RarityWeights};
use crate::providers::LevelCurve;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Overrides for [`LevelRarityScorer`]. `None` keeps the default; any explicit
/// value, including zero, is used as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelRarityConfig {
    /// Default 1.2.
    pub level_weight_factor: Option<f64>,
    /// Default 3.0.
    pub elixir_optimal: Option<f64>,
    /// Distance from the optimum at which the elixir term reaches zero. Default 9.0.
    pub elixir_max_diff: Option<f64>,
    /// Default 0.15.
    pub elixir_weight_factor: Option<f64>,
    /// Default 0.05.
    pub role_bonus: Option<f64>,
    /// Default 0.15.
    pub evolution_bonus_weight: Option<f64>,
    pub rarity_weights: Option<RarityWeights>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LevelRarityParams {
    level_weight_factor: f64,
    elixir_optimal: f64,
    elixir_max_diff: f64,
    elixir_weight_factor: f64,
    role_bonus: f64,
    evolution_bonus_weight: f64,
}

impl Default for LevelRarityParams {
    fn default() -> Self {
        Self {
            level_weight_factor: 1.2,
            elixir_optimal: 3.0,
            elixir_max_diff: 9.0,
            elixir_weight_factor: 0.15,
            role_bonus: 0.05,
            evolution_bonus_weight: 0.15,
        }
    }
}

impl LevelRarityParams {
    fn from_config(config: &LevelRarityConfig) -> Self {
        let d = Self::default();
        Self {
            level_weight_factor: config.level_weight_factor.unwrap_or(d.level_weight_factor),
            elixir_optimal: config.elixir_optimal.unwrap_or(d.elixir_optimal),
            elixir_max_diff: config.elixir_max_diff.unwrap_or(d.elixir_max_diff),
            elixir_weight_factor: config.elixir_weight_factor.unwrap_or(d.elixir_weight_factor),
            role_bonus: config.role_bonus.unwrap_or(d.role_bonus),
            evolution_bonus_weight: config
                .evolution_bonus_weight
                .unwrap_or(d.evolution_bonus_weight),
        }
    }
}

/// Individual terms of a level/rarity score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelRarityBreakdown {
    pub level_ratio: f64,
    pub rarity_boost: f64,
    pub level_value: f64,
    pub elixir_value: f64,
    pub role_bonus: f64,
    pub evolution_bonus: f64,
    pub total: f64,
}

struct LevelRarityState {
    curve: Option<Arc<dyn LevelCurve>>,
    rarity_weights: RarityWeights,
    params: LevelRarityParams,
}

/// Baseline scorer: level progression weighted by rarity, elixir efficiency,
/// a flat role bonus and evolution progress. Typical output 0.0 to 1.65.
pub struct LevelRarityScorer {
    state: RwLock<LevelRarityState>,
}

impl Default for LevelRarityScorer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl LevelRarityScorer {
    pub fn new(curve: Option<Arc<dyn LevelCurve>>) -> Self {
        Self::with_config(curve, &LevelRarityConfig::default())
    }

    pub fn with_config(curve: Option<Arc<dyn LevelCurve>>, config: &LevelRarityConfig) -> Self {
        Self {
            state: RwLock::new(LevelRarityState {
                curve,
                rarity_weights: config.rarity_weights.unwrap_or_default(),
                params: LevelRarityParams::from_config(config),
            }),
        }
    }

    pub fn set_level_curve(&self, curve: Option<Arc<dyn LevelCurve>>) {
        self.state.write().curve = curve;
    }

    pub fn level_curve(&self) -> Option<Arc<dyn LevelCurve>> {
        self.state.read().curve.clone()
    }

    pub fn set_rarity_weights(&self, weights: RarityWeights) {
        self.state.write().rarity_weights = weights;
    }

    pub fn rarity_weights(&self) -> RarityWeights {
        self.state.read().rarity_weights
    }

    pub fn breakdown(
        &self,
        candidate: &CardCandidate,
        ctx: &ScoringContext<'_>,
    ) -> LevelRarityBreakdown {
        let (default_curve, weights, params) = {
            let state = self.state.read();
            (state.curve.clone(), state.rarity_weights, state.params)
        };

        let curve = ctx.level_curve.or(default_curve.as_deref());
        let level_ratio = level_ratio(candidate, curve);
        let rarity_boost = weights.boost(candidate.rarity);
        let level_value = level_ratio * params.level_weight_factor * rarity_boost;
        let elixir_value = elixir_weight(candidate.elixir, &params) * params.elixir_weight_factor;
        let role_bonus = if candidate.has_role() {
            params.role_bonus
        } else {
            0.0
        };
        let evolution_bonus = params.evolution_bonus_weight * candidate.evolution_ratio();

        LevelRarityBreakdown {
            level_ratio,
            rarity_boost,
            level_value,
            elixir_value,
            role_bonus,
            evolution_bonus,
            total: level_value + elixir_value + role_bonus + evolution_bonus,
        }
    }
}

impl Scorer for LevelRarityScorer {
    fn score(&self, candidate: &CardCandidate, ctx: &ScoringContext<'_>) -> f64 {
        self.breakdown(candidate, ctx).total
    }
}

fn level_ratio(candidate: &CardCandidate, curve: Option<&dyn LevelCurve>) -> f64 {
    if candidate.max_level == 0 {
        return 0.0;
    }
    match curve {
        Some(curve) if !candidate.name.is_empty() => {
            curve.relative_level_ratio(&candidate.name, candidate.level, candidate.max_level)
        }
        _ => candidate.linear_level_ratio(),
    }
}

/// `1 - |elixir - optimal| / max_diff`, unclamped. A non-positive `max_diff`
/// disables the term.
fn elixir_weight(elixir: u32, params: &LevelRarityParams) -> f64 {
    if params.elixir_max_diff <= 0.0 {
        return 0.0;
    }
    1.0 - (f64::from(elixir) - params.elixir_optimal).abs() / params.elixir_max_diff
}
